/// The survival boss encounter.
///
/// The fight is a countdown, not a health bar: the player wins by staying
/// alive until the clock runs out. Phases are windows on the remaining
/// time; each phase teaches one mask by throwing the attack that mask
/// answers, and the final phase replays every earlier attack at random.
///
/// Processing order per tick:
///   1. Survival countdown + window transition check
///   2. Stun bookkeeping (freeze counter)
///   3. Delayed spawn drain (warning → beam etc.)
///   4. Phase attack scheduler (held while stunned)
///
/// The machine owns no positions. It emits `AttackSpawn` descriptors with
/// direction/speed/homing parameters; the entity layer instantiates and
/// moves them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::BossTuning;
use crate::domain::geometry::Vec2;
use crate::domain::mask::MaskId;
use crate::domain::status::PlayerStatus;
use super::event::GameEvent;

// ══════════════════════════════════════════════════════════════
// Phases
// ══════════════════════════════════════════════════════════════

/// Strictly linear: Intro → IronCurtain → … → SystemFailure → Defeated.
/// No back-edges; Defeated is absorbing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum BossPhase {
    Intro,
    IronCurtain,
    SpectralGrid,
    Hypothermia,
    VoidScreams,
    SystemFailure,
    Defeated,
}

// Phase windows on the remaining survival time (seconds).
const SPECTRAL_GRID_AT: f32 = 70.0;
const HYPOTHERMIA_AT: f32 = 50.0;
const VOID_SCREAMS_AT: f32 = 30.0;
const SYSTEM_FAILURE_AT: f32 = 10.0;

fn phase_for_remaining(remaining: f32) -> BossPhase {
    if remaining > SPECTRAL_GRID_AT {
        BossPhase::IronCurtain
    } else if remaining > HYPOTHERMIA_AT {
        BossPhase::SpectralGrid
    } else if remaining > VOID_SCREAMS_AT {
        BossPhase::Hypothermia
    } else if remaining > SYSTEM_FAILURE_AT {
        BossPhase::VoidScreams
    } else {
        BossPhase::SystemFailure
    }
}

/// Cosmetics for the UI layer: banner color, phase name, mask hint.
#[derive(Clone, Copy, Debug)]
pub struct PhaseStyle {
    pub color: (u8, u8, u8),
    pub label: &'static str,
    pub hint: &'static str,
}

const IRON_CURTAIN_STYLE: PhaseStyle = PhaseStyle {
    color: (255, 87, 34),
    label: "THE IRON CURTAIN",
    hint: "Hold SHIELD [1] to block lasers!",
};
const SPECTRAL_GRID_STYLE: PhaseStyle = PhaseStyle {
    color: (156, 39, 176),
    label: "SPECTRAL GRID",
    hint: "Use GHOST [2] to dash through walls!",
};
const HYPOTHERMIA_STYLE: PhaseStyle = PhaseStyle {
    color: (0, 188, 212),
    label: "HYPOTHERMIA",
    hint: "Use FREEZE [3] to slow projectiles!",
};
const VOID_SCREAMS_STYLE: PhaseStyle = PhaseStyle {
    color: (80, 40, 120),
    label: "VOID SCREAMS",
    hint: "Use SILENCE [4] to delete homing orbs!",
};
const SYSTEM_FAILURE_STYLE: PhaseStyle = PhaseStyle {
    color: (255, 50, 50),
    label: "SYSTEM FAILURE",
    hint: "QUICK-SWAP MASKS!",
};

pub fn phase_style(phase: BossPhase) -> Option<&'static PhaseStyle> {
    match phase {
        BossPhase::IronCurtain => Some(&IRON_CURTAIN_STYLE),
        BossPhase::SpectralGrid => Some(&SPECTRAL_GRID_STYLE),
        BossPhase::Hypothermia => Some(&HYPOTHERMIA_STYLE),
        BossPhase::VoidScreams => Some(&VOID_SCREAMS_STYLE),
        BossPhase::SystemFailure => Some(&SYSTEM_FAILURE_STYLE),
        BossPhase::Intro | BossPhase::Defeated => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Attack spawns
// ══════════════════════════════════════════════════════════════

const LASER_WARN_SECONDS: f32 = 0.8;
const LASER_BEAM_SECONDS: f32 = 0.6;
const BULLET_WALL_COUNT: u32 = 8;
const BULLET_WALL_SPEED: f32 = 40.0;
const SKULL_WALL_SPEED_V: f32 = 80.0;
const SKULL_WALL_SPEED_H: f32 = 90.0;
const SPIRAL_ARMS: u32 = 4;
const SPIRAL_STEP: f32 = 0.15;
/// Ice shard speed, and the crawl it drops to while the freeze effect is
/// up — the entity layer re-reads the flag every frame for live shards.
pub const SHARD_SPEED: f32 = 180.0;
pub const SHARD_SPEED_SLOWED: f32 = 40.0;
const ORB_SPEED: f32 = 60.0;
const ORB_LIFETIME: f32 = 6.0;
const ORB_SPAWN_SPREAD: f32 = 30.0;
/// Radius around an invisible player inside which homing orbs dissolve.
pub const NULL_ZONE_RADIUS: f32 = 50.0;
const FAILURE_ORB_COUNT: u32 = 3;
const FAILURE_ORB_STAGGER: f32 = 0.3;
const FAILURE_SPIRAL_BURST_SECONDS: f32 = 1.5;

/// A spawn request handed to the entity layer. Positions are arena-space
/// fractions in [0, 1] or offsets relative to the player, so the machine
/// stays independent of the arena pixel size.
#[derive(Clone, PartialEq, Debug)]
pub enum AttackSpawn {
    /// Flashing warning lines; the matching volley follows after the
    /// wind-up delay.
    LaserWarning { lanes: Vec<f32> },
    LaserVolley { lanes: Vec<f32>, beam_seconds: f32 },
    /// A row of slow bullets sweeping across the arena.
    BulletWall { from_left: bool, count: u32, speed: f32 },
    /// A gapless wall; `vertical` walls span the width and sweep down/up,
    /// horizontal walls span the height and sweep across.
    SkullWall { vertical: bool, from_near: bool, speed: f32 },
    /// One ring of the ice spiral.
    IceShardRing { arms: u32, base_angle: f32, speed: f32 },
    /// Homing orb materializing at `offset` from the player.
    HomingOrb { offset: Vec2, speed: f32, lifetime: f32 },
}

#[derive(Clone, Debug)]
struct PendingSpawn {
    delay: f32,
    spawn: AttackSpawn,
}

// ══════════════════════════════════════════════════════════════
// Weighted attack rosters
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AttackKind {
    LaserVolley,
    BulletWall,
    SkullWall,
    IceSpiral,
    HomingOrbs,
}

/// Weighted roster per phase. SystemFailure is the union of everything
/// taught earlier — the climax replays known mechanics, it does not
/// introduce new ones. Hypothermia runs a continuous spiral instead of a
/// sampled roster.
fn roster(phase: BossPhase) -> &'static [(AttackKind, u32)] {
    match phase {
        BossPhase::IronCurtain => &[(AttackKind::LaserVolley, 3), (AttackKind::BulletWall, 2)],
        BossPhase::SpectralGrid => &[(AttackKind::SkullWall, 1)],
        BossPhase::VoidScreams => &[(AttackKind::HomingOrbs, 1)],
        BossPhase::SystemFailure => &[
            (AttackKind::LaserVolley, 1),
            (AttackKind::SkullWall, 1),
            (AttackKind::IceSpiral, 1),
            (AttackKind::HomingOrbs, 1),
        ],
        _ => &[],
    }
}

/// The mask that answers an attack, flashed as a hint during the final
/// phase.
fn counter_mask(kind: AttackKind) -> MaskId {
    match kind {
        AttackKind::LaserVolley | AttackKind::BulletWall => MaskId::Shield,
        AttackKind::SkullWall => MaskId::Ghost,
        AttackKind::IceSpiral => MaskId::Frozen,
        AttackKind::HomingOrbs => MaskId::Silence,
    }
}

fn sample(rng: &mut SmallRng, table: &[(AttackKind, u32)]) -> Option<AttackKind> {
    let total: u32 = table.iter().map(|&(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for &(kind, weight) in table {
        if roll < weight {
            return Some(kind);
        }
        roll -= weight;
    }
    None
}

// ══════════════════════════════════════════════════════════════
// The fight
// ══════════════════════════════════════════════════════════════

pub struct BossFight {
    phase: BossPhase,
    survival_remaining: f32,
    phase_elapsed: f32,
    /// Accumulator for the phase's attack interval; resets to 0 on fire,
    /// so the next interval is measured from firing time.
    attack_timer: f32,
    spiral_active: bool,
    spiral_angle: f32,
    spiral_timer: f32,
    /// SystemFailure borrows the spiral for short bursts.
    spiral_burst_remaining: f32,
    stun_remaining: f32,
    /// Freeze flag seen last tick, for rising-edge detection.
    frozen_seen: bool,
    pending: Vec<PendingSpawn>,
    rng: SmallRng,
    tuning: BossTuning,
}

impl BossFight {
    pub fn new(tuning: BossTuning, seed: u64) -> Self {
        BossFight {
            phase: BossPhase::Intro,
            survival_remaining: tuning.survival_seconds,
            phase_elapsed: 0.0,
            attack_timer: 0.0,
            spiral_active: false,
            spiral_angle: 0.0,
            spiral_timer: 0.0,
            spiral_burst_remaining: 0.0,
            stun_remaining: 0.0,
            frozen_seen: false,
            pending: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            tuning,
        }
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn survival_remaining(&self) -> f32 {
        self.survival_remaining
    }

    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn is_over(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    /// Kick off the fight once the intro dialogue is done. The countdown
    /// does not move until this is called.
    pub fn start(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase == BossPhase::Intro {
            self.enter(BossPhase::IronCurtain, events);
        }
    }

    /// Advance the encounter. The caller must not invoke this while the
    /// game is paused or a dialogue is up — there is no internal pause
    /// flag, so skipped ticks leak no time.
    pub fn update(
        &mut self,
        dt: f32,
        player: &PlayerStatus,
        events: &mut Vec<GameEvent>,
        spawns: &mut Vec<AttackSpawn>,
    ) {
        if self.phase == BossPhase::Intro || self.phase == BossPhase::Defeated {
            return;
        }

        // The win clock never pauses while the fight is live.
        self.survival_remaining = (self.survival_remaining - dt).max(0.0);
        self.phase_elapsed += dt;

        if self.survival_remaining <= 0.0 {
            self.win(events);
            return;
        }
        let target = phase_for_remaining(self.survival_remaining);
        if target != self.phase {
            self.enter(target, events);
        }

        // Freeze counter: rising edge opens a stun window. Re-triggering
        // while the window runs does not stack.
        let frozen = player.is_time_frozen();
        if frozen && !self.frozen_seen && self.stun_remaining <= 0.0 {
            self.stun_remaining = self.tuning.stun_seconds;
            events.push(GameEvent::BossStunned);
        }
        self.frozen_seen = frozen;
        if self.stun_remaining > 0.0 {
            self.stun_remaining = (self.stun_remaining - dt).max(0.0);
        }

        // Wind-ups already in flight keep ticking even while stunned.
        self.drain_pending(dt, spawns);

        // Attack clocks hold still while the freeze flag is up or the
        // stun window runs.
        if frozen || self.stun_remaining > 0.0 {
            return;
        }

        self.run_scheduler(dt, player, events, spawns);
    }

    // ── Transitions ──

    fn enter(&mut self, phase: BossPhase, events: &mut Vec<GameEvent>) {
        self.phase = phase;
        self.phase_elapsed = 0.0;
        self.attack_timer = 0.0;
        self.spiral_active = false;
        self.spiral_timer = 0.0;
        self.spiral_burst_remaining = 0.0;
        events.push(GameEvent::PhaseChanged { phase });
        info!(?phase, remaining = self.survival_remaining, "boss phase");
    }

    fn win(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = BossPhase::Defeated;
        self.pending.clear();
        self.spiral_active = false;
        self.spiral_burst_remaining = 0.0;
        events.push(GameEvent::AttacksCleared);
        events.push(GameEvent::EncounterWon);
        info!("survival clock exhausted; encounter won");
    }

    // ── Scheduling ──

    fn attack_interval(&self) -> f32 {
        match self.phase {
            BossPhase::IronCurtain => self.tuning.iron_curtain_interval,
            BossPhase::SpectralGrid => self.tuning.spectral_interval,
            BossPhase::VoidScreams => self.tuning.void_interval,
            BossPhase::SystemFailure => self.tuning.failure_interval,
            _ => 0.0,
        }
    }

    fn run_scheduler(
        &mut self,
        dt: f32,
        player: &PlayerStatus,
        events: &mut Vec<GameEvent>,
        spawns: &mut Vec<AttackSpawn>,
    ) {
        if self.phase == BossPhase::Hypothermia {
            // Short lead-in, then a continuous spiral of shard rings.
            if !self.spiral_active && self.phase_elapsed >= self.tuning.spiral_lead_in {
                self.spiral_active = true;
                self.spiral_timer = 0.0;
            }
            if self.spiral_active {
                self.spiral_timer += dt;
                if self.spiral_timer >= self.tuning.spiral_ring_interval {
                    self.spiral_timer = 0.0;
                    self.emit_shard_ring(player, spawns);
                }
            }
            return;
        }

        let interval = self.attack_interval();
        if interval > 0.0 {
            self.attack_timer += dt;
            if self.attack_timer >= interval {
                self.attack_timer = 0.0;
                self.fire(events, spawns);
            }
        }

        // SystemFailure spiral bursts tick alongside the main roster.
        if self.spiral_burst_remaining > 0.0 {
            self.spiral_burst_remaining -= dt;
            self.spiral_timer += dt;
            if self.spiral_timer >= self.tuning.spiral_ring_interval {
                self.spiral_timer = 0.0;
                self.emit_shard_ring(player, spawns);
            }
            if self.spiral_burst_remaining <= 0.0 {
                self.spiral_burst_remaining = 0.0;
                self.spiral_timer = 0.0;
            }
        }
    }

    fn fire(&mut self, events: &mut Vec<GameEvent>, spawns: &mut Vec<AttackSpawn>) {
        let kind = match sample(&mut self.rng, roster(self.phase)) {
            Some(k) => k,
            None => return,
        };
        if self.phase == BossPhase::SystemFailure {
            events.push(GameEvent::CounterHint { mask: counter_mask(kind) });
        }
        match kind {
            AttackKind::LaserVolley => {
                let count = if self.rng.gen_bool(0.5) { 3 } else { 2 };
                let lanes: Vec<f32> = (0..count).map(|_| self.rng.gen::<f32>()).collect();
                spawns.push(AttackSpawn::LaserWarning { lanes: lanes.clone() });
                self.pending.push(PendingSpawn {
                    delay: LASER_WARN_SECONDS,
                    spawn: AttackSpawn::LaserVolley { lanes, beam_seconds: LASER_BEAM_SECONDS },
                });
            }
            AttackKind::BulletWall => {
                spawns.push(AttackSpawn::BulletWall {
                    from_left: self.rng.gen_bool(0.5),
                    count: BULLET_WALL_COUNT,
                    speed: BULLET_WALL_SPEED,
                });
            }
            AttackKind::SkullWall => {
                let vertical = self.rng.gen_bool(0.5);
                spawns.push(AttackSpawn::SkullWall {
                    vertical,
                    from_near: self.rng.gen_bool(0.5),
                    speed: if vertical { SKULL_WALL_SPEED_V } else { SKULL_WALL_SPEED_H },
                });
            }
            AttackKind::IceSpiral => {
                self.spiral_burst_remaining = FAILURE_SPIRAL_BURST_SECONDS;
                self.spiral_timer = 0.0;
            }
            AttackKind::HomingOrbs => {
                let burst = if self.phase == BossPhase::SystemFailure {
                    FAILURE_ORB_COUNT
                } else {
                    1
                };
                for i in 0..burst {
                    let orb = self.make_orb();
                    let delay = i as f32 * FAILURE_ORB_STAGGER;
                    if delay <= 0.0 {
                        spawns.push(orb);
                    } else {
                        self.pending.push(PendingSpawn { delay, spawn: orb });
                    }
                }
            }
        }
    }

    fn make_orb(&mut self) -> AttackSpawn {
        let offset = Vec2::new(
            self.rng.gen_range(-ORB_SPAWN_SPREAD..=ORB_SPAWN_SPREAD),
            self.rng.gen_range(-ORB_SPAWN_SPREAD..=ORB_SPAWN_SPREAD),
        );
        AttackSpawn::HomingOrb { offset, speed: ORB_SPEED, lifetime: ORB_LIFETIME }
    }

    fn emit_shard_ring(&mut self, player: &PlayerStatus, spawns: &mut Vec<AttackSpawn>) {
        let speed = if player.is_time_frozen() { SHARD_SPEED_SLOWED } else { SHARD_SPEED };
        spawns.push(AttackSpawn::IceShardRing {
            arms: SPIRAL_ARMS,
            base_angle: self.spiral_angle,
            speed,
        });
        self.spiral_angle += SPIRAL_STEP;
    }

    fn drain_pending(&mut self, dt: f32, spawns: &mut Vec<AttackSpawn>) {
        let mut i = 0;
        while i < self.pending.len() {
            self.pending[i].delay -= dt;
            if self.pending[i].delay <= 0.0 {
                let p = self.pending.remove(i);
                spawns.push(p.spawn);
            } else {
                i += 1;
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
