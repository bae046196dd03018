/// The session: advances the whole simulation by one tick.
///
/// Processing order:
///   1. Input commands (applied between ticks via `apply`)
///   2. Mask cooldowns + active effect
///   3. Damage-grace decay
///   4. Sentry movement/sweep + visibility (held while time is frozen)
///   5. Detection meter
///   6. Boss encounter (boss level only)
///
/// Pause discipline: the caller skips `update` entirely while paused or
/// during a dialogue. Nothing in here checks a pause flag, so a skipped
/// tick leaks no time anywhere — all timers live in explicit state
/// drained by this function.

use tracing::debug;

use crate::config::Tuning;
use crate::domain::geometry::Vec2;
use crate::domain::mask::MaskId;
use crate::domain::sentry::Sentry;
use crate::domain::status::{cycle_mask, select_mask, StatusEffects};
use super::boss::{AttackSpawn, BossFight};
use super::event::GameEvent;
use super::state::GameStore;

/// Grace window after a heavy hit (laser, crushing wall, boss contact).
const GRACE_HEAVY: f32 = 1.5;
/// Grace window after a light hit (projectiles, being spotted).
const GRACE_LIGHT: f32 = 1.0;

/// Discrete input notifications. Movement is continuous and handled by
/// the host; only the ability keys reach the simulation core.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Command {
    /// Fire the selected mask (Space).
    Activate,
    /// Quick-select a collected mask (keys 1–4 → indices 0–3).
    SelectMask(usize),
    /// Cycle through collected masks (Tab).
    CycleMask,
}

/// What touched the player, as reported by the external collision layer.
/// The core only decides whether the touch costs health.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardKind {
    LaserBeam,
    Bullet,
    SkullWall,
    IceShard,
    HomingOrb,
    BossContact,
    SentryContact,
}

impl HazardKind {
    /// Projectile-class hazards bounce off an active shield.
    fn is_projectile(self) -> bool {
        matches!(self, HazardKind::Bullet | HazardKind::IceShard | HazardKind::HomingOrb)
    }

    fn grace_seconds(self) -> f32 {
        match self {
            HazardKind::LaserBeam | HazardKind::SkullWall | HazardKind::BossContact => GRACE_HEAVY,
            HazardKind::Bullet
            | HazardKind::IceShard
            | HazardKind::HomingOrb
            | HazardKind::SentryContact => GRACE_LIGHT,
        }
    }
}

pub struct Session {
    pub store: GameStore,
    pub masks: StatusEffects,
    pub sentries: Vec<Sentry>,
    boss: Option<BossFight>,
    detection_meter: f32,
    /// Was the player inside any vision cone last tick?
    seen: bool,
    grace_remaining: f32,
    tuning: Tuning,
}

impl Session {
    pub fn new(tuning: Tuning) -> Self {
        Session {
            store: GameStore::new(),
            masks: StatusEffects::new(),
            sentries: Vec::new(),
            boss: None,
            detection_meter: 0.0,
            seen: false,
            grace_remaining: 0.0,
            tuning,
        }
    }

    // ── Input ──

    pub fn apply(&mut self, cmd: Command, events: &mut Vec<GameEvent>) {
        let player = &mut self.store.player;
        match cmd {
            Command::Activate => {
                if let Some(mask) = self.masks.activate(player) {
                    events.push(GameEvent::MaskActivated { mask });
                }
            }
            Command::SelectMask(index) => {
                let before = player.current_mask();
                select_mask(player, index);
                if player.current_mask() != before {
                    if let Some(mask) = player.current_mask() {
                        events.push(GameEvent::MaskSelected { mask });
                    }
                }
            }
            Command::CycleMask => {
                let before = player.current_mask();
                cycle_mask(player);
                if player.current_mask() != before {
                    if let Some(mask) = player.current_mask() {
                        events.push(GameEvent::MaskSelected { mask });
                    }
                }
            }
        }
    }

    /// Pick up a mask found in the level. Announced once; re-collecting
    /// an owned mask is silent.
    pub fn collect_mask(&mut self, mask: MaskId, events: &mut Vec<GameEvent>) {
        if !self.store.player.has_mask(mask) {
            self.store.collect_mask(mask);
            events.push(GameEvent::MaskCollected { mask });
        }
    }

    // ── The tick ──

    /// Advance everything by `dt`. `player_pos` is this tick's position
    /// snapshot from the external physics body. Returns the attack spawn
    /// requests for the entity layer.
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        events: &mut Vec<GameEvent>,
    ) -> Vec<AttackSpawn> {
        if let Some(expired) = self.masks.update(dt, &mut self.store.player) {
            events.push(GameEvent::MaskExpired { mask: expired });
        }

        self.resolve_grace(dt);
        self.resolve_detection(dt, player_pos, events);

        let mut spawns = Vec::new();
        if let Some(boss) = self.boss.as_mut() {
            boss.update(dt, &self.store.player, events, &mut spawns);
        }
        spawns
    }

    fn resolve_grace(&mut self, dt: f32) {
        if self.grace_remaining > 0.0 {
            self.grace_remaining -= dt;
            if self.grace_remaining <= 0.0 {
                self.grace_remaining = 0.0;
                self.store.player.invincible = false;
            }
        }
    }

    fn resolve_detection(&mut self, dt: f32, player_pos: Vec2, events: &mut Vec<GameEvent>) {
        // Frozen time holds every sentry still, cone checks included.
        if self.store.player.is_time_frozen() {
            self.seen = false;
            self.detection_meter = 0.0;
            return;
        }

        for sentry in self.sentries.iter_mut() {
            sentry.update(dt);
        }

        let hidden = self.store.player.is_invisible();
        self.seen = self.sentries.iter().any(|s| s.can_see(player_pos, hidden));

        if !self.seen {
            self.detection_meter = 0.0;
            return;
        }

        // A clean look costs health only once the meter fills.
        self.detection_meter += dt;
        if self.detection_meter >= self.tuning.detection.spot_seconds {
            self.detection_meter = 0.0;
            debug!(health = self.store.player.health(), "player spotted");
            events.push(GameEvent::PlayerSpotted);
            if self.store.damage_player(1) {
                events.push(GameEvent::PlayerDamaged { health: self.store.player.health() });
                self.begin_grace(HazardKind::SentryContact.grace_seconds());
            }
        }
    }

    // ── Collisions ──

    /// Collision notification from the external physics layer: decide
    /// whether the touch costs health. Every blocked case is silent
    /// except the shield, which reports the block (and, for projectiles,
    /// the reflection) so the entity layer can bounce the hazard.
    pub fn hazard_contact(&mut self, hazard: HazardKind, events: &mut Vec<GameEvent>) {
        let player = &self.store.player;
        if player.is_invincible() || player.is_ethereal() {
            return;
        }
        if player.is_shielding() {
            events.push(GameEvent::AttackBlocked { reflected: hazard.is_projectile() });
            return;
        }
        if self.store.damage_player(1) {
            events.push(GameEvent::PlayerDamaged { health: self.store.player.health() });
            self.begin_grace(hazard.grace_seconds());
        }
    }

    fn begin_grace(&mut self, seconds: f32) {
        self.store.player.invincible = true;
        self.grace_remaining = seconds;
    }

    // ── Boss encounter ──

    /// Arm the encounter at boss-scene entry: shortened mask cooldowns
    /// and a fresh fight seeded for reproducibility. The countdown holds
    /// until `start` fires (after the intro dialogue).
    pub fn arm_encounter(&mut self, seed: u64) {
        self.masks.set_cooldown_scale(self.tuning.masks.boss_cooldown_scale);
        self.boss = Some(BossFight::new(self.tuning.boss.clone(), seed));
    }

    pub fn start_encounter(&mut self, events: &mut Vec<GameEvent>) {
        if let Some(boss) = self.boss.as_mut() {
            boss.start(events);
        }
    }

    pub fn boss(&self) -> Option<&BossFight> {
        self.boss.as_ref()
    }

    // ── Read API for the render/UI layer ──

    pub fn is_detected(&self) -> bool {
        self.seen
    }

    /// Alert meter fill, 0 (unseen) to 1 (about to be spotted).
    pub fn detection_fraction(&self) -> f32 {
        (self.detection_meter / self.tuning.detection.spot_seconds).clamp(0.0, 1.0)
    }
}

// ══════════════════════════════════════════════════════════════
// Integration tests
// ══════════════════════════════════════════════════════════════
