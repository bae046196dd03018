/// Player status and the mask ability controller.
///
/// The four world-altering effects are one tagged union: holding them as a
/// single `Option<ActiveEffect>` makes "at most one effect at a time" a
/// property of the representation, not a convention. The invincibility
/// grace window after a hit is a separate flag and may overlap any effect.
///
/// Timekeeping is explicit state drained by `update(dt)` — no scheduled
/// callbacks. Pausing is the caller's job: skip `update` and nothing moves.

use super::mask::{EffectKind, MaskId, MASK_COUNT};

// ══════════════════════════════════════════════════════════════
// Active effect
// ══════════════════════════════════════════════════════════════

/// A running mask effect and the seconds it has left.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ActiveEffect {
    Invisible { remaining: f32 },
    Ethereal { remaining: f32 },
    Shielding { remaining: f32 },
    Frozen { remaining: f32 },
}

impl ActiveEffect {
    fn for_kind(kind: EffectKind, duration: f32) -> Self {
        match kind {
            EffectKind::Invisibility => ActiveEffect::Invisible { remaining: duration },
            EffectKind::Intangibility => ActiveEffect::Ethereal { remaining: duration },
            EffectKind::Reflect => ActiveEffect::Shielding { remaining: duration },
            EffectKind::GlobalSlow => ActiveEffect::Frozen { remaining: duration },
        }
    }

    /// The mask whose activation produced this effect.
    pub fn source_mask(&self) -> MaskId {
        match self {
            ActiveEffect::Invisible { .. } => MaskId::Silence,
            ActiveEffect::Ethereal { .. } => MaskId::Ghost,
            ActiveEffect::Shielding { .. } => MaskId::Shield,
            ActiveEffect::Frozen { .. } => MaskId::Frozen,
        }
    }

    pub fn remaining(&self) -> f32 {
        match self {
            ActiveEffect::Invisible { remaining }
            | ActiveEffect::Ethereal { remaining }
            | ActiveEffect::Shielding { remaining }
            | ActiveEffect::Frozen { remaining } => *remaining,
        }
    }

    fn remaining_mut(&mut self) -> &mut f32 {
        match self {
            ActiveEffect::Invisible { remaining }
            | ActiveEffect::Ethereal { remaining }
            | ActiveEffect::Shielding { remaining }
            | ActiveEffect::Frozen { remaining } => remaining,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player status
// ══════════════════════════════════════════════════════════════

pub const DEFAULT_MAX_HEALTH: u32 = 3;

/// The shared player record. Health is clamped to [0, max] through the
/// accessors; death is derived from health, never stored.
#[derive(Clone, Debug)]
pub struct PlayerStatus {
    health: u32,
    max_health: u32,
    pub(crate) current_mask: Option<MaskId>,
    pub(crate) collected: Vec<MaskId>,
    pub(crate) invincible: bool,
    pub(crate) active: Option<ActiveEffect>,
}

impl PlayerStatus {
    pub fn new() -> Self {
        PlayerStatus {
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            current_mask: None,
            collected: Vec::new(),
            invincible: false,
            active: None,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn current_mask(&self) -> Option<MaskId> {
        self.current_mask
    }

    pub fn collected(&self) -> &[MaskId] {
        &self.collected
    }

    pub fn has_mask(&self, id: MaskId) -> bool {
        self.collected.contains(&id)
    }

    /// Add a mask to the collection (idempotent, keeps unlock order).
    pub(crate) fn collect(&mut self, id: MaskId) {
        if !self.collected.contains(&id) {
            self.collected.push(id);
        }
    }

    pub fn active_effect(&self) -> Option<&ActiveEffect> {
        self.active.as_ref()
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn is_invisible(&self) -> bool {
        matches!(self.active, Some(ActiveEffect::Invisible { .. }))
    }

    pub fn is_ethereal(&self) -> bool {
        matches!(self.active, Some(ActiveEffect::Ethereal { .. }))
    }

    pub fn is_shielding(&self) -> bool {
        matches!(self.active, Some(ActiveEffect::Shielding { .. }))
    }

    pub fn is_time_frozen(&self) -> bool {
        matches!(self.active, Some(ActiveEffect::Frozen { .. }))
    }
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Mask selection (does not touch running effects or cooldowns)
// ══════════════════════════════════════════════════════════════

/// Select a collected mask by quick-select index. Out-of-range is a no-op.
/// A running effect keeps running: effects are bound to the mask that
/// fired them, not to the current selection.
pub fn select_mask(player: &mut PlayerStatus, index: usize) {
    if index < player.collected.len() {
        player.current_mask = Some(player.collected[index]);
    }
}

/// Cycle to the next collected mask (wraps; no-op with nothing collected).
pub fn cycle_mask(player: &mut PlayerStatus) {
    if player.collected.is_empty() {
        return;
    }
    let next = match player.current_mask {
        None => 0,
        Some(cur) => {
            let at = player.collected.iter().position(|&m| m == cur);
            match at {
                Some(i) => (i + 1) % player.collected.len(),
                None => 0,
            }
        }
    };
    player.current_mask = Some(player.collected[next]);
}

// ══════════════════════════════════════════════════════════════
// Cooldowns
// ══════════════════════════════════════════════════════════════

/// Remaining cooldown seconds per mask, floored at zero.
#[derive(Clone, Debug, Default)]
pub struct CooldownTable {
    remaining: [f32; MASK_COUNT],
}

impl CooldownTable {
    pub fn new() -> Self {
        CooldownTable::default()
    }

    pub fn get(&self, mask: MaskId) -> f32 {
        self.remaining[mask as usize]
    }

    pub fn is_ready(&self, mask: MaskId) -> bool {
        self.remaining[mask as usize] <= 0.0
    }

    fn set(&mut self, mask: MaskId, seconds: f32) {
        self.remaining[mask as usize] = seconds.max(0.0);
    }

    fn tick(&mut self, dt: f32) {
        for r in self.remaining.iter_mut() {
            if *r > 0.0 {
                *r = (*r - dt).max(0.0);
            }
        }
    }

    fn clear(&mut self) {
        self.remaining = [0.0; MASK_COUNT];
    }
}

// ══════════════════════════════════════════════════════════════
// Controller
// ══════════════════════════════════════════════════════════════

/// Owns the cooldown table and is the only writer of the player's active
/// effect. One `update(dt)` per simulated tick.
#[derive(Clone, Debug)]
pub struct StatusEffects {
    cooldowns: CooldownTable,
    /// Scene-level cooldown multiplier. Boss scenes set this below 1 so
    /// mask cadence keeps up with the attack cadence.
    cooldown_scale: f32,
}

impl StatusEffects {
    pub fn new() -> Self {
        StatusEffects { cooldowns: CooldownTable::new(), cooldown_scale: 1.0 }
    }

    pub fn set_cooldown_scale(&mut self, scale: f32) {
        self.cooldown_scale = scale.max(0.0);
    }

    /// Fire the currently selected mask.
    ///
    /// No-op (returns None) when no mask is equipped or the mask is still
    /// cooling down. On success the mask's cooldown starts and its effect
    /// replaces whatever effect was running, returning the fired id.
    /// Re-activation during the effect window is impossible: the cooldown
    /// is always at least the duration.
    pub fn activate(&mut self, player: &mut PlayerStatus) -> Option<MaskId> {
        let mask = player.current_mask?;
        if !self.cooldowns.is_ready(mask) {
            return None;
        }
        let def = mask.def();
        self.cooldowns.set(mask, def.cooldown * self.cooldown_scale);
        player.active = Some(ActiveEffect::for_kind(def.kind, def.duration));
        Some(mask)
    }

    /// Advance cooldowns and the running effect by `dt` seconds.
    ///
    /// Returns the mask whose effect expired this tick, if any. Expiry
    /// clears only the effect that ran out; the grace flag and cooldowns
    /// are untouched. The caller must skip this entirely while the game
    /// is paused or a dialogue is up.
    pub fn update(&mut self, dt: f32, player: &mut PlayerStatus) -> Option<MaskId> {
        self.cooldowns.tick(dt);

        let effect = player.active.as_mut()?;
        let remaining = effect.remaining_mut();
        *remaining -= dt;
        if *remaining <= 0.0 {
            let expired = effect.source_mask();
            player.active = None;
            return Some(expired);
        }
        None
    }

    pub fn cooldown(&self, mask: MaskId) -> f32 {
        self.cooldowns.get(mask)
    }

    /// Remaining cooldown as a fraction of the base value, for UI bars.
    /// 0 = ready, 1 = just fired.
    pub fn cooldown_fraction(&self, mask: MaskId) -> f32 {
        let base = mask.def().cooldown;
        (self.cooldowns.get(mask) / base).clamp(0.0, 1.0)
    }

    /// Zero all cooldowns and cancel any running effect (level restart).
    pub fn reset(&mut self, player: &mut PlayerStatus) {
        self.cooldowns.clear();
        player.active = None;
    }
}

impl Default for StatusEffects {
    fn default() -> Self {
        StatusEffects::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with(masks: &[MaskId]) -> PlayerStatus {
        let mut p = PlayerStatus::new();
        for &m in masks {
            p.collect(m);
        }
        p.current_mask = masks.first().copied();
        p
    }

    #[test]
    fn activate_without_mask_is_noop() {
        let mut fx = StatusEffects::new();
        let mut p = PlayerStatus::new();
        assert_eq!(fx.activate(&mut p), None);
        assert!(p.active.is_none());
    }

    #[test]
    fn activation_timeline() {
        // Ghost: cooldown 8, duration 3.
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Ghost]);

        assert_eq!(fx.activate(&mut p), Some(MaskId::Ghost));
        assert!(p.is_ethereal());
        assert!((fx.cooldown(MaskId::Ghost) - 8.0).abs() < 1e-4);

        // t=1: re-activation blocked by the cooldown; the running effect
        // is untouched.
        fx.update(1.0, &mut p);
        assert_eq!(fx.activate(&mut p), None);
        assert!((p.active_effect().unwrap().remaining() - 2.0).abs() < 1e-4);

        // Effect clears at t=3 from the original activation.
        fx.update(1.0, &mut p);
        assert!(p.is_ethereal());
        let expired = fx.update(1.0, &mut p);
        assert_eq!(expired, Some(MaskId::Ghost));
        assert!(!p.is_ethereal());

        // Cooldown reaches 0 at t=8, not before.
        for _ in 0..4 {
            fx.update(1.0, &mut p);
        }
        assert!((fx.cooldown(MaskId::Ghost) - 1.0).abs() < 1e-4);
        assert_eq!(fx.activate(&mut p), None);
        fx.update(1.0, &mut p);
        assert!(fx.cooldowns.is_ready(MaskId::Ghost));
        assert_eq!(fx.activate(&mut p), Some(MaskId::Ghost));
    }

    #[test]
    fn double_activation_same_tick_changes_state_once() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Silence]);

        assert_eq!(fx.activate(&mut p), Some(MaskId::Silence));
        let cd = fx.cooldown(MaskId::Silence);
        let rem = p.active_effect().unwrap().remaining();

        // Second press before any update: nothing moves.
        assert_eq!(fx.activate(&mut p), None);
        assert_eq!(fx.cooldown(MaskId::Silence), cd);
        assert_eq!(p.active_effect().unwrap().remaining(), rem);
    }

    #[test]
    fn cooldowns_are_monotonic_and_never_negative() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Frozen]);
        fx.activate(&mut p);

        let mut prev = fx.cooldown(MaskId::Frozen);
        for _ in 0..200 {
            fx.update(0.1, &mut p);
            let now = fx.cooldown(MaskId::Frozen);
            assert!(now <= prev);
            assert!(now >= 0.0);
            prev = now;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn at_most_one_effect_at_a_time() {
        // Activate ghost, switch to shield mid-effect, activate shield:
        // the union holds exactly one effect at every step.
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Ghost, MaskId::Shield]);

        fx.activate(&mut p);
        assert!(p.is_ethereal() && !p.is_shielding());

        select_mask(&mut p, 1);
        fx.activate(&mut p);
        assert!(p.is_shielding() && !p.is_ethereal());
        assert_eq!(
            [p.is_invisible(), p.is_ethereal(), p.is_shielding(), p.is_time_frozen()]
                .iter()
                .filter(|&&f| f)
                .count(),
            1
        );
    }

    #[test]
    fn switching_does_not_cancel_effect_or_cooldown() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Silence, MaskId::Frozen]);

        fx.activate(&mut p);
        assert!(p.is_invisible());

        select_mask(&mut p, 1);
        assert_eq!(p.current_mask(), Some(MaskId::Frozen));
        assert!(p.is_invisible(), "switching must not cancel the running effect");
        assert!(fx.cooldown(MaskId::Silence) > 0.0);
    }

    #[test]
    fn expiry_clears_only_its_own_effect() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Ghost, MaskId::Silence]);

        // Ghost (3s) replaced by silence (5s) at t=2. The ghost timer is
        // gone with the replacement; silence runs its own full window.
        fx.activate(&mut p);
        fx.update(2.0, &mut p);
        select_mask(&mut p, 1);
        fx.activate(&mut p);
        assert!(p.is_invisible());

        // t=3 would have been ghost's expiry; silence is unaffected.
        assert_eq!(fx.update(1.0, &mut p), None);
        assert!(p.is_invisible());
        assert_eq!(fx.update(4.0, &mut p), Some(MaskId::Silence));
        assert!(p.active.is_none());
    }

    #[test]
    fn select_and_cycle_edge_cases() {
        let mut p = PlayerStatus::new();
        select_mask(&mut p, 0);
        cycle_mask(&mut p);
        assert_eq!(p.current_mask(), None);

        p.collect(MaskId::Silence);
        p.collect(MaskId::Ghost);
        select_mask(&mut p, 5);
        assert_eq!(p.current_mask(), None, "out-of-range select is a no-op");

        cycle_mask(&mut p);
        assert_eq!(p.current_mask(), Some(MaskId::Silence));
        cycle_mask(&mut p);
        assert_eq!(p.current_mask(), Some(MaskId::Ghost));
        cycle_mask(&mut p);
        assert_eq!(p.current_mask(), Some(MaskId::Silence));
    }

    #[test]
    fn boss_scale_shortens_cooldown_not_duration() {
        let mut fx = StatusEffects::new();
        fx.set_cooldown_scale(0.5);
        let mut p = player_with(&[MaskId::Silence]);

        fx.activate(&mut p);
        assert!((fx.cooldown(MaskId::Silence) - 5.0).abs() < 1e-4);
        assert!((p.active_effect().unwrap().remaining() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn cooldown_fraction_tracks_base() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Frozen]); // cooldown 12
        assert_eq!(fx.cooldown_fraction(MaskId::Frozen), 0.0);
        fx.activate(&mut p);
        assert!((fx.cooldown_fraction(MaskId::Frozen) - 1.0).abs() < 1e-4);
        fx.update(6.0, &mut p);
        assert!((fx.cooldown_fraction(MaskId::Frozen) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn reset_clears_cooldowns_and_effect() {
        let mut fx = StatusEffects::new();
        let mut p = player_with(&[MaskId::Shield]);
        fx.activate(&mut p);
        fx.reset(&mut p);
        assert!(fx.cooldowns.is_ready(MaskId::Shield));
        assert!(p.active.is_none());
    }

    #[test]
    fn health_is_clamped() {
        let mut p = PlayerStatus::new();
        p.set_health(100);
        assert_eq!(p.health(), p.max_health());
        p.set_health(0);
        assert!(p.is_dead());
    }
}
