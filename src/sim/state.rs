/// GameStore: the shared record every component reads.
///
/// A thin container with invariant-enforcing accessors and no behavior of
/// its own beyond level progression. It is passed explicitly into whatever
/// needs it — there is no module-level instance, so tests can run any
/// number of stores side by side.

use crate::domain::mask::MaskId;
use crate::domain::status::{PlayerStatus, DEFAULT_MAX_HEALTH};

pub const BOSS_LEVEL: u32 = 5;

#[derive(Clone, Debug)]
pub struct GameStore {
    pub player: PlayerStatus,
    pub current_level: u32,
    // Both flags gate the host loop: while either is set the caller skips
    // every update(dt) in this crate.
    pub paused: bool,
    pub dialogue_active: bool,
}

impl GameStore {
    pub fn new() -> Self {
        GameStore {
            player: PlayerStatus::new(),
            current_level: 1,
            paused: false,
            dialogue_active: false,
        }
    }

    /// The mask earned by clearing `level`, if any.
    /// One mask per completed level, in quick-select order.
    pub fn mask_for_level(level: u32) -> Option<MaskId> {
        match level {
            1 => Some(MaskId::Silence),
            2 => Some(MaskId::Ghost),
            3 => Some(MaskId::Frozen),
            4 => Some(MaskId::Shield),
            _ => None,
        }
    }

    // ── Damage / health ──

    /// Apply damage unless a protective state blocks it. Returns whether
    /// health actually changed. Never underflows; death is derived via
    /// `is_player_dead`, not stored.
    pub fn damage_player(&mut self, amount: u32) -> bool {
        let p = &self.player;
        if p.is_invincible() || p.is_ethereal() || p.is_shielding() {
            return false;
        }
        let before = self.player.health();
        self.player.set_health(before.saturating_sub(amount));
        before != self.player.health()
    }

    pub fn heal_player(&mut self, amount: u32) {
        let h = self.player.health().saturating_add(amount);
        self.player.set_health(h); // clamps to max
    }

    pub fn is_player_dead(&self) -> bool {
        self.player.is_dead()
    }

    // ── Resets / progression ──

    /// Retry reset: back to full health and a clean effect state, but the
    /// masks collected so far survive.
    pub fn reset_player_state(&mut self) {
        let collected = std::mem::take(&mut self.player.collected);
        self.player = PlayerStatus::new();
        self.player.collected = collected;
    }

    /// Menu-return reset: wipes everything, collected masks included.
    pub fn reset_game_state(&mut self) {
        *self = GameStore::new();
    }

    /// Seed the player for entering `level`: full health, and the mask
    /// earned on the previous level pre-selected (boss level: the first
    /// collected mask; level 1: bare-faced).
    pub fn prepare_for_level(&mut self, level: u32) {
        self.current_level = level;
        self.player.set_health(DEFAULT_MAX_HEALTH);
        self.player.current_mask = if level <= 1 {
            None
        } else if level < BOSS_LEVEL {
            Self::mask_for_level(level - 1).filter(|&m| self.player.has_mask(m))
        } else {
            self.player.collected.first().copied()
        };
    }

    /// Clearing the current level awards its mask and moves on.
    /// Returns the award so the caller can announce it.
    pub fn complete_level(&mut self) -> Option<MaskId> {
        let cleared = self.current_level;
        self.current_level += 1;
        self.reset_player_state();
        let award = Self::mask_for_level(cleared);
        if let Some(mask) = award {
            self.player.collect(mask);
        }
        award
    }

    pub fn collect_mask(&mut self, mask: MaskId) {
        self.player.collect(mask);
    }
}

impl Default for GameStore {
    fn default() -> Self {
        GameStore::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::StatusEffects;

    #[test]
    fn damage_clamps_at_zero() {
        let mut s = GameStore::new();
        assert!(s.damage_player(2));
        assert_eq!(s.player.health(), 1);
        assert!(s.damage_player(5));
        assert_eq!(s.player.health(), 0);
        assert!(s.is_player_dead());
        // Already at zero: nothing changes, still dead, never negative.
        assert!(!s.damage_player(1));
        assert_eq!(s.player.health(), 0);
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut s = GameStore::new();
        s.damage_player(2);
        s.heal_player(10);
        assert_eq!(s.player.health(), s.player.max_health());
    }

    #[test]
    fn protected_player_takes_no_damage() {
        let mut s = GameStore::new();
        let mut fx = StatusEffects::new();

        s.collect_mask(MaskId::Ghost);
        s.prepare_for_level(3); // pre-selects ghost
        assert_eq!(s.player.current_mask(), Some(MaskId::Ghost));
        fx.activate(&mut s.player);
        assert!(!s.damage_player(1));
        assert_eq!(s.player.health(), 3);

        fx.reset(&mut s.player);
        s.player.invincible = true;
        assert!(!s.damage_player(1));
        assert_eq!(s.player.health(), 3);
    }

    #[test]
    fn player_reset_keeps_collected_masks() {
        let mut s = GameStore::new();
        s.collect_mask(MaskId::Silence);
        s.collect_mask(MaskId::Ghost);
        s.damage_player(2);

        s.reset_player_state();
        assert_eq!(s.player.health(), 3);
        assert_eq!(s.player.collected(), &[MaskId::Silence, MaskId::Ghost]);
        assert_eq!(s.player.current_mask(), None);
    }

    #[test]
    fn game_reset_wipes_everything() {
        let mut s = GameStore::new();
        s.collect_mask(MaskId::Silence);
        s.current_level = 4;
        s.reset_game_state();
        assert!(s.player.collected().is_empty());
        assert_eq!(s.current_level, 1);
    }

    #[test]
    fn level_progression_awards_one_mask_per_level() {
        let mut s = GameStore::new();

        s.prepare_for_level(1);
        assert_eq!(s.player.current_mask(), None);

        assert_eq!(s.complete_level(), Some(MaskId::Silence));
        s.prepare_for_level(2);
        assert_eq!(s.player.current_mask(), Some(MaskId::Silence));

        assert_eq!(s.complete_level(), Some(MaskId::Ghost));
        assert_eq!(s.complete_level(), Some(MaskId::Frozen));
        assert_eq!(s.complete_level(), Some(MaskId::Shield));
        assert_eq!(
            s.player.collected(),
            &[MaskId::Silence, MaskId::Ghost, MaskId::Frozen, MaskId::Shield]
        );

        s.prepare_for_level(BOSS_LEVEL);
        assert_eq!(s.player.current_mask(), Some(MaskId::Silence));
    }

    #[test]
    fn prepare_skips_mask_not_actually_collected() {
        let mut s = GameStore::new();
        // Entering level 3 without having earned the level-2 mask.
        s.prepare_for_level(3);
        assert_eq!(s.player.current_mask(), None);
    }
}
