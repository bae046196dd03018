/// Events emitted during a simulation step.
/// The presentation layer consumes these for banners, flashes and sound.

use crate::domain::mask::MaskId;
use super::boss::BossPhase;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GameEvent {
    MaskSelected { mask: MaskId },
    MaskActivated { mask: MaskId },
    MaskExpired { mask: MaskId },
    MaskCollected { mask: MaskId },
    /// The detection meter filled: a sentry got a clean look.
    PlayerSpotted,
    PlayerDamaged { health: u32 },
    /// A hazard hit the shield; `reflected` for projectile-class hazards.
    AttackBlocked { reflected: bool },
    PhaseChanged { phase: BossPhase },
    /// System-failure attack cue naming the mask that answers it.
    CounterHint { mask: MaskId },
    BossStunned,
    /// The survival clock ran out: the encounter is won.
    EncounterWon,
    /// All live attack emitters should be despawned by the entity layer.
    AttacksCleared,
}
