/// The mask catalog: the four ability definitions, loaded nowhere —
/// they are fixed game data, like tile kinds.

/// Identity of a collectible mask. Also the player's quick-select order
/// (key 1 = Silence, … key 4 = Shield).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MaskId {
    Silence,
    Ghost,
    Frozen,
    Shield,
}

/// What a mask does to the world while its effect runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EffectKind {
    /// Sentries cannot see the player.
    Invisibility,
    /// Contact hazards pass through the player.
    Intangibility,
    /// Enemies and enemy projectiles run at a fraction of their speed.
    GlobalSlow,
    /// Incoming projectiles are blocked and bounced back.
    Reflect,
}

/// Immutable definition of one mask ability.
#[derive(Clone, Copy, Debug)]
pub struct MaskDef {
    pub id: MaskId,
    pub name: &'static str,
    /// Seconds between activations (starts counting at activation).
    pub cooldown: f32,
    /// Seconds the effect stays up once activated.
    pub duration: f32,
    pub kind: EffectKind,
}

pub const MASK_COUNT: usize = 4;

pub static CATALOG: [MaskDef; MASK_COUNT] = [
    MaskDef {
        id: MaskId::Silence,
        name: "Mask of Silence",
        cooldown: 10.0,
        duration: 5.0,
        kind: EffectKind::Invisibility,
    },
    MaskDef {
        id: MaskId::Ghost,
        name: "Ghost Mask",
        cooldown: 8.0,
        duration: 3.0,
        kind: EffectKind::Intangibility,
    },
    MaskDef {
        id: MaskId::Frozen,
        name: "Frozen Mask",
        cooldown: 12.0,
        duration: 4.0,
        kind: EffectKind::GlobalSlow,
    },
    MaskDef {
        id: MaskId::Shield,
        name: "Shield Mask",
        cooldown: 8.0,
        duration: 3.0,
        kind: EffectKind::Reflect,
    },
];

impl MaskId {
    pub const ALL: [MaskId; MASK_COUNT] =
        [MaskId::Silence, MaskId::Ghost, MaskId::Frozen, MaskId::Shield];

    pub fn def(self) -> &'static MaskDef {
        &CATALOG[self as usize]
    }

    pub fn kind(self) -> EffectKind {
        self.def().kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_match_positions() {
        for (i, def) in CATALOG.iter().enumerate() {
            assert_eq!(def.id as usize, i);
            assert_eq!(MaskId::ALL[i], def.id);
        }
    }

    #[test]
    fn every_mask_outlasts_nothing() {
        // Duration never exceeds cooldown, so an effect always ends
        // before the mask can fire again.
        for def in &CATALOG {
            assert!(def.duration < def.cooldown, "{:?}", def.id);
        }
    }
}
