//! Mask Runner simulation core.
//!
//! The runtime combat/stealth logic of the game, independent of any
//! renderer: per-tick sentry detection, the player's four timed mask
//! abilities, and the survival boss encounter. The host game loop owns
//! the frame clock and feeds `sim::step::Session` one `update(dt)` per
//! frame (skipping it entirely while paused or in dialogue), applies
//! discrete input via `Command`, and forwards collision notifications
//! as `HazardKind` contacts. Everything the render/UI layer needs back
//! comes out as plain queries, `GameEvent`s and `AttackSpawn` requests.

pub mod config;
pub mod domain;
pub mod sim;

pub use config::Tuning;
pub use domain::geometry::Vec2;
pub use domain::mask::{EffectKind, MaskDef, MaskId};
pub use domain::sentry::Sentry;
pub use domain::status::{ActiveEffect, PlayerStatus, StatusEffects};
pub use sim::boss::{phase_style, AttackSpawn, BossFight, BossPhase, PhaseStyle};
pub use sim::event::GameEvent;
pub use sim::state::GameStore;
pub use sim::step::{Command, HazardKind, Session};
