/// External tuning loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to built-in values if the file is missing or incomplete;
/// a malformed file is logged and ignored, never fatal — the simulation
/// must come up with sane numbers no matter what is on disk.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

// ── Public tuning structs ──

#[derive(Clone, Debug)]
pub struct Tuning {
    pub detection: DetectionTuning,
    pub masks: MaskTuning,
    pub boss: BossTuning,
}

#[derive(Clone, Debug)]
pub struct DetectionTuning {
    /// Seconds a sentry must keep the player in its cone before the
    /// sighting counts (the alert meter fill time).
    pub spot_seconds: f32,
}

#[derive(Clone, Debug)]
pub struct MaskTuning {
    /// Cooldown multiplier applied during the boss encounter, matching
    /// mask cadence to attack cadence.
    pub boss_cooldown_scale: f32,
}

#[derive(Clone, Debug)]
pub struct BossTuning {
    /// Length of the survival countdown.
    pub survival_seconds: f32,
    /// How long the boss stays stunned once the freeze counter lands.
    pub stun_seconds: f32,
    pub iron_curtain_interval: f32,
    pub spectral_interval: f32,
    pub spiral_lead_in: f32,
    pub spiral_ring_interval: f32,
    pub void_interval: f32,
    pub failure_interval: f32,
}

// ── TOML schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlTuning {
    #[serde(default)]
    detection: TomlDetection,
    #[serde(default)]
    masks: TomlMasks,
    #[serde(default)]
    boss: TomlBoss,
}

#[derive(Deserialize, Debug)]
struct TomlDetection {
    #[serde(default = "default_spot_seconds")]
    spot_seconds: f32,
}

#[derive(Deserialize, Debug)]
struct TomlMasks {
    #[serde(default = "default_boss_cooldown_scale")]
    boss_cooldown_scale: f32,
}

#[derive(Deserialize, Debug)]
struct TomlBoss {
    #[serde(default = "default_survival")]
    survival_seconds: f32,
    #[serde(default = "default_stun")]
    stun_seconds: f32,
    #[serde(default = "default_iron_curtain")]
    iron_curtain_interval: f32,
    #[serde(default = "default_spectral")]
    spectral_interval: f32,
    #[serde(default = "default_spiral_lead_in")]
    spiral_lead_in: f32,
    #[serde(default = "default_spiral_ring")]
    spiral_ring_interval: f32,
    #[serde(default = "default_void")]
    void_interval: f32,
    #[serde(default = "default_failure")]
    failure_interval: f32,
}

// ── Defaults ──

fn default_spot_seconds() -> f32 { 0.5 }
fn default_boss_cooldown_scale() -> f32 { 0.5 }
fn default_survival() -> f32 { 90.0 }
fn default_stun() -> f32 { 6.0 }      // outlasts the 4s freeze window
fn default_iron_curtain() -> f32 { 2.5 }
fn default_spectral() -> f32 { 2.0 }
fn default_spiral_lead_in() -> f32 { 0.5 }
fn default_spiral_ring() -> f32 { 0.08 }
fn default_void() -> f32 { 0.8 }
fn default_failure() -> f32 { 1.2 }

impl Default for TomlDetection {
    fn default() -> Self {
        TomlDetection { spot_seconds: default_spot_seconds() }
    }
}

impl Default for TomlMasks {
    fn default() -> Self {
        TomlMasks { boss_cooldown_scale: default_boss_cooldown_scale() }
    }
}

impl Default for TomlBoss {
    fn default() -> Self {
        TomlBoss {
            survival_seconds: default_survival(),
            stun_seconds: default_stun(),
            iron_curtain_interval: default_iron_curtain(),
            spectral_interval: default_spectral(),
            spiral_lead_in: default_spiral_lead_in(),
            spiral_ring_interval: default_spiral_ring(),
            void_interval: default_void(),
            failure_interval: default_failure(),
        }
    }
}

// ── Loading ──

#[derive(Debug, Error)]
enum TuningError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Tuning {
    /// Load tuning from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        Self::from_toml(load_toml(&candidate_dirs()))
    }

    /// Parse tuning from a TOML string (tests, embedded presets).
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str::<TomlTuning>(text) {
            Ok(cfg) => Self::from_toml(cfg),
            Err(e) => {
                warn!("config parse error: {e}; using defaults");
                Self::default()
            }
        }
    }

    fn from_toml(cfg: TomlTuning) -> Self {
        Tuning {
            detection: DetectionTuning { spot_seconds: cfg.detection.spot_seconds },
            masks: MaskTuning { boss_cooldown_scale: cfg.masks.boss_cooldown_scale },
            boss: BossTuning {
                survival_seconds: cfg.boss.survival_seconds,
                stun_seconds: cfg.boss.stun_seconds,
                iron_curtain_interval: cfg.boss.iron_curtain_interval,
                spectral_interval: cfg.boss.spectral_interval,
                spiral_lead_in: cfg.boss.spiral_lead_in,
                spiral_ring_interval: cfg.boss.spiral_ring_interval,
                void_interval: cfg.boss.void_interval,
                failure_interval: cfg.boss.failure_interval,
            },
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::from_toml(TomlTuning::default())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn try_load(path: &Path) -> Result<TomlTuning, TuningError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<TomlTuning>(&text)?)
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlTuning {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match try_load(&path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!("{}: {e}; using default tuning", path.display());
                    return TomlTuning::default();
                }
            }
        }
    }
    TomlTuning::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let t = Tuning::default();
        assert_eq!(t.boss.survival_seconds, 90.0);
        assert_eq!(t.detection.spot_seconds, 0.5);
        assert!(t.boss.stun_seconds > 4.0, "stun must outlast the freeze effect");
        assert!(t.masks.boss_cooldown_scale < 1.0);
    }

    #[test]
    fn partial_toml_fills_missing_keys() {
        let t = Tuning::from_toml_str("[boss]\nsurvival_seconds = 60.0\n");
        assert_eq!(t.boss.survival_seconds, 60.0);
        assert_eq!(t.boss.failure_interval, 1.2);
        assert_eq!(t.detection.spot_seconds, 0.5);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let t = Tuning::from_toml_str("boss = {{{{");
        assert_eq!(t.boss.survival_seconds, 90.0);
    }
}
