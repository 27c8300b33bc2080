//! Game tuning
//!
//! Loaded from a JSON file; every field has a default so partial files work.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::area::AreaShape;
use crate::sim::obstacle::Obstacle;
use crate::sim::population::SpawnEntry;
use crate::sim::state::CollectibleKind;

/// Bullet time tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTimeSettings {
    /// Game clock rate while active (0.05 - 1.0)
    pub slow_factor: f32,
    /// Real seconds the effect lasts
    pub duration: f32,
    /// Share of real time the idle swing keeps while active (0.0 - 1.0)
    pub swing_factor: f32,
}

impl Default for BulletTimeSettings {
    fn default() -> Self {
        Self {
            slow_factor: 0.2,
            duration: 10.0,
            swing_factor: 0.6,
        }
    }
}

/// Level countdown tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    pub start_seconds: f32,
    /// Remaining time at which the warning cue plays once
    pub warning_seconds: f32,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            start_seconds: 90.0,
            warning_seconds: 3.0,
        }
    }
}

/// Fishing rod tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RodSettings {
    /// Rod tip position (hook origin)
    pub tip: Vec2,
    /// Swing amplitude in degrees
    pub max_swing_deg: f32,
    /// Swing frequency
    pub swing_hz: f32,
    /// Hook distance below the tip while idle
    pub idle_line_length: f32,
    pub extend_speed: f32,
    pub retract_speed: f32,
    pub max_line_length: f32,
    /// Catch radius around the hook
    pub hook_radius: f32,
}

impl Default for RodSettings {
    fn default() -> Self {
        Self {
            tip: Vec2::new(0.0, 2.5),
            max_swing_deg: 60.0,
            swing_hz: 1.8,
            idle_line_length: 0.4,
            extend_speed: 8.0,
            retract_speed: 12.0,
            max_line_length: 5.0,
            hook_radius: 0.15,
        }
    }
}

/// Collectible spawner tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    pub entries: Vec<SpawnEntry>,
    /// Population cap
    pub max_population: usize,
    /// Seconds between maintenance polls
    pub check_interval: f32,
    /// Water area; when absent, candidates come from a disc around `origin`
    pub water_area: Option<AreaShape>,
    pub edge_padding: f32,
    /// Fallback disc radius
    pub spawn_radius: f32,
    pub max_attempts: u32,
    pub entity_radius: f32,
    pub min_gap: f32,
    /// Reference point for obstacle line tests and the fallback disc
    pub origin: Vec2,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            entries: vec![
                SpawnEntry::new(CollectibleKind::SmallFish, 3.0),
                SpawnEntry::new(CollectibleKind::BigFish, 2.0),
                SpawnEntry::new(CollectibleKind::Star, 1.0),
            ],
            max_population: 7,
            check_interval: 0.05,
            water_area: Some(AreaShape::Rect {
                min: Vec2::new(-6.0, -4.0),
                max: Vec2::new(6.0, 0.0),
            }),
            edge_padding: 0.1,
            spawn_radius: 8.0,
            max_attempts: 40,
            entity_radius: 0.35,
            min_gap: 0.1,
            origin: Vec2::new(0.0, 2.5),
        }
    }
}

/// All game tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bullet_time: BulletTimeSettings,
    pub countdown: CountdownSettings,
    pub rod: RodSettings,
    pub spawner: SpawnerSettings,
    /// Obstacle layer used by spawn placement
    pub obstacles: Vec<Obstacle>,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.sanitize();
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Clamp ranged values into their valid intervals
    pub fn sanitize(&mut self) {
        clamp_field("bullet_time.slow_factor", &mut self.bullet_time.slow_factor, 0.05, 1.0);
        clamp_field("bullet_time.swing_factor", &mut self.bullet_time.swing_factor, 0.0, 1.0);
        clamp_field("bullet_time.duration", &mut self.bullet_time.duration, 0.0, f32::MAX);
        clamp_field("countdown.start_seconds", &mut self.countdown.start_seconds, 0.0, f32::MAX);
        clamp_field(
            "countdown.warning_seconds",
            &mut self.countdown.warning_seconds,
            0.0,
            f32::MAX,
        );
        clamp_field("spawner.check_interval", &mut self.spawner.check_interval, 0.001, f32::MAX);
        clamp_field("spawner.edge_padding", &mut self.spawner.edge_padding, 0.0, f32::MAX);
        clamp_field("spawner.entity_radius", &mut self.spawner.entity_radius, 0.0, f32::MAX);
        clamp_field("spawner.min_gap", &mut self.spawner.min_gap, 0.0, f32::MAX);
        clamp_field("spawner.spawn_radius", &mut self.spawner.spawn_radius, 0.0, f32::MAX);
        clamp_field("rod.max_line_length", &mut self.rod.max_line_length, 0.0, f32::MAX);
        clamp_field("rod.extend_speed", &mut self.rod.extend_speed, 0.001, f32::MAX);
        clamp_field("rod.retract_speed", &mut self.rod.retract_speed, 0.001, f32::MAX);
    }
}

fn clamp_field(name: &str, value: &mut f32, min: f32, max: f32) {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != *value {
        log::warn!("Setting {name} = {} out of range, clamped to {clamped}", *value);
        *value = clamped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuning() {
        let s = Settings::default();
        assert_eq!(s.bullet_time.slow_factor, 0.2);
        assert_eq!(s.bullet_time.duration, 10.0);
        assert_eq!(s.countdown.start_seconds, 90.0);
        assert_eq!(s.spawner.max_population, 7);
        assert_eq!(s.spawner.max_attempts, 40);
        assert_eq!(s.spawner.entries.len(), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{ "bullet_time": { "duration": 4.0 } }"#).unwrap();
        assert_eq!(s.bullet_time.duration, 4.0);
        assert_eq!(s.bullet_time.slow_factor, 0.2);
        assert_eq!(s.rod, RodSettings::default());
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let mut s = Settings::default();
        s.bullet_time.slow_factor = 0.0;
        s.bullet_time.swing_factor = 3.0;
        s.spawner.check_interval = -1.0;
        s.sanitize();
        assert_eq!(s.bullet_time.slow_factor, 0.05);
        assert_eq!(s.bullet_time.swing_factor, 1.0);
        assert_eq!(s.spawner.check_interval, 0.001);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut s = Settings::default();
        s.countdown.start_seconds = 45.0;
        s.spawner.water_area = None;
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_or_default(&dir.path().join("missing.json"));
        assert_eq!(s, Settings::default());
    }
}
