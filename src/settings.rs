// Saved on quit, loaded on startup. Settings only: no exercise, no score
// history, nothing from a run survives the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Config, Level};

const RHYTHMO_DIR: &str = ".rhythmo";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub bpm: u32,
    pub level: u8,
    pub bars_count: usize,
    pub echo_mode: bool,
    pub strict_mode: bool,
    pub play_notes: bool,
    pub vol_metro: f32,
    pub vol_notes: f32,
}

impl From<&Config> for Settings {
    fn from(c: &Config) -> Self {
        Self {
            bpm: c.bpm,
            level: c.level.number(),
            bars_count: c.bars_count,
            echo_mode: c.echo_mode,
            strict_mode: c.strict_mode,
            play_notes: c.play_notes,
            vol_metro: c.vol_metro,
            vol_notes: c.vol_notes,
        }
    }
}

impl Settings {
    // values from disk go through the same clamps as live input
    pub fn into_config(self) -> Config {
        Config {
            bpm: self.bpm,
            level: Level::from_number(self.level),
            bars_count: self.bars_count,
            echo_mode: self.echo_mode,
            strict_mode: self.strict_mode,
            play_notes: self.play_notes,
            vol_metro: self.vol_metro,
            vol_notes: self.vol_notes,
        }
        .clamped()
    }
}

// <base_dir>/.rhythmo/settings.json
fn settings_path(base_dir: &Path) -> PathBuf {
    base_dir.join(RHYTHMO_DIR).join(SETTINGS_FILE)
}

pub fn load_settings(base_dir: &Path) -> Option<Settings> {
    let data = std::fs::read_to_string(settings_path(base_dir)).ok()?;
    serde_json::from_str(&data).ok()
}

pub fn save_settings(base_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = settings_path(base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_json() {
        let config = Config::default();
        let settings = Settings::from(&config);
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        let config2 = back.into_config();
        assert_eq!(config2.bpm, config.bpm);
        assert_eq!(config2.level, config.level);
        assert_eq!(config2.bars_count, config.bars_count);
    }

    #[test]
    fn out_of_range_saved_values_are_clamped_on_load() {
        let settings = Settings {
            bpm: 999,
            level: 9,
            bars_count: 1,
            echo_mode: false,
            strict_mode: true,
            play_notes: true,
            vol_metro: 2.0,
            vol_notes: -1.0,
        };
        let config = settings.into_config();
        assert_eq!(config.bpm, crate::core::MAX_BPM);
        assert_eq!(config.bars_count, crate::core::MIN_BARS);
        assert_eq!(config.vol_metro, 1.0);
        assert_eq!(config.vol_notes, 0.0);
        assert_eq!(config.level, Level::Quarters); // unknown level falls back
    }
}
