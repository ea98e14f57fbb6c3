use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::levels;

/// Save blob written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub current_level: usize,
    pub sound_enabled: bool,
}

/// Session progress. Survives state transitions; level 0 means the
/// splash screen.
#[derive(Resource, Debug, Clone)]
pub struct Progress {
    pub current_level: usize,
    pub sound_enabled: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_level: 0,
            sound_enabled: true,
        }
    }
}

impl Progress {
    pub fn to_data(&self) -> PlayerData {
        PlayerData {
            current_level: self.current_level,
            sound_enabled: self.sound_enabled,
        }
    }
}

/// Directory the save file lives in. Injected as a resource so tests and
/// systems point at the same place.
#[derive(Resource, Debug, Clone)]
pub struct SaveDir(pub PathBuf);

impl Default for SaveDir {
    fn default() -> Self {
        Self(default_data_dir())
    }
}

fn default_data_dir() -> PathBuf {
    let root = if cfg!(windows) {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    } else {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })
            .unwrap_or_else(std::env::temp_dir)
    };
    root.join("slingshot-rs")
}

fn save_path(dir: &Path) -> PathBuf {
    dir.join("player_info.json")
}

pub fn save_to_file(dir: &Path, data: &PlayerData) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("failed to create save directory: {e}"))?;
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialize save data: {e}"))?;
    fs::write(save_path(dir), json).map_err(|e| format!("failed to write save file: {e}"))?;
    Ok(())
}

pub fn load_from_file(dir: &Path) -> Result<PlayerData, String> {
    let json = fs::read_to_string(save_path(dir))
        .map_err(|e| format!("failed to read save file: {e}"))?;
    serde_json::from_str(&json).map_err(|e| format!("failed to parse save data: {e}"))
}

/// Startup restore: only the sound flag is applied at boot. The saved
/// level is picked up when the player chooses Load Game.
pub fn restore_preferences(mut progress: ResMut<Progress>, dir: Res<SaveDir>) {
    match load_from_file(&dir.0) {
        Ok(data) => {
            progress.sound_enabled = data.sound_enabled;
            info!("restored sound preference: {}", data.sound_enabled);
        }
        Err(_) => info!("no save file, starting fresh"),
    }
}

/// Which level Load Game should enter. A saved level of 0 exists after
/// finishing the game and returning to the title screen; loading it would
/// strand the player there, so it starts a new game instead. Anything past
/// the last level is treated the same way.
pub fn resume_level(data: Option<&PlayerData>) -> usize {
    match data {
        Some(d) if d.current_level >= 1 && d.current_level <= levels::COUNT => d.current_level,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slingshot_test_{tag}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn player_data_roundtrip() {
        let data = PlayerData {
            current_level: 3,
            sound_enabled: false,
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: PlayerData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.current_level, 3);
        assert!(!back.sound_enabled);
    }

    #[test]
    fn save_and_load_file() {
        let dir = temp_dir("save_load");
        let data = PlayerData {
            current_level: 2,
            sound_enabled: true,
        };
        save_to_file(&dir, &data).unwrap();
        let loaded = load_from_file(&dir).unwrap();
        assert_eq!(loaded.current_level, 2);
        assert!(loaded.sound_enabled);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_errs() {
        let dir = temp_dir("missing");
        assert!(load_from_file(&dir).is_err());
    }

    #[test]
    fn load_corrupt_file_errs() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(save_path(&dir), "not json").unwrap();
        assert!(load_from_file(&dir).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn resume_no_save_starts_new_game() {
        assert_eq!(resume_level(None), 1);
    }

    #[test]
    fn resume_title_screen_save_starts_new_game() {
        let data = PlayerData {
            current_level: 0,
            sound_enabled: true,
        };
        assert_eq!(resume_level(Some(&data)), 1);
    }

    #[test]
    fn resume_out_of_range_save_starts_new_game() {
        let data = PlayerData {
            current_level: levels::COUNT + 7,
            sound_enabled: true,
        };
        assert_eq!(resume_level(Some(&data)), 1);
    }

    #[test]
    fn resume_mid_game_save_keeps_level() {
        let data = PlayerData {
            current_level: levels::COUNT,
            sound_enabled: false,
        };
        assert_eq!(resume_level(Some(&data)), levels::COUNT);
    }
}
