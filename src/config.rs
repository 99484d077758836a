//! Game settings loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::tiles::tile_total;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

/// Settings of a single round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub player_count: usize,
    /// Tiles each player holds. 1 is the classic draw-and-place game.
    pub hand_size: usize,
    /// Seed for the stack shuffle.
    pub seed: u64,
    /// Only use the first `tile_limit` tiles of the shuffled stack.
    pub tile_limit: Option<usize>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_count: 2,
            hand_size: 1,
            seed: 0,
            tile_limit: None,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ConfigError::Invalid {
                field: "player_count",
                reason: format!(
                    "{} is outside {MIN_PLAYERS}..={MAX_PLAYERS}",
                    self.player_count
                ),
            });
        }
        if self.hand_size == 0 {
            return Err(ConfigError::Invalid {
                field: "hand_size",
                reason: "a hand must hold at least one tile".into(),
            });
        }
        let stack = tile_total() as usize - 1;
        let dealt = self.hand_size.checked_mul(self.player_count);
        if dealt.map_or(true, |dealt| dealt > stack) {
            return Err(ConfigError::Invalid {
                field: "hand_size",
                reason: format!(
                    "{} players x {} tiles exceeds the {stack} tiles in the stack",
                    self.player_count, self.hand_size
                ),
            });
        }
        Ok(())
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Clone, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    game: GameSettings,
}

/// Load settings from a TOML file at the given path. Settings live under a
/// `[game]` table; missing keys take their defaults.
pub fn load_settings(path: &Path) -> Result<GameSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SettingsFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    file.game.validate()?;
    Ok(file.game)
}

/// Try to load settings from well-known paths, returning the defaults if none found.
pub fn load_default_settings() -> GameSettings {
    let candidates = [
        "settings.toml",
        "../settings.toml",
        "/etc/meeple/settings.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), players = settings.player_count, "loaded game settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load game settings");
                }
            }
        }
    }
    tracing::info!("no settings.toml found, using built-in defaults");
    GameSettings::default()
}
