use std::path::Path;

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::tilemap::TileMap;

/// Level shipped with the crate.
pub const DEFAULT_LEVEL: &str = include_str!("../assets/map/map.tmj");

/// Immutable data shared by every scene.
///
/// Gameplay scenes clone `level` on creation, so tiles collected in one run
/// are back after a restart.
#[derive(Clone, Debug)]
pub struct GameResources {
    pub config: GameConfig,
    pub level: TileMap,
}

impl GameResources {
    /// Load the level named by the configuration, or the bundled one.
    pub fn load(config: GameConfig) -> GameResult<Self> {
        let level = match &config.level_path {
            Some(path) => load_level(path)?,
            None => TileMap::from_json(DEFAULT_LEVEL)?,
        };
        log::info!(
            "level loaded: {}x{} tiles, {} layers",
            level.width(),
            level.height(),
            level.layers().count()
        );
        Ok(Self { config, level })
    }

    pub fn with_defaults() -> GameResult<Self> {
        Self::load(GameConfig::default())
    }
}

fn load_level(path: &Path) -> GameResult<TileMap> {
    let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    TileMap::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_level_has_every_gameplay_layer() {
        let resources = GameResources::with_defaults().unwrap();
        for name in ["ground", "escadas", "objetos", "arma", "escudo", "win"] {
            assert!(resources.level.layer_id(name).is_ok(), "missing {name}");
        }
        assert_eq!(resources.level.width_in_pixels(), 2560.0);
        assert_eq!(resources.level.height_in_pixels(), 480.0);
    }

    #[test]
    fn missing_level_file_is_reported() {
        let config = GameConfig {
            level_path: Some("no/such/level.tmj".into()),
            ..GameConfig::default()
        };
        assert!(matches!(
            GameResources::load(config),
            Err(GameError::Io { .. })
        ));
    }
}
