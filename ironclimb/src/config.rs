//! Tunable gameplay constants and window settings.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides:
//!
//! ```json
//! { "enemy": { "damage_taken_per_hit": 100.0 }, "popup": { "ttl_ms": 3000 } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::math::Vec2;

/// Window and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "IronClimb".into(),
            width: 1000,
            height: 550,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub spawn: Vec2,
    /// Horizontal walking speed, also used as ladder climbing speed (px/s).
    pub speed: f32,
    /// Vertical velocity applied when jumping (negative is up).
    pub jump_velocity: f32,
    pub gravity: f32,
    pub max_health: f32,
    /// Health removed by one unshielded enemy projectile.
    pub damage_taken_per_hit: f32,
    /// Loss when the player's y coordinate exceeds this value.
    pub fall_limit_y: f32,
    pub body_size: Vec2,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(100.0, 300.0),
            speed: 160.0,
            jump_velocity: -330.0,
            gravity: 1100.0,
            max_health: 100.0,
            damage_taken_per_hit: 25.0,
            fall_limit_y: 420.0,
            body_size: Vec2::new(36.0, 36.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub spawns: Vec<Vec2>,
    pub max_health: f32,
    /// Health removed by one player projectile.
    pub damage_taken_per_hit: f32,
    pub gravity: f32,
    pub fire_range: f32,
    pub fire_interval_ms: u64,
    /// Delay between the start of the shoot animation and the bullet leaving.
    pub muzzle_delay_ms: u64,
    pub body_size: Vec2,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            spawns: vec![
                Vec2::new(1050.0, 100.0),
                Vec2::new(1200.0, 100.0),
                Vec2::new(1350.0, 100.0),
                Vec2::new(1500.0, 100.0),
                Vec2::new(1809.0, 300.0),
                Vec2::new(2300.0, 300.0),
            ],
            max_health: 100.0,
            damage_taken_per_hit: 50.0,
            gravity: 1100.0,
            fire_range: 300.0,
            fire_interval_ms: 2000,
            muzzle_delay_ms: 200,
            body_size: Vec2::new(40.0, 64.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub player_speed: f32,
    pub enemy_speed: f32,
    pub gravity: f32,
    pub size: Vec2,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            player_speed: 800.0,
            enemy_speed: 300.0,
            gravity: 70.0,
            size: Vec2::new(10.0, 10.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupTuning {
    pub ttl_ms: u64,
    /// Delay before the "you lost" popup appears in the restarted scene.
    pub loss_delay_ms: u64,
}

impl Default for PopupTuning {
    fn default() -> Self {
        Self {
            ttl_ms: 5000,
            loss_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub zoom: f32,
    pub fade_ms: u64,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            zoom: 1.2,
            fade_ms: 500,
        }
    }
}

/// Full game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub projectile: ProjectileTuning,
    pub popup: PopupTuning,
    pub camera: CameraTuning,
    /// Tiled JSON level to load instead of the bundled one.
    pub level_path: Option<PathBuf>,
}

impl GameConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Load a configuration file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| GameError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn popup_ttl(&self) -> Duration {
        Duration::from_millis(self.popup.ttl_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.camera.fade_ms)
    }
}
