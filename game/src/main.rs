use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use ironclimb::{Engine, GameConfig, GameResources, MenuScene, SceneManager};

/// Configuration read when no path is given on the command line.
const DEFAULT_CONFIG: &str = "ironclimb.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from))?;
    let window = config.window.clone();
    let resources = Rc::new(GameResources::load(config).context("failed to load the level")?);

    let scenes = SceneManager::new(Box::new(MenuScene::new(resources)));
    Engine::new(window).run(scenes)
}

/// An explicit path must exist; the default file is optional.
fn load_config(explicit: Option<PathBuf>) -> Result<GameConfig> {
    if let Some(path) = explicit {
        log::info!("loading configuration from {}", path.display());
        return GameConfig::load(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()));
    }

    let path = PathBuf::from(DEFAULT_CONFIG);
    if !path.exists() {
        log::info!("no {DEFAULT_CONFIG} found, using built-in defaults");
        return Ok(GameConfig::default());
    }
    match GameConfig::load(&path) {
        Ok(config) => {
            log::info!("loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(err) => {
            log::warn!("ignoring {}: {err}", path.display());
            Ok(GameConfig::default())
        }
    }
}
