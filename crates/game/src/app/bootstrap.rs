use engine::{
    resolve_app_paths, AppPaths, Bootstrap, KeyBindingError, KeyBindings, LoopConfig, MapError,
    OverworldScreen, Screen, ScreenError, Session, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_config, ConfigError, GameConfig};
use super::demo_world::{self, DEFAULT_PLAYER_NAME};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) bootstrap: Bootstrap,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid key bindings: {0}")]
    KeyBindings(#[from] KeyBindingError),
    #[error("failed to build the demo world: {0}")]
    World(#[from] MapError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Adventure Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        config = %paths.config_file.display(),
        "paths_resolved"
    );
    let game = load_config(&paths.config_file)?;
    let config = loop_config(&game, &paths)?;

    // Fail before opening a window if the world cannot be built.
    let player_name = game
        .player_name
        .clone()
        .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());
    demo_world::build_session(&player_name)?;

    let overworld = game.overworld;
    info!(
        debug_mode = overworld.start_in_debug_mode,
        press_dedup = ?overworld.press_dedup,
        "overworld_config"
    );
    let bootstrap: Bootstrap = Box::new(
        move || -> Result<(Session, Box<dyn Screen>), ScreenError> {
            let session = demo_world::build_session(&player_name)?;
            let root: Box<dyn Screen> = Box::new(OverworldScreen::new(overworld.clone()));
            Ok((session, root))
        },
    );

    Ok(AppWiring { config, bootstrap })
}

fn loop_config(game: &GameConfig, paths: &AppPaths) -> Result<LoopConfig, KeyBindingError> {
    let mut config = LoopConfig {
        screenshot_dir: Some(paths.cache_dir.clone()),
        key_bindings: KeyBindings::default().with_overrides(&game.keys)?,
        ..LoopConfig::default()
    };
    let window = &game.window;
    if let Some(title) = &window.title {
        config.window_title = title.clone();
    }
    if let Some(width) = window.width {
        config.window_width = width;
    }
    if let Some(height) = window.height {
        config.window_height = height;
    }
    if let Some(tps) = window.target_tps {
        config.target_tps = tps.max(1);
    }
    config.max_render_fps = window.max_render_fps.or(config.max_render_fps);
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use engine::InputAction;

    use super::*;
    use crate::app::config::WindowConfig;

    fn paths() -> AppPaths {
        AppPaths {
            root: PathBuf::from("/adventure"),
            config_file: PathBuf::from("/adventure/config/adventure.json"),
            cache_dir: PathBuf::from("/adventure/cache"),
        }
    }

    #[test]
    fn window_overrides_apply_on_top_of_defaults() {
        let game = GameConfig {
            window: WindowConfig {
                title: Some("Demo".to_string()),
                height: Some(480),
                target_tps: Some(0),
                ..WindowConfig::default()
            },
            ..GameConfig::default()
        };

        let config = loop_config(&game, &paths()).expect("config");

        assert_eq!(config.window_title, "Demo");
        assert_eq!(config.window_width, LoopConfig::default().window_width);
        assert_eq!(config.window_height, 480);
        assert_eq!(config.target_tps, 1);
        assert_eq!(
            config.screenshot_dir,
            Some(PathBuf::from("/adventure/cache"))
        );
    }

    #[test]
    fn bad_key_name_is_rejected() {
        let game = GameConfig {
            keys: HashMap::from([(InputAction::Menu, vec!["NotAKey".to_string()])]),
            ..GameConfig::default()
        };
        assert!(matches!(
            loop_config(&game, &paths()),
            Err(KeyBindingError::UnknownKey { .. })
        ));
    }
}
