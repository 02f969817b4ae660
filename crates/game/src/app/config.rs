use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{InputAction, OverworldConfig};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const DEBUG_ENV_VAR: &str = "ADVENTURE_DEBUG";

/// Optional settings file. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) overworld: OverworldConfig,
    /// Replacement key names per action; actions not listed keep the
    /// default layout.
    pub(crate) keys: HashMap<InputAction, Vec<String>>,
    pub(crate) player_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: Option<String>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) target_tps: Option<u32>,
    pub(crate) max_render_fps: Option<u32>,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path} at {at}: {source}")]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads the config file if it exists, then applies environment overrides.
pub(crate) fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let mut config = match fs::read_to_string(path) {
        Ok(raw) => {
            let config = parse_config(&raw, path)?;
            info!(path = %path.display(), "config_loaded");
            config
        }
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_file_missing_using_defaults");
            GameConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    apply_debug_override(&mut config, std::env::var(DEBUG_ENV_VAR).ok().as_deref());
    Ok(config)
}

fn parse_config(raw: &str, path: &Path) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            at: if at.is_empty() || at == "." {
                "root".to_string()
            } else {
                at
            },
            source: error.into_inner(),
        }
    })
}

/// `ADVENTURE_DEBUG=1` (or `true`) forces debug mode on at startup.
fn apply_debug_override(config: &mut GameConfig, value: Option<&str>) {
    if matches!(value.map(str::trim), Some("1" | "true")) {
        config.overworld.start_in_debug_mode = true;
    }
}
