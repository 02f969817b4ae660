use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod dispatch;
pub mod screens;
pub mod world;

#[cfg(test)]
mod test_support;

pub use app::{
    run_app, AppError, Bootstrap, FrameBuffer, InputAction, InputEvent, InputSnapshot,
    KeyBindingError, KeyBindings, LoopConfig, LoopMetricsSnapshot, RenderTarget, Screen,
    ScreenError, ScreenKind, ScreenMachine, ScreenStatus, Texture,
};
pub use dispatch::{EventDispatcher, PressDedupPolicy};
pub use screens::{
    AnimationScreen, BattleScreen, MenuScreen, OverworldConfig, OverworldScreen, WooshDirection,
};
pub use world::{
    DeclaredBattle, EventContext, Facing, GameMap, Jukebox, MapError, MapEvent, MapRegistry,
    Player, Position, Session, SideMask, Teleport, TilePos, Tilemap, TracingJukebox, TriggerKind,
};

pub const ROOT_ENV_VAR: &str = "ADVENTURE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub cache_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create cache directory at {path}: {source}")]
    CreateCacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "ADVENTURE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and crates/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and crates/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/adventure\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    let paths = app_paths_under(root);

    fs::create_dir_all(&paths.cache_dir).map_err(|source| StartupError::CreateCacheDir {
        path: paths.cache_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn app_paths_under(root: PathBuf) -> AppPaths {
    AppPaths {
        config_file: root.join("config").join("adventure.json"),
        cache_dir: root.join("cache"),
        root,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("crates").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml_and_crates() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
        assert!(!is_repo_marker(&cwd.join("src")));
    }

    #[test]
    fn workspace_root_is_a_marker() {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let root = manifest_dir
            .ancestors()
            .find(|candidate| is_repo_marker(candidate));
        assert!(root.is_some());
    }

    #[test]
    fn paths_hang_off_the_root() {
        let paths = app_paths_under(PathBuf::from("/games/adventure"));
        assert_eq!(
            paths.config_file,
            PathBuf::from("/games/adventure/config/adventure.json")
        );
        assert_eq!(paths.cache_dir, PathBuf::from("/games/adventure/cache"));
    }
}
