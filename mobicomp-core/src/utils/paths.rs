//! XDG base directory and application path resolution.
//!
//! Built on `directories-next`. Every function returns
//! [`CoreError::Config(ConfigError::DirectoryUnavailable)`] when the directory
//! cannot be determined, for example when no home directory is known.
//!
//! Application paths use the `org` / `Mobicomp` / `Mobicomp` project triple,
//! so on Linux the config directory is `~/.config/mobicomp`.

use std::path::PathBuf;
use directories_next::{BaseDirs, ProjectDirs};
use crate::error::{CoreError, ConfigError};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "Mobicomp";
const APPLICATION: &str = "Mobicomp";

/// Returns `$XDG_STATE_HOME` on Linux (falling back to `~/.local/state`), or
/// the local data directory elsewhere.
///
/// ```no_run
/// match mobicomp_core::utils::paths::get_state_base_dir() {
///     Ok(path) => println!("State base directory: {}", path.display()),
///     Err(e) => eprintln!("Error getting state base dir: {}", e),
/// }
/// ```
pub fn get_state_base_dir() -> Result<PathBuf, CoreError> {
    BaseDirs::new()
        .map(|dirs| {
            #[cfg(target_os = "linux")]
            {
                match std::env::var("XDG_STATE_HOME") {
                    Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
                    _ => dirs.home_dir().join(".local/state"),
                }
            }
            #[cfg(not(target_os = "linux"))]
            {
                dirs.data_local_dir().to_path_buf()
            }
        })
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "State Base".to_string()
        }))
}

/// Returns the application configuration directory, where `config.toml` lives.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "App Config".to_string()
        }))
}

/// Returns the application state directory, against which relative log file
/// paths are resolved.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    get_state_base_dir().map(|base_state| base_state.join(ORGANIZATION).join(APPLICATION))
}
