//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software
/// directory (the one containing `params/` and `sessions/`).
pub const SW_ROOT_ENV_VAR: &str = "CTRL_SW_ROOT";

/// Get the root directory of the software from the `CTRL_SW_ROOT`
/// environment variable.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
