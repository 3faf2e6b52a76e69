//! Host platform (linux for example) utility functions

use std::{env, path::PathBuf};

/// The environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "SWARM_SW_ROOT";

/// Get the root directory of the software, as set by the `SWARM_SW_ROOT`
/// environment variable.
pub fn get_swarm_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
