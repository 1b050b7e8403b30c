//! Small JSON files that plugins keep next to the main config
//! (cachet subscriptions, jira channel settings).

use std::path::Path;

use {
    serde::{Serialize, de::DeserializeOwned},
    tracing::debug,
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
};

/// Read and parse a JSON file, expanding `${ENV_VAR}` placeholders first.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let value = serde_json::from_str(&substitute_env(&raw))?;
    debug!(path = %path.display(), "loaded json file");
    Ok(value)
}

/// Serialize `value` as pretty JSON and write it to `path`, creating parent
/// directories when needed.
pub fn save_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| Error::write(path, e))?;
    debug!(path = %path.display(), "saved json file");
    Ok(())
}
