pub mod types;

use std::io::ErrorKind;
use std::path::Path;

use tracing::info;

use crate::error::{DblError, Result};
use types::Config;

/// Reads a YAML config. A missing file means "all defaults"; any other read
/// failure or an invalid setting is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = match std::fs::read_to_string(path) {
        Ok(content) => serde_yml::from_str::<Config>(&content)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "No config file, using defaults");
            Config::default()
        }
        Err(e) => {
            return Err(DblError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };
    config.validate()?;
    Ok(config)
}
