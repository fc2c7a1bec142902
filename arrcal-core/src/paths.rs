use std::path::PathBuf;

use crate::error::{ArrcalError, Result};

#[derive(Debug, Clone)]
pub struct ArrcalPaths {
    pub config_dir: PathBuf,
}

impl ArrcalPaths {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ArrcalError::Config("cannot resolve XDG config dir".into()))?
            .join("arrcal");

        Ok(Self { config_dir })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }
}
