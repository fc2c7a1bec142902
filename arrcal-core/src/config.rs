use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ArrcalError, Result};
use crate::models::{Instance, InstanceKind};
use crate::paths::ArrcalPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            instances: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(paths: &ArrcalPaths) -> Result<Self> {
        let path = paths.config_file();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ArrcalError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(paths: &ArrcalPaths) -> Self {
        Self::load(paths).unwrap_or_default()
    }

    pub fn save(&self, paths: &ArrcalPaths) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ArrcalError::Config(format!("failed to serialize config: {e}")))?;
        let path = paths.config_file();
        std::fs::write(&path, content)
            .map_err(|e| ArrcalError::Config(format!("failed to write {}: {e}", path.display())))
    }

    /// Instance names are identifiers; duplicates would make merge
    /// attribution and lookups ambiguous.
    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for instance in &self.instances {
            if !seen.insert(instance.name.as_str()) {
                return Err(ArrcalError::Config(format!(
                    "duplicate instance name: {}",
                    instance.name
                )));
            }
        }
        Ok(())
    }

    pub fn instance(&self, name: &str) -> Option<&InstanceConfig> {
        self.instances.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Days fetched on either side of today, and per forward extension.
    pub days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            days: crate::calendar::DEFAULT_SPAN_DAYS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub kind: InstanceKind,
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl InstanceConfig {
    pub fn to_instance(&self) -> Result<Instance> {
        let url = Url::parse(&self.url).map_err(|e| {
            ArrcalError::Config(format!("instance {}: invalid url {}: {e}", self.name, self.url))
        })?;
        Ok(Instance {
            name: self.name.clone(),
            kind: self.kind,
            url,
            api_key: self.api_key.clone(),
        })
    }
}
