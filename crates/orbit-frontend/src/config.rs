//! Page configuration: which viewers the page stacks, top to bottom

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use orbit_core::{ConfigError, ViewerConfig};

/// Environment variable naming a page configuration file
pub const CONFIG_ENV: &str = "ORBIT_CONFIG";

/// Viewer sections of the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub viewers: Vec<ViewerConfig>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewers: vec![ViewerConfig::toucan(), ViewerConfig::tv()],
        }
    }
}

impl PageConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Write a configuration file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

/// Pick the configuration file: the CLI argument wins over the environment
pub fn config_path(arg: Option<String>, env: Option<String>) -> Option<PathBuf> {
    arg.or(env)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Resolve the page configuration and the directory asset paths are
/// relative to.
///
/// Without a file the built-in page is used and assets resolve against the
/// working directory. A file that fails to load is logged and replaced by the
/// built-in page.
pub fn resolve_page(path: Option<PathBuf>) -> (PageConfig, Option<PathBuf>) {
    let Some(path) = path else {
        tracing::info!("No page configuration given, using built-in viewers");
        return (PageConfig::default(), None);
    };

    match PageConfig::load(&path) {
        Ok(page) => {
            tracing::info!(
                "Loaded page configuration {} ({} viewer(s))",
                path.display(),
                page.viewers.len()
            );
            let root = path.parent().map(Path::to_path_buf);
            (page, root)
        }
        Err(e) => {
            tracing::error!(
                "Failed to load page configuration {}: {}; using built-in viewers",
                path.display(),
                e
            );
            (PageConfig::default(), None)
        }
    }
}
