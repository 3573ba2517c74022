//! World configuration loader.
//!
//! Loads simulation parameters from YAML files, so hosts can tune gravity,
//! damping, and the contact solver without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! configs/
//! └── worlds/
//!     ├── earth.yaml
//!     ├── moon.yaml
//!     └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{constants, Real, Vec3};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("config not found: {0}")]
    NotFound(String),
}

/// Tunable parameters of a simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Gravitational field applied by a `Gravity` generator.
    pub gravity: Vec3,

    /// Default per-second velocity retention for new particles.
    pub damping: Real,

    /// Iteration budget for the contact resolver.
    pub contact_iterations: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -constants::GRAVITY, 0.0),
            damping: constants::DEFAULT_DAMPING,
            contact_iterations: 16,
        }
    }
}

/// Configuration loader with a configurable base directory.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader rooted at `base_path`, which should contain a
    /// `worlds/` subdirectory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Loads a world configuration by name (without the .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = ConfigLoader::new("configs");
    /// let world = loader.load_world("moon")?;
    /// ```
    pub fn load_world(&self, name: &str) -> Result<WorldConfig, ConfigError> {
        let path = self.base_path.join("worlds").join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let config: WorldConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Lists all available world configurations.
    pub fn list_worlds(&self) -> Result<Vec<String>, ConfigError> {
        let path = self.base_path.join("worlds");
        if !path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.ends_with(".yaml") {
                names.push(name.trim_end_matches(".yaml").to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
