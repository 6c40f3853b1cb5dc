//! Loading machine files
//!
//! A machine file is a single TOML document holding the `[settings]` table,
//! any number of `[[interaction]]` tables and any number of `[[sequence]]`
//! tables. Reading and parsing failures are hard errors; everything found
//! while resolving the parsed file is a soft [`ConfigIssue`](crate::ConfigIssue).

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use cadence_types::MachineSettings;

use crate::actions::ActionRegistry;
use crate::definitions::MachineConfig;
use crate::library::Library;

/// Errors that can occur while reading a machine file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parse a machine file from a string
pub fn from_str(contents: &str) -> Result<MachineConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Load a single machine file
pub fn load_file(path: &Path) -> Result<MachineConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

impl MachineConfig {
    /// Build every action and resolve the library.
    /// Issues are logged and stay available through [`Library::issues`].
    pub fn build(self, registry: &ActionRegistry) -> (MachineSettings, Library) {
        let library = Library::from_definitions(self.interactions, self.sequences, registry);
        (self.settings, library)
    }
}
