//! Engine settings read from a YAML file
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::min;
use std::fmt;
use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::info;
use serde::{Deserialize, Serialize};
use crate::chess::MAX_DEPTH;
use crate::engine::hash::HashTable;
use crate::protocol::SearchLimits;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Settings which can be given in the configuration file. Every field is optional.
///
/// ```
/// let config: cep::config::Config = serde_yaml::from_str("hash_size_mb: 64").unwrap();
/// assert_eq!(config.hash_size_mb, 64);
/// assert_eq!(config.max_depth, 79);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size of the transposition table in megabytes
    pub hash_size_mb: usize,
    /// Time to think about each move in milliseconds, unless the client says otherwise
    pub move_time_ms: u64,
    /// Deepest iteration the engine will search
    pub max_depth: usize,
    /// Whether thinking output is shown. When not given, the console shows it and xboard waits
    /// for `post`.
    pub post_thinking: Option<bool>,
}

impl Config {
    /// Reads the settings from `path`, or from the default location if `path` is `None`. A
    /// missing file at the default location is not an error; the defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Config, Error> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Config::default()),
            },
        };

        match read_to_string(&path) {
            Ok(s) => {
                info!("loading configuration from {}", path.display());
                Self::parse(&s).map_err(|err| err.in_file(&path))
            },
            Err(ref err) if !required && err.kind() == io::ErrorKind::NotFound => {
                info!("no configuration at {}, using defaults", path.display());
                Ok(Config::default())
            },
            Err(err) => Err(Error::from(err).in_file(&path)),
        }
    }

    /// Parses settings from a YAML document
    pub fn parse(s: &str) -> Result<Config, Error> {
        if s.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(s)?)
    }

    /// Returns `~/.cep/config.yaml`, if there is a home directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cep").join("config.yaml"))
    }

    /// Returns the transposition table size in bytes, capped at `HashTable::MAX_SIZE_MB`
    pub fn hash_size(&self) -> usize {
        min(self.hash_size_mb, HashTable::MAX_SIZE_MB) << 20
    }

    /// Returns the search limits to use when the client hasn't set any
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            depth: self.max_depth.min(MAX_DEPTH - 1).max(1),
            time: Some(Duration::from_millis(self.move_time_ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hash_size_mb: 32,
            move_time_ms: 12_000,
            max_depth: MAX_DEPTH - 1,
            post_thinking: None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An error reading the configuration
#[derive(Debug)]
pub enum Error {
    /// The file couldn't be read
    Io(io::Error),
    /// The file isn't valid YAML for the settings
    Yaml(serde_yaml::Error),
    /// Another error, with the file it occurred in
    InFile(PathBuf, Box<Error>),
}

impl Error {
    fn in_file(self, path: &Path) -> Error {
        Error::InFile(path.to_path_buf(), Box::new(self))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => fmt::Display::fmt(err, f),
            Error::Yaml(err) => fmt::Display::fmt(err, f),
            Error::InFile(path, err) => write!(f, "{}: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error { }

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hash_size(), 32 << 20);
        assert_eq!(config.limits(), SearchLimits::default());
    }

    #[test]
    fn partial_settings() {
        let config = Config::parse("move_time_ms: 500\npost_thinking: false\n").unwrap();
        assert_eq!(config.move_time_ms, 500);
        assert_eq!(config.post_thinking, Some(false));
        assert_eq!(config.hash_size_mb, 32);
        assert_eq!(config.limits().time, Some(Duration::from_millis(500)));

        let config = Config::parse("max_depth: 500").unwrap();
        assert_eq!(config.limits().depth, MAX_DEPTH - 1);

        let config = Config::parse("hash_size_mb: 18446744073709551615").unwrap();
        assert_eq!(config.hash_size(), HashTable::MAX_SIZE_MB << 20);
    }

    #[test]
    fn bad_settings() {
        assert!(Config::parse("hash_size_mb: lots").is_err());
        assert!(Config::parse("- 1\n- 2").is_err());
    }

    #[test]
    fn missing_files() {
        let path = Path::new("/nonexistent/cep/config.yaml");
        match Config::load(Some(path)) {
            Err(Error::InFile(p, err)) => {
                assert_eq!(p, path);
                assert!(matches!(*err, Error::Io(_)));
            },
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
