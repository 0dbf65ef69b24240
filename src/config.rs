//! User settings.
//!
//! Settings are plain data. Where they come from (a file, command-line
//! arguments, the host’s own options screen) is up to the caller.

use serde::Deserialize;
use std::{convert::Infallible, path::Path, str::FromStr};

/// Which wiki edition the user wants.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(from = "String")]
pub enum LanguagePreference {
    /// Follow the game’s display language.
    #[default]
    Auto,
    /// Always use the edition with this wiki-language code.
    Wiki(String),
}

impl LanguagePreference {
    /// The spelling of [`Self::Auto`] in configuration data.
    pub const AUTO: &'static str = "auto";
}

impl From<String> for LanguagePreference {
    fn from(value: String) -> Self {
        if value == Self::AUTO {
            Self::Auto
        } else {
            Self::Wiki(value)
        }
    }
}

impl FromStr for LanguagePreference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.to_string().into())
    }
}

impl core::fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Auto => f.write_str(Self::AUTO),
            Self::Wiki(code) => f.write_str(code),
        }
    }
}

/// Errors that may occur when reading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read.
    #[error("{1}: I/O error: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    /// The file is not valid settings JSON.
    #[error("{1}: invalid settings: {0}")]
    Json(serde_json::Error, std::path::PathBuf),
}

/// User settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// The preferred wiki edition.
    pub language: LanguagePreference,
    /// If true, the host is asked to confirm before a page opens.
    pub requires_confirmation: bool,
    /// The memory limit of the page excerpt cache, in bytes. Without a
    /// limit, entries live until the next reload.
    pub excerpt_cache_bytes: Option<usize>,
    /// The maximum number of cached page name suggestion lists. Without a
    /// limit, entries live until the next reload.
    pub suggestion_cache_entries: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: LanguagePreference::Auto,
            requires_confirmation: true,
            excerpt_cache_bytes: None,
            suggestion_cache_entries: None,
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields take their default
    /// values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| Error::Io(err, path.to_path_buf()))?;
        serde_json::from_slice(&data).map_err(|err| Error::Json(err, path.to_path_buf()))
    }
}
