//! Translation tables used to produce localised article titles.

use crate::registry::FamilyRegistry;
use serde::Deserialize;
use std::collections::HashMap;

/// Errors that may occur when reading translations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The translation table is not shaped like a translation table.
    #[error("{0}: malformed translation table: {1}")]
    Malformed(String, serde_json::Error),

    /// The key has no translation in the language or its fallbacks.
    #[error("missing translation for '{key}' in '{language}'")]
    Missing {
        /// The requested language.
        language: String,
        /// The requested translation key.
        key: String,
    },

    /// There is no table for the language.
    #[error("no translation table for language '{0}'")]
    UnknownLanguage(String),
}

/// The accepted shapes of a translation table record.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableSource {
    /// A table with a fallback chain.
    Chained {
        /// Languages consulted, in order, when a key is missing.
        #[serde(default)]
        fallback: Vec<String>,
        /// Translation key to text.
        entries: HashMap<String, String>,
    },
    /// A bare table of translation key to text.
    Flat(HashMap<String, String>),
}

/// The translations of one language.
#[derive(Debug, Default)]
struct TranslationTable {
    /// Languages consulted, in order, when a key is missing.
    fallback: Vec<String>,
    /// Translation key to text.
    entries: HashMap<String, String>,
}

impl From<TableSource> for TranslationTable {
    fn from(source: TableSource) -> Self {
        match source {
            TableSource::Chained { fallback, entries } => Self { fallback, entries },
            TableSource::Flat(entries) => Self {
                fallback: Vec::new(),
                entries,
            },
        }
    }
}

/// Language code to translation table.
///
/// Lookups only walk a table’s own fallback chain. Falling back to an
/// edition’s default language is the caller’s decision.
#[derive(Debug, Default)]
pub struct TranslationManager {
    /// Tables by language code.
    tables: HashMap<String, TranslationTable>,
}

impl TranslationManager {
    /// Builds translation tables from records keyed by language code.
    ///
    /// Malformed records are logged and skipped. A later record for the same
    /// language is merged over the earlier one.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, serde_json::Value)>,
        S: AsRef<str>,
    {
        let mut tables = HashMap::<String, TranslationTable>::new();
        for (language, value) in records {
            let language = language.as_ref();
            let source = match serde_json::from_value::<TableSource>(value) {
                Ok(source) => source,
                Err(err) => {
                    log::warn!("{}", Error::Malformed(language.to_string(), err));
                    continue;
                }
            };

            let TranslationTable { fallback, entries } = source.into();
            let table = tables.entry(language.to_string()).or_default();
            table.entries.extend(entries);
            for language in fallback {
                if !table.fallback.contains(&language) {
                    table.fallback.push(language);
                }
            }
        }
        Self { tables }
    }

    /// Gets the translation of `key` in `language`, consulting the table’s
    /// fallback chain if the key is missing.
    pub fn get<'a>(&'a self, language: &'a str, key: &str) -> Result<&'a str, Error> {
        if !self.tables.contains_key(language) {
            return Err(Error::UnknownLanguage(language.to_string()));
        }

        let mut visited = Vec::<&str>::new();
        let mut pending = vec![language];
        while let Some(current) = pending.pop() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);

            if let Some(table) = self.tables.get(current) {
                if let Some(text) = table.entries.get(key) {
                    return Ok(text.as_str());
                }
                pending.extend(table.fallback.iter().rev().map(String::as_str));
            }
        }

        Err(Error::Missing {
            language: language.to_string(),
            key: key.to_string(),
        })
    }

    /// Returns true if `key` has a translation in `language`, even if that
    /// translation is the empty string.
    #[inline]
    pub fn has_translation(&self, language: &str, key: &str) -> bool {
        self.get(language, key).is_ok()
    }

    /// Returns true if there is a table for `language`.
    #[inline]
    pub fn has_language(&self, language: &str) -> bool {
        self.tables.contains_key(language)
    }

    /// The number of loaded languages.
    #[inline]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no language loaded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Reports editions whose default language has no table and returns how
    /// many there are.
    pub fn check_default_languages(&self, registry: &FamilyRegistry) -> usize {
        let mut missing = 0;
        for family in registry.families() {
            for wiki in family.wikis() {
                let language = wiki.language().default_language();
                if !self.has_language(language) {
                    log::warn!(
                        "{}: edition '{}' has default language '{language}' with no translations",
                        family.name(),
                        wiki.wiki_language()
                    );
                    missing += 1;
                }
            }
        }
        missing
    }
}
