//! Wiki editions and the families which group them.

use crate::{
    language::{self, LanguageMatcher},
    title::placeholders,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};

/// Errors that may occur when building a family from configuration data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The family record is not shaped like a family.
    #[error("{0}: malformed family: {1}")]
    Malformed(String, serde_json::Error),

    /// The designated main edition does not exist.
    #[error("{0}: main edition '{1}' does not exist")]
    MissingMain(String, String),

    /// No edition of the family could be loaded.
    #[error("{0}: family has no usable editions")]
    NoEditions(String),

    /// The family is not mapped to any namespace.
    #[error("{0}: family has no namespaces")]
    NoNamespaces(String),

    /// A URL template has the wrong number of substitution points.
    #[error("{field} of '{wiki_language}' must contain exactly one '%s', found {count}")]
    Placeholder {
        /// The name of the offending field.
        field: &'static str,
        /// The edition which owns the field.
        wiki_language: String,
        /// The number of placeholders found.
        count: usize,
    },
}

/// A single language edition of a wiki.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct WikiIndividual {
    /// The article URL, with one `%s` for the encoded page title.
    pub article_url: String,
    /// The MediaWiki API endpoint.
    #[serde(default)]
    pub mw_api_url: Option<String>,
    /// The title of the page which redirects to a random article.
    #[serde(default)]
    pub random_article: Option<String>,
    /// The title of a version article, with one `%s` for the version.
    #[serde(default)]
    pub version_article: Option<String>,
    /// The excerpt fetch URL, with one `%s` for the encoded page title.
    #[serde(default)]
    pub excerpt: Option<String>,
    /// The languages served by this edition.
    pub language: LanguageMatcher,
}

impl WikiIndividual {
    /// The language matcher of this edition.
    #[inline]
    pub fn language(&self) -> &LanguageMatcher {
        &self.language
    }

    /// The code identifying this edition within its family.
    #[inline]
    pub fn wiki_language(&self) -> &str {
        &self.language.wiki_language
    }

    /// Checks that every URL template has the required substitution points.
    fn validate(&self) -> Result<(), Error> {
        let templates = [
            ("article_url", Some(&self.article_url)),
            ("version_article", self.version_article.as_ref()),
            ("excerpt", self.excerpt.as_ref()),
        ];

        for (field, template) in templates {
            if let Some(template) = template {
                let count = placeholders(template);
                if count != 1 {
                    return Err(Error::Placeholder {
                        field,
                        wiki_language: self.wiki_language().to_string(),
                        count,
                    });
                }
            }
        }

        Ok(())
    }
}

/// The raw shape of a family record.
#[derive(Debug, Deserialize)]
struct FamilySource {
    /// Namespaces served by the family.
    namespaces: Vec<String>,
    /// The wiki-language code of the main edition. Defaults to the first
    /// edition.
    #[serde(default)]
    main: Option<String>,
    /// Edition records, kept raw so that one bad edition does not spoil the
    /// rest.
    wikis: Vec<serde_json::Value>,
}

/// A set of language editions of one logical wiki.
#[derive(Debug)]
pub struct WikiFamily {
    /// The name of the record the family was loaded from.
    name: String,
    /// Namespaces served by the family, in configuration order.
    namespaces: Vec<String>,
    /// Editions by wiki-language code, in configuration order.
    wikis: IndexMap<String, Arc<WikiIndividual>>,
    /// Editions by normalised game-language code. The first edition to claim
    /// a game language wins.
    by_game_language: HashMap<String, Arc<WikiIndividual>>,
    /// The main edition.
    main: Arc<WikiIndividual>,
}

impl WikiFamily {
    /// Builds a family from a configuration record.
    ///
    /// Malformed or duplicate editions are skipped and logged. The family
    /// itself is rejected if its main edition is unusable.
    pub fn from_value(name: &str, value: serde_json::Value) -> Result<Self, Error> {
        let source = serde_json::from_value::<FamilySource>(value)
            .map_err(|err| Error::Malformed(name.to_string(), err))?;

        if source.namespaces.is_empty() {
            return Err(Error::NoNamespaces(name.to_string()));
        }

        let mut wikis = IndexMap::<String, Arc<WikiIndividual>>::new();
        for (index, wiki) in source.wikis.into_iter().enumerate() {
            let wiki = match serde_json::from_value::<WikiIndividual>(wiki) {
                Ok(wiki) => wiki,
                Err(err) => {
                    log::warn!("{name}: skipping malformed edition #{index}: {err}");
                    continue;
                }
            };

            if let Err(err) = wiki.validate() {
                log::warn!("{name}: skipping edition #{index}: {err}");
                continue;
            }

            let code = wiki.wiki_language().to_string();
            if wikis.contains_key(&code) {
                log::warn!("{name}: skipping duplicate edition '{code}'");
                continue;
            }

            wikis.insert(code, Arc::new(wiki));
        }

        Self::from_parts(name, source.namespaces, source.main.as_deref(), wikis)
    }

    /// Assembles a family from already validated editions.
    fn from_parts(
        name: &str,
        namespaces: Vec<String>,
        main: Option<&str>,
        wikis: IndexMap<String, Arc<WikiIndividual>>,
    ) -> Result<Self, Error> {
        let main = match main {
            Some(code) => wikis
                .get(code)
                .ok_or_else(|| Error::MissingMain(name.to_string(), code.to_string()))?,
            None => wikis
                .first()
                .map(|(_, wiki)| wiki)
                .ok_or_else(|| Error::NoEditions(name.to_string()))?,
        };
        let main = Arc::clone(main);

        let mut by_game_language = HashMap::new();
        for wiki in wikis.values() {
            for game_language in &wiki.language.game_languages {
                by_game_language
                    .entry(language::normalize(game_language))
                    .or_insert_with(|| Arc::clone(wiki));
            }
        }

        Ok(Self {
            name: name.to_string(),
            namespaces,
            wikis,
            by_game_language,
            main,
        })
    }

    /// Finds the edition with the given wiki-language code.
    pub fn get_language_wiki_by_wiki_language(&self, code: &str) -> Option<&Arc<WikiIndividual>> {
        self.wikis.get(code)
    }

    /// Finds the edition serving the given game language.
    pub fn get_language_wiki_by_game_language(&self, code: &str) -> Option<&Arc<WikiIndividual>> {
        self.by_game_language.get(&language::normalize(code))
    }

    /// The main edition, used when nothing better matches.
    #[inline]
    pub fn get_main_language_wiki(&self) -> &Arc<WikiIndividual> {
        &self.main
    }

    /// Returns true if `code` is a wiki-language code of this family.
    #[inline]
    pub fn has_wiki_language(&self, code: &str) -> bool {
        self.wikis.contains_key(code)
    }

    /// The name of the record this family was loaded from.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespaces served by this family.
    #[inline]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// All editions, in configuration order.
    pub fn wikis(&self) -> impl Iterator<Item = &Arc<WikiIndividual>> {
        self.wikis.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn edition(code: &str, game_languages: &[&str]) -> serde_json::Value {
        json!({
            "article_url": format!("https://{code}.example.wiki/w/%s"),
            "language": {
                "wiki_language": code,
                "default_language": format!("{code}_{code}"),
                "game_languages": game_languages,
            }
        })
    }

    #[test]
    fn lookups() {
        let family = WikiFamily::from_value(
            "test",
            json!({
                "namespaces": ["test"],
                "main": "en",
                "wikis": [
                    edition("de", &["de_de", "de_at"]),
                    edition("en", &["en_us", "en_gb"]),
                    edition("at", &["de_at"]),
                ],
            }),
        )
        .unwrap();

        assert_eq!(family.get_main_language_wiki().wiki_language(), "en");
        assert_eq!(
            family
                .get_language_wiki_by_wiki_language("de")
                .map(|w| w.wiki_language()),
            Some("de")
        );
        assert!(family.get_language_wiki_by_wiki_language("de_de").is_none());
        assert_eq!(
            family
                .get_language_wiki_by_game_language("de_AT")
                .map(|w| w.wiki_language()),
            Some("de"),
            "first registered edition should win a shared game language"
        );
        assert!(family.get_language_wiki_by_game_language("fr_fr").is_none());
    }

    #[test]
    fn main_defaults_to_first() {
        let family = WikiFamily::from_value(
            "test",
            json!({ "namespaces": ["test"], "wikis": [edition("fr", &[]), edition("en", &[])] }),
        )
        .unwrap();
        assert_eq!(family.get_main_language_wiki().wiki_language(), "fr");
    }

    #[test]
    fn bad_editions_are_skipped() {
        let mut bad_url = edition("es", &["es_es"]);
        bad_url["article_url"] = json!("https://es.example.wiki/w/");
        let family = WikiFamily::from_value(
            "test",
            json!({
                "namespaces": ["test"],
                "wikis": [
                    edition("en", &["en_us"]),
                    { "article_url": "https://broken/%s" },
                    bad_url,
                    edition("en", &["en_gb"]),
                ],
            }),
        )
        .unwrap();

        assert_eq!(family.wikis().count(), 1);
        assert!(family.get_language_wiki_by_game_language("es_es").is_none());
        assert!(
            family.get_language_wiki_by_game_language("en_gb").is_none(),
            "duplicate edition should be ignored entirely"
        );
    }

    #[test]
    fn rejected_families() {
        assert!(matches!(
            WikiFamily::from_value(
                "a",
                json!({ "namespaces": ["a"], "main": "de", "wikis": [edition("en", &[])] })
            ),
            Err(Error::MissingMain(..))
        ));
        assert!(matches!(
            WikiFamily::from_value("b", json!({ "namespaces": ["b"], "wikis": [] })),
            Err(Error::NoEditions(..))
        ));
        assert!(matches!(
            WikiFamily::from_value("c", json!({ "namespaces": [], "wikis": [edition("en", &[])] })),
            Err(Error::NoNamespaces(..))
        ));
        assert!(matches!(
            WikiFamily::from_value("d", json!(["not", "a", "family"])),
            Err(Error::Malformed(..))
        ));
    }

    #[test]
    fn placeholder_validation() {
        let mut wiki = serde_json::from_value::<WikiIndividual>(edition("en", &[])).unwrap();
        assert!(wiki.validate().is_ok());
        wiki.version_article = Some("Java Edition".into());
        assert!(matches!(
            wiki.validate(),
            Err(Error::Placeholder { field: "version_article", count: 0, .. })
        ));
    }
}
