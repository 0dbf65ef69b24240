//! Matching between game display languages and wiki editions.

use serde::Deserialize;

/// Describes which game languages a wiki edition serves, and which
/// translation tables supply its article titles.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct LanguageMatcher {
    /// The code identifying the edition within its family, e.g. `de`.
    pub wiki_language: String,

    /// The translation table to consult for title overrides, regardless of
    /// the game language.
    #[serde(default)]
    pub lang_override: Option<String>,

    /// The translation table used when the edition is chosen for a player
    /// who is not playing in its language.
    pub default_language: String,

    /// Game display-language codes served by this edition, in priority order.
    #[serde(default)]
    pub game_languages: Vec<String>,
}

impl LanguageMatcher {
    /// Returns true if this edition is native to the given game language.
    ///
    /// Codes are compared after [`normalize`], so `en_US` and `en-us` match
    /// `en_us`. Unknown codes never match.
    pub fn match_language(&self, game_language: &str) -> bool {
        let game_language = normalize(game_language);
        self.game_languages
            .iter()
            .any(|lang| normalize(lang) == game_language)
    }

    /// The translation table forced for title overrides, if any.
    #[inline]
    pub fn lang_override(&self) -> Option<&str> {
        self.lang_override.as_deref()
    }

    /// The fallback translation table of the edition.
    #[inline]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}

/// Normalises a game-language code for comparison: ASCII lowercase with `-`
/// converted to `_`.
pub fn normalize(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}
