//! Wiki pages and their resolution from in-game references.

use crate::{
    DEFAULT_NAMESPACE, FALLBACK_GAME_LANGUAGE,
    config::{LanguagePreference, Settings},
    family::{WikiFamily, WikiIndividual},
    link::LinkSyntax,
    state::Snapshot,
    title::{encode_title, substitute},
};
use core::{fmt, str::FromStr};
use http::Uri;
use std::sync::Arc;

/// Page errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An identifier string was not `namespace:path`.
    #[error("invalid identifier '{0}'")]
    Identifier(String),

    /// A URL template did not have exactly one `%s`.
    #[error("URL template '{0}' does not have exactly one '%s'")]
    Template(String),

    /// The substituted URL was not a valid URI.
    #[error("failed to create URI '{0}': {1}")]
    Uri(String, #[source] http::uri::InvalidUri),
}

/// A namespaced reference to a game object.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identifier {
    /// The namespace, used verbatim as the registry key.
    namespace: String,
    /// The path within the namespace.
    path: String,
}

impl Identifier {
    /// Creates an identifier from its parts.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Parses `namespace:path`, or a bare `path` in the default namespace.
    pub fn parse(id: &str) -> Result<Self, Error> {
        let (namespace, path) = id.split_once(':').unwrap_or((DEFAULT_NAMESPACE, id));
        let valid = |part: &str, extra: &[char]| {
            !part.is_empty()
                && part.chars().all(|c| {
                    c.is_ascii_lowercase()
                        || c.is_ascii_digit()
                        || matches!(c, '_' | '-' | '.')
                        || extra.contains(&c)
                })
        };

        if valid(namespace, &[]) && valid(path, &['/']) {
            Ok(Self::new(namespace, path))
        } else {
            Err(Error::Identifier(id.to_string()))
        }
    }

    /// The namespace.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The game translation key of this identifier for an object `kind`, e.g.
    /// `block.minecraft.stone`.
    pub fn translation_key(&self, kind: &str) -> String {
        format!("{kind}.{}.{}", self.namespace, self.path.replace('/', "."))
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Something the player is looking at or referring to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Target {
    /// The object identifier.
    pub identifier: Identifier,
    /// The translation key of the object’s display name.
    pub translation_key: String,
}

impl Target {
    /// Creates a target.
    pub fn new(identifier: Identifier, translation_key: impl Into<String>) -> Self {
        Self {
            identifier,
            translation_key: translation_key.into(),
        }
    }

    /// Creates a target for an object of the given `kind` whose translation
    /// key follows the game’s convention.
    pub fn of_kind(kind: &str, identifier: Identifier) -> Self {
        let translation_key = identifier.translation_key(kind);
        Self {
            identifier,
            translation_key,
        }
    }
}

/// The host’s localisation: the text the game UI shows for a translation
/// key in the active game language.
pub trait Localizer {
    /// Translates `key`. Unknown keys translate to themselves.
    fn translate(&self, key: &str) -> String;
}

impl<F: Fn(&str) -> String> Localizer for F {
    #[inline]
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// The host’s way of showing an article.
pub trait Browser {
    /// Asks the player to confirm opening `uri` for `page`.
    fn confirm(&mut self, uri: &Uri, page: &WikiPage);

    /// Opens `uri` immediately.
    fn open(&mut self, uri: &Uri);
}

/// A resolved article: a localised title on one wiki edition.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct WikiPage {
    /// The un-encoded article title.
    pub page_name: String,
    /// The edition serving the article.
    pub wiki: Arc<WikiIndividual>,
}

impl WikiPage {
    /// Creates a page.
    pub fn new(page_name: impl Into<String>, wiki: Arc<WikiIndividual>) -> Self {
        Self {
            page_name: page_name.into(),
            wiki,
        }
    }

    /// Builds the article URI.
    pub fn uri(&self) -> Result<Uri, Error> {
        build_uri(&self.wiki.article_url, &self.page_name)
    }

    /// Builds the article URI, logging and discarding any failure.
    pub fn get_uri(&self) -> Option<Uri> {
        self.uri()
            .inspect_err(|err| log::error!("Failed to create URI for wiki page: {err}"))
            .ok()
    }

    /// Builds the URI used to fetch the article’s excerpt, if the edition
    /// supports excerpts.
    pub fn excerpt_uri(&self) -> Option<Uri> {
        let template = self.wiki.excerpt.as_deref()?;
        build_uri(template, &self.page_name)
            .inspect_err(|err| log::error!("Failed to create excerpt URI for wiki page: {err}"))
            .ok()
    }

    /// Hands the article to the host, asking for confirmation first when
    /// the settings require it. Returns false if no URI could be built.
    pub fn open(
        &self,
        settings: &Settings,
        skip_confirmation: bool,
        browser: &mut impl Browser,
    ) -> bool {
        let Some(uri) = self.get_uri() else {
            return false;
        };

        if settings.requires_confirmation && !skip_confirmation {
            log::debug!("Confirming {uri}");
            browser.confirm(&uri, self);
        } else {
            log::debug!("Opening {uri}");
            browser.open(&uri);
        }
        true
    }
}

/// Substitutes an encoded title into a URL template.
fn build_uri(template: &str, title: &str) -> Result<Uri, Error> {
    let url = substitute(template, &encode_title(title))
        .ok_or_else(|| Error::Template(template.to_string()))?;
    url.parse::<Uri>().map_err(|err| Error::Uri(url, err))
}

/// Resolves references into pages against one configuration generation.
pub struct Resolver<'a, L: ?Sized> {
    /// The configuration generation.
    snapshot: &'a Snapshot,
    /// The user’s wiki language preference.
    language: &'a LanguagePreference,
    /// The client’s active game language.
    game_language: &'a str,
    /// The host’s localisation.
    localizer: &'a L,
}

impl<'a, L: Localizer + ?Sized> Resolver<'a, L> {
    /// Creates a resolver.
    pub fn new(
        snapshot: &'a Snapshot,
        language: &'a LanguagePreference,
        game_language: &'a str,
        localizer: &'a L,
    ) -> Self {
        Self {
            snapshot,
            language,
            game_language,
            localizer,
        }
    }

    /// Resolves the article for a target.
    #[inline]
    pub fn from_target(&self, target: &Target) -> Option<WikiPage> {
        self.from_identifier(&target.identifier, &target.translation_key)
    }

    /// Resolves the article for an identifier whose display name has the
    /// given translation key. Returns `None` only if the namespace has no
    /// family.
    pub fn from_identifier(
        &self,
        identifier: &Identifier,
        translation_key: &str,
    ) -> Option<WikiPage> {
        let family = self
            .snapshot
            .registry()
            .get_family_by_namespace(identifier.namespace())?;

        match self.language {
            LanguagePreference::Auto => {
                if let Some(wiki) = family.get_language_wiki_by_game_language(self.game_language) {
                    log::trace!(
                        "{identifier}: '{}' edition by game language",
                        wiki.wiki_language()
                    );
                    return Some(self.native_page(wiki, translation_key));
                }
            }
            LanguagePreference::Wiki(code) => {
                if let Some(wiki) = family.get_language_wiki_by_wiki_language(code) {
                    return Some(if wiki.language().match_language(self.game_language) {
                        log::trace!("{identifier}: '{code}' edition matches game language");
                        self.native_page(wiki, translation_key)
                    } else {
                        log::trace!("{identifier}: '{code}' edition is cross-language");
                        let page_name = self
                            .override_text(wiki, translation_key)
                            .unwrap_or_else(|| self.default_text(wiki, translation_key));
                        WikiPage::new(page_name, Arc::clone(wiki))
                    });
                }
            }
        }

        let wiki = family.get_main_language_wiki();
        log::trace!("{identifier}: falling back to main edition '{}'", wiki.wiki_language());
        Some(WikiPage::new(self.default_text(wiki, translation_key), Arc::clone(wiki)))
    }

    /// Resolves the body of a wikitext link.
    pub fn from_wikitext_link(&self, link: &str) -> Option<WikiPage> {
        let registry = self.snapshot.registry();
        let syntax = LinkSyntax::classify(link, registry);
        log::trace!("[[{link}]]: {syntax:?}");

        let wiki = match syntax {
            LinkSyntax::Bare { .. } | LinkSyntax::Literal { .. } => {
                self.get_wiki(registry.get_family_by_namespace(DEFAULT_NAMESPACE)?)?
            }
            LinkSyntax::Language { language, .. } => Arc::clone(
                registry
                    .get_family_by_namespace(DEFAULT_NAMESPACE)?
                    .get_language_wiki_by_wiki_language(language)?,
            ),
            LinkSyntax::NamespacedLanguage {
                namespace, language, ..
            } => Arc::clone(
                registry
                    .get_family_by_namespace(namespace)?
                    .get_language_wiki_by_wiki_language(language)?,
            ),
            LinkSyntax::Namespaced { namespace, .. } => {
                self.get_wiki(registry.get_family_by_namespace(namespace)?)?
            }
        };

        Some(WikiPage::new(syntax.title(), wiki))
    }

    /// Selects the edition of `family` the user prefers, falling back to the
    /// edition for [`FALLBACK_GAME_LANGUAGE`].
    pub fn get_wiki(&self, family: &WikiFamily) -> Option<Arc<WikiIndividual>> {
        let preferred = match self.language {
            LanguagePreference::Auto => {
                family.get_language_wiki_by_game_language(self.game_language)
            }
            LanguagePreference::Wiki(code) => family.get_language_wiki_by_wiki_language(code),
        };

        let wiki = preferred
            .or_else(|| family.get_language_wiki_by_game_language(FALLBACK_GAME_LANGUAGE));
        if wiki.is_none() {
            log::error!("Failed to find wiki for language {}", self.language);
        }
        wiki.map(Arc::clone)
    }

    /// The random article page of the preferred edition of `family`.
    pub fn random(&self, family: &WikiFamily) -> Option<WikiPage> {
        let wiki = self.get_wiki(family)?;
        let page_name = wiki.random_article.clone()?;
        Some(WikiPage::new(page_name, wiki))
    }

    /// The article about a game version, on the preferred edition of the
    /// default family.
    pub fn version_article(&self, version: &str) -> Option<WikiPage> {
        let family = self.snapshot.registry().get_family_by_namespace(DEFAULT_NAMESPACE)?;
        let wiki = self.get_wiki(family)?;
        let page_name = substitute(wiki.version_article.as_deref()?, version)?;
        Some(WikiPage::new(page_name, wiki))
    }

    /// Builds a page on an edition native to the player: the edition’s
    /// override if it has one, otherwise the text the game UI shows.
    fn native_page(&self, wiki: &Arc<WikiIndividual>, translation_key: &str) -> WikiPage {
        let page_name = self
            .override_text(wiki, translation_key)
            .unwrap_or_else(|| self.localizer.translate(translation_key));
        WikiPage::new(page_name, Arc::clone(wiki))
    }

    /// The edition’s title override for `translation_key`, if its override
    /// table has one.
    fn override_text(&self, wiki: &WikiIndividual, translation_key: &str) -> Option<String> {
        let table = wiki.language().lang_override()?;
        let translations = self.snapshot.translations();
        if !translations.has_translation(table, translation_key) {
            return None;
        }
        translations.get(table, translation_key).ok().map(str::to_string)
    }

    /// The title from the edition’s default-language table. A missing
    /// translation leaves the key itself as the title.
    fn default_text(&self, wiki: &WikiIndividual, translation_key: &str) -> String {
        let language = wiki.language().default_language();
        match self.snapshot.translations().get(language, translation_key) {
            Ok(text) => text.to_string(),
            Err(err) => {
                log::warn!("{err}");
                translation_key.to_string()
            }
        }
    }
}

impl<L: ?Sized> fmt::Debug for Resolver<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("generation", &self.snapshot.generation())
            .field("language", &self.language)
            .field("game_language", &self.game_language)
            .finish_non_exhaustive()
    }
}
