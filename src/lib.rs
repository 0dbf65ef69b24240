//! Resolution of in-game references to wiki article URLs.
//!
//! A reference (an identifier plus translation key, or the body of a wikitext
//! link) is resolved against the currently published [`Snapshot`] of wiki
//! families and translation tables into a [`WikiPage`]: a localised article
//! title plus the [`WikiIndividual`] edition it belongs to.

pub mod cache;
pub mod config;
pub mod family;
pub mod language;
pub mod link;
pub mod lru_limiter;
pub mod pack;
pub mod page;
pub mod registry;
pub mod reload;
pub mod state;
mod title;
pub mod translation;

#[cfg(test)]
mod test_support;

pub use cache::{LookupCache, PageExcerpt, PageExcerptCache, PageKey, PageNameSuggestionCache};
pub use config::{LanguagePreference, Settings};
pub use family::{WikiFamily, WikiIndividual};
pub use language::LanguageMatcher;
pub use pack::DataPack;
pub use page::{Browser, Identifier, Localizer, Resolver, Target, WikiPage};
pub use registry::FamilyRegistry;
pub use state::{Snapshot, WikiState};
pub use translation::TranslationManager;

/// The namespace used when a reference does not name one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// The game language used when no edition matches the configured language.
pub const FALLBACK_GAME_LANGUAGE: &str = "en_us";

/// The result type for fallible operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that may occur while loading configuration or building URLs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The settings file could not be read.
    #[error(transparent)]
    Config(#[from] config::Error),

    /// A family definition was rejected.
    #[error(transparent)]
    Family(#[from] family::Error),

    /// The configuration data could not be read.
    #[error(transparent)]
    Pack(#[from] pack::Error),

    /// A page URI could not be built.
    #[error(transparent)]
    Page(#[from] page::Error),

    /// The reload graph could not be executed.
    #[error(transparent)]
    Reload(#[from] reload::Error),

    /// A translation lookup failed.
    #[error(transparent)]
    Translation(#[from] translation::Error),
}
