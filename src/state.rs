//! Versioned configuration and its atomic publication.
//!
//! Readers take an [`Arc<Snapshot>`] and resolve everything against it, so a
//! resolution in flight always sees one whole generation. A reload builds the
//! next generation off to the side, running its listeners in declared
//! dependency order (families, then translations and caches), and publishes
//! it with a single pointer swap.

use crate::{
    Error, FALLBACK_GAME_LANGUAGE, Result,
    cache::{PageExcerptCache, PageNameSuggestionCache},
    config::{LanguagePreference, Settings},
    pack::DataPack,
    page::{Localizer, Resolver},
    registry::FamilyRegistry,
    reload::ReloadGraph,
    translation::TranslationManager,
};
use arc_cell::ArcCell;
use parking_lot::Mutex;
use std::sync::Arc;

/// One generation of wiki configuration.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// The generation number. Generation 0 is the empty configuration.
    generation: u64,
    /// Namespace to family.
    registry: FamilyRegistry,
    /// Language to translation table.
    translations: TranslationManager,
}

impl Snapshot {
    /// Creates a snapshot from its parts.
    pub fn new(
        generation: u64,
        registry: FamilyRegistry,
        translations: TranslationManager,
    ) -> Self {
        Self {
            generation,
            registry,
            translations,
        }
    }

    /// The generation number.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The family registry.
    #[inline]
    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    /// The translation tables.
    #[inline]
    pub fn translations(&self) -> &TranslationManager {
        &self.translations
    }

    /// Creates a resolver for the given user preference and game language.
    pub fn resolver<'a, L: Localizer + ?Sized>(
        &'a self,
        language: &'a LanguagePreference,
        game_language: &'a str,
        localizer: &'a L,
    ) -> Resolver<'a, L> {
        Resolver::new(self, language, game_language, localizer)
    }
}

/// The next generation, while it is being built.
#[derive(Debug)]
pub(crate) struct Staging {
    /// The generation number being built.
    generation: u64,
    /// The configuration data. Listeners take what they consume.
    pack: DataPack,
    /// The family registry, once the family listener has run.
    registry: Option<FamilyRegistry>,
    /// The translation tables, once the translation listener has run.
    translations: Option<TranslationManager>,
}

/// Reload listener IDs.
mod listener {
    /// Builds the family registry.
    pub const FAMILY: &str = "heywiki:family";
    /// Builds the translation tables.
    pub const TRANSLATION: &str = "heywiki:translation";
    /// Resets the page name suggestion cache.
    pub const PAGE_NAME_SUGGESTIONS: &str = "heywiki:page_name_suggestions";
    /// Resets the page excerpt cache.
    pub const PAGE_EXCERPTS: &str = "heywiki:page_excerpts";
}

/// Process-wide wiki state: the published configuration and the caches
/// derived from it.
pub struct WikiState {
    /// The published generation.
    current: ArcCell<Snapshot>,
    /// Reload listeners.
    graph: ReloadGraph<Staging, Error>,
    /// Serialises reloads.
    reload_lock: Mutex<()>,
    /// Page name suggestions.
    suggestions: Arc<PageNameSuggestionCache>,
    /// Page excerpts.
    excerpts: Arc<PageExcerptCache>,
}

impl WikiState {
    /// Creates state holding the empty generation 0.
    pub fn new(settings: &Settings) -> Result<Self> {
        let suggestions = Arc::new(PageNameSuggestionCache::with_max_entries(
            settings.suggestion_cache_entries,
        ));
        let excerpts = Arc::new(PageExcerptCache::with_max_bytes(settings.excerpt_cache_bytes));

        let mut graph = ReloadGraph::<Staging, Error>::new();
        graph.register(listener::FAMILY, &[], |staging| {
            let records = core::mem::take(&mut staging.pack.families);
            staging.registry = Some(FamilyRegistry::from_records(records));
            Ok(())
        })?;
        graph.register(listener::TRANSLATION, &[listener::FAMILY], |staging| {
            let records = core::mem::take(&mut staging.pack.translations);
            let translations = TranslationManager::from_records(records);
            if let Some(registry) = &staging.registry {
                translations.check_default_languages(registry);
            }
            staging.translations = Some(translations);
            Ok(())
        })?;
        graph.register(listener::PAGE_NAME_SUGGESTIONS, &[listener::FAMILY], {
            let suggestions = Arc::clone(&suggestions);
            move |staging: &mut Staging| {
                suggestions.reset(staging.generation);
                Ok(())
            }
        })?;
        graph.register(listener::PAGE_EXCERPTS, &[listener::FAMILY], {
            let excerpts = Arc::clone(&excerpts);
            move |staging: &mut Staging| {
                excerpts.reset(staging.generation);
                Ok(())
            }
        })?;

        Ok(Self {
            current: ArcCell::new(Arc::new(Snapshot::default())),
            graph,
            reload_lock: Mutex::new(()),
            suggestions,
            excerpts,
        })
    }

    /// The currently published generation.
    #[inline]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.get()
    }

    /// Builds a new generation from `pack` and publishes it.
    ///
    /// Malformed records are skipped. If the reload itself fails, the
    /// previous generation stays published.
    pub fn reload(&self, pack: DataPack) -> Result<Arc<Snapshot>> {
        let _guard = self.reload_lock.lock();
        let live = self.current.get();

        let mut staging = Staging {
            generation: live.generation + 1,
            pack,
            registry: None,
            translations: None,
        };

        if let Err(err) = self.graph.run(&mut staging) {
            log::error!("Reload of generation {} failed: {err}", staging.generation);
            self.suggestions.reset(live.generation);
            self.excerpts.reset(live.generation);
            return Err(err);
        }

        let snapshot = Arc::new(Snapshot::new(
            staging.generation,
            staging.registry.unwrap_or_default(),
            staging.translations.unwrap_or_default(),
        ));
        self.current.set(Arc::clone(&snapshot));

        log::info!(
            "Published wiki configuration generation {}: {} families, {} namespaces, {} languages",
            snapshot.generation,
            snapshot.registry.len(),
            snapshot.registry.get_available_namespaces().count(),
            snapshot.translations.len()
        );

        if snapshot
            .registry
            .get_family_by_namespace(crate::DEFAULT_NAMESPACE)
            .is_some_and(|family| {
                family
                    .get_language_wiki_by_game_language(FALLBACK_GAME_LANGUAGE)
                    .is_none()
            })
        {
            log::warn!(
                "The {} family has no edition for {FALLBACK_GAME_LANGUAGE}",
                crate::DEFAULT_NAMESPACE
            );
        }

        Ok(snapshot)
    }

    /// The order in which reload listeners run.
    pub fn reload_order(&self) -> Result<Vec<&'static str>> {
        Ok(self.graph.order()?)
    }

    /// The page name suggestion cache.
    #[inline]
    pub fn suggestions(&self) -> &PageNameSuggestionCache {
        &self.suggestions
    }

    /// The page excerpt cache.
    #[inline]
    pub fn excerpts(&self) -> &PageExcerptCache {
        &self.excerpts
    }
}

impl core::fmt::Debug for WikiState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WikiState")
            .field("generation", &self.snapshot().generation)
            .field("graph", &self.graph)
            .field("suggestions", &self.suggestions)
            .field("excerpts", &self.excerpts)
            .finish()
    }
}
