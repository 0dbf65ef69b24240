//! Shared configuration data for unit tests.

use crate::{
    pack::DataPack, registry::FamilyRegistry, state::Snapshot, translation::TranslationManager,
};
use serde_json::{Value, json};

/// A Minecraft-like family with `en`, `de`, and `fr` editions serving the
/// `minecraft` and `realms` namespaces, followed by a single-edition mod
/// family serving `create`.
pub(crate) fn families() -> Vec<(String, Value)> {
    vec![
        (
            "minecraft".to_string(),
            json!({
                "namespaces": ["minecraft", "realms"],
                "main": "en",
                "wikis": [
                    {
                        "article_url": "https://minecraft.wiki/w/%s",
                        "mw_api_url": "https://minecraft.wiki/api.php",
                        "random_article": "Special:RandomRootPage/Main",
                        "version_article": "Java Edition %s",
                        "excerpt": "https://minecraft.wiki/api.php?prop=extracts&titles=%s",
                        "language": {
                            "wiki_language": "en",
                            "default_language": "en_us",
                            "game_languages": ["en_us", "en_gb", "en_ca"]
                        }
                    },
                    {
                        "article_url": "https://de.minecraft.wiki/w/%s",
                        "mw_api_url": "https://de.minecraft.wiki/api.php",
                        "language": {
                            "wiki_language": "de",
                            "default_language": "de_de",
                            "game_languages": ["de_de", "de_at", "de_ch"]
                        }
                    },
                    {
                        "article_url": "https://fr.minecraft.wiki/w/%s",
                        "language": {
                            "wiki_language": "fr",
                            "default_language": "fr_fr",
                            "game_languages": ["fr_fr", "fr_ca"],
                            "lang_override": "fr_wiki"
                        }
                    }
                ]
            }),
        ),
        (
            "create".to_string(),
            json!({
                "namespaces": ["create"],
                "wikis": [
                    {
                        "article_url": "https://create.fandom.com/wiki/%s",
                        "language": {
                            "wiki_language": "en",
                            "default_language": "en_us",
                            "game_languages": ["en_us"]
                        }
                    }
                ]
            }),
        ),
    ]
}

/// Translation tables for every default language of [`families`], plus the
/// `fr_wiki` override table.
pub(crate) fn translations() -> Vec<(String, Value)> {
    vec![
        (
            "en_us".to_string(),
            json!({
                "block.minecraft.air": "",
                "block.minecraft.grass_block": "Grass Block",
                "block.minecraft.nether_wart": "Nether Wart",
                "block.minecraft.stone": "Stone",
                "item.create.wrench": "Wrench"
            }),
        ),
        (
            "de_de".to_string(),
            json!({
                "fallback": ["en_us"],
                "entries": {
                    "block.minecraft.grass_block": "Grasblock",
                    "block.minecraft.stone": "Stein"
                }
            }),
        ),
        (
            "fr_fr".to_string(),
            json!({
                "block.minecraft.grass_block": "Bloc d'herbe",
                "block.minecraft.stone": "Pierre"
            }),
        ),
        (
            "fr_wiki".to_string(),
            json!({
                "block.minecraft.grass_block": "Bloc d'herbe (wiki)"
            }),
        ),
    ]
}

/// All of the test configuration data.
pub(crate) fn pack() -> DataPack {
    DataPack {
        families: families(),
        translations: translations(),
    }
}

/// Generation 1 of the test configuration.
pub(crate) fn snapshot() -> Snapshot {
    Snapshot::new(
        1,
        FamilyRegistry::from_records(families()),
        TranslationManager::from_records(translations()),
    )
}
