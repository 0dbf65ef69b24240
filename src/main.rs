use heywiki::{
    Browser, DataPack, Identifier, LanguagePreference, Localizer, Settings, Target,
    TranslationManager, WikiPage, WikiState, link,
};
use http::Uri;

/// Shows the text of the active game language’s translation table, as the
/// game UI would.
struct TableLocalizer<'a> {
    translations: &'a TranslationManager,
    game_language: &'a str,
}

impl Localizer for TableLocalizer<'_> {
    fn translate(&self, key: &str) -> String {
        self.translations
            .get(self.game_language, key)
            .map_or_else(|_| key.to_string(), str::to_string)
    }
}

/// Prints pages instead of opening them.
struct Terminal;

impl Browser for Terminal {
    fn confirm(&mut self, uri: &Uri, page: &WikiPage) {
        println!(
            "{} ({}): {uri}\n(confirmation required, pass --yes to open directly)",
            page.page_name,
            page.wiki.wiki_language()
        );
    }

    fn open(&mut self, uri: &Uri) {
        println!("{uri}");
    }
}

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <command> [arguments]\n");
    println!("Commands:");
    println!("    link <text>: Resolve the [[wikitext links]] in text, or text as a link body");
    println!("    target <kind> <namespace:path> [translation key]: Resolve a game object");
    println!("    random [namespace]: The random article page (default: minecraft)");
    println!("    version <version>: The article about a game version");
    println!("    namespaces: List known namespaces\n");
    println!("or, use environment variables:");
    println!("    HEYWIKI_DATA");
    println!("    HEYWIKI_GAME_LANGUAGE\n");
    println!("Options:");
    println!("    --config: Settings file (JSON)");
    println!("    --data: Data pack directory");
    println!("    --language: Wiki language, or 'auto' (default: from settings)");
    println!("    --game-language: Active game language (default: en_us)");
    println!("    --yes: Skip confirmation\n");
    Err(anyhow::Error::msg(err))
}

fn opt_or_env(
    args: &mut pico_args::Arguments,
    key: &'static str,
    env: &str,
) -> anyhow::Result<Option<String>> {
    Ok(args.opt_value_from_str::<_, String>(key)?.or_else(|| std::env::var(env).ok()))
}

fn free_arg(args: &mut pico_args::Arguments, err: &'static str) -> anyhow::Result<String> {
    if let Some(arg) = args.opt_free_from_str::<String>()? {
        Ok(arg)
    } else {
        usage(err)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }

    let mut settings = match args.opt_value_from_str::<_, String>("--config")? {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(language) = args.opt_value_from_str::<_, LanguagePreference>("--language")? {
        settings.language = language;
    }
    let skip_confirmation = args.contains("--yes");
    let Some(data) = opt_or_env(&mut args, "--data", "HEYWIKI_DATA")? else {
        return usage("Missing data pack directory");
    };
    let game_language = opt_or_env(&mut args, "--game-language", "HEYWIKI_GAME_LANGUAGE")?
        .unwrap_or_else(|| heywiki::FALLBACK_GAME_LANGUAGE.to_string());
    let _ = args.contains("--");
    let command = free_arg(&mut args, "Missing command")?;

    let state = WikiState::new(&settings)?;
    let snapshot = state.reload(DataPack::from_dir(&data)?)?;
    let localizer = TableLocalizer {
        translations: snapshot.translations(),
        game_language: &game_language,
    };
    let resolver = snapshot.resolver(&settings.language, &game_language, &localizer);

    let pages: Vec<WikiPage> = match command.as_str() {
        "link" => {
            let text = free_arg(&mut args, "Missing link text")?;
            let mut links = link::find_links(&text).collect::<Vec<_>>();
            if links.is_empty() {
                links.push(&text);
            }
            links
                .into_iter()
                .filter_map(|link| resolver.from_wikitext_link(link))
                .collect()
        }
        "target" => {
            let kind = free_arg(&mut args, "Missing object kind")?;
            let identifier = free_arg(&mut args, "Missing identifier")?.parse::<Identifier>()?;
            let target = match args.opt_free_from_str::<String>()? {
                Some(key) => Target::new(identifier, key),
                None => Target::of_kind(&kind, identifier),
            };
            resolver.from_target(&target).into_iter().collect()
        }
        "random" => {
            let namespace = args
                .opt_free_from_str::<String>()?
                .unwrap_or_else(|| heywiki::DEFAULT_NAMESPACE.to_string());
            snapshot
                .registry()
                .get_family_by_namespace(&namespace)
                .and_then(|family| resolver.random(family))
                .into_iter()
                .collect()
        }
        "version" => {
            let version = free_arg(&mut args, "Missing version")?;
            resolver.version_article(&version).into_iter().collect()
        }
        "namespaces" => {
            let mut namespaces = snapshot.registry().get_available_namespaces().collect::<Vec<_>>();
            namespaces.sort_unstable();
            for namespace in namespaces {
                println!("{namespace}");
            }
            return Ok(());
        }
        _ => return usage("Unknown command"),
    };

    if !args.finish().is_empty() {
        return usage("Unknown extra arguments passed");
    }

    if pages.is_empty() {
        anyhow::bail!("No wiki page found");
    }

    for page in pages {
        if let Some(uri) = page.excerpt_uri() {
            log::debug!("Excerpt available from {uri}");
        }

        if !page.open(&settings, skip_confirmation, &mut Terminal) {
            anyhow::bail!("Could not build a URL for '{}'", page.page_name);
        }
    }

    Ok(())
}
