//! The wikitext link grammar.
//!
//! A link body is classified by looking at its first and, for namespaced
//! links, second colon-delimited token:
//!
//! ```text
//! [[Grass]]                   Bare
//! [[en:Grass]]                Language       (en is a language of the default family)
//! [[minecraft:en:Grass]]      NamespacedLanguage
//! [[minecraft:Grass]]         Namespaced
//! [[Minecraft Legend:Grass]]  Literal
//! ```
//!
//! Language selectors take priority over namespaces, and both take priority
//! over reading the text as a literal title. Colons inside a title survive.

use crate::{DEFAULT_NAMESPACE, registry::FamilyRegistry};

/// The information needed to classify a link.
pub trait LinkContext {
    /// Returns true if `code` is a wiki-language code of the family serving
    /// `namespace`.
    fn is_wiki_language(&self, namespace: &str, code: &str) -> bool;

    /// Returns true if `namespace` has a family.
    fn is_namespace(&self, namespace: &str) -> bool;
}

impl LinkContext for FamilyRegistry {
    fn is_wiki_language(&self, namespace: &str, code: &str) -> bool {
        self.get_family_by_namespace(namespace)
            .is_some_and(|family| family.has_wiki_language(code))
    }

    fn is_namespace(&self, namespace: &str) -> bool {
        self.contains_namespace(namespace)
    }
}

/// A classified wikitext link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkSyntax<'a> {
    /// A title with no colon, in the default namespace.
    Bare {
        /// The page title.
        title: &'a str,
    },
    /// A title with an explicit language of the default namespace’s family.
    Language {
        /// The wiki-language code.
        language: &'a str,
        /// The page title.
        title: &'a str,
    },
    /// A title in a known namespace, with an explicit language.
    NamespacedLanguage {
        /// The namespace.
        namespace: &'a str,
        /// The wiki-language code.
        language: &'a str,
        /// The page title.
        title: &'a str,
    },
    /// A title in a known namespace.
    Namespaced {
        /// The namespace.
        namespace: &'a str,
        /// The page title.
        title: &'a str,
    },
    /// A title whose prefix is neither a language nor a namespace, taken
    /// verbatim in the default namespace.
    Literal {
        /// The page title, including the unrecognised prefix.
        title: &'a str,
    },
}

impl<'a> LinkSyntax<'a> {
    /// Classifies the body of a wikitext link.
    pub fn classify(link: &'a str, context: &impl LinkContext) -> Self {
        let Some((first, rest)) = link.split_once(':') else {
            return Self::Bare { title: link };
        };

        if context.is_wiki_language(DEFAULT_NAMESPACE, first) {
            return Self::Language {
                language: first,
                title: rest,
            };
        }

        if context.is_namespace(first) {
            if let Some((language, title)) = rest.split_once(':')
                && context.is_wiki_language(first, language)
            {
                return Self::NamespacedLanguage {
                    namespace: first,
                    language,
                    title,
                };
            }

            return Self::Namespaced {
                namespace: first,
                title: rest,
            };
        }

        Self::Literal { title: link }
    }

    /// The page title.
    pub fn title(&self) -> &'a str {
        match *self {
            Self::Bare { title }
            | Self::Language { title, .. }
            | Self::NamespacedLanguage { title, .. }
            | Self::Namespaced { title, .. }
            | Self::Literal { title } => title,
        }
    }
}

/// Finds the bodies of `[[wikitext links]]` in free text, such as a chat
/// message.
///
/// Only the target part of a piped link (`[[Grass|lawn]]`) is returned. Empty
/// bodies and bodies spanning a line break are skipped.
pub fn find_links(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    core::iter::from_fn(move || {
        loop {
            let start = rest.find("[[")? + 2;
            let end = start + rest[start..].find("]]")?;
            let body = &rest[start..end];
            rest = &rest[end + 2..];

            // An unclosed `[[` before this one is plain text
            let body = body.rsplit_once("[[").map_or(body, |(_, inner)| inner);
            let target = body.split_once('|').map_or(body, |(target, _)| target).trim();
            if !target.is_empty() && !target.contains('\n') {
                return Some(target);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{LinkSyntax::*, *};

    /// `minecraft` has `en` and `de`, `create` has `en`.
    struct Context;

    impl LinkContext for Context {
        fn is_wiki_language(&self, namespace: &str, code: &str) -> bool {
            matches!((namespace, code), ("minecraft", "en" | "de") | ("create", "en"))
        }

        fn is_namespace(&self, namespace: &str) -> bool {
            matches!(namespace, "minecraft" | "create")
        }
    }

    fn classify(link: &str) -> LinkSyntax<'_> {
        LinkSyntax::classify(link, &Context)
    }

    #[test]
    fn bare() {
        assert_eq!(classify("Grass"), Bare { title: "Grass" });
        assert_eq!(classify(""), Bare { title: "" });
    }

    #[test]
    fn language() {
        assert_eq!(classify("en:Grass"), Language { language: "en", title: "Grass" });
        assert_eq!(
            classify("de:Java Edition:Seite"),
            Language { language: "de", title: "Java Edition:Seite" },
            "colons in the title should survive"
        );
    }

    #[test]
    fn namespaced() {
        assert_eq!(
            classify("minecraft:en:Grass"),
            NamespacedLanguage { namespace: "minecraft", language: "en", title: "Grass" }
        );
        assert_eq!(
            classify("create:en:Wrench:Usage"),
            NamespacedLanguage { namespace: "create", language: "en", title: "Wrench:Usage" }
        );
        assert_eq!(
            classify("minecraft:Grass"),
            Namespaced { namespace: "minecraft", title: "Grass" }
        );
        assert_eq!(
            classify("create:de:Wrench"),
            Namespaced { namespace: "create", title: "de:Wrench" },
            "a language of another family is part of the title"
        );
        assert_eq!(
            classify("minecraft:fr:Herbe"),
            Namespaced { namespace: "minecraft", title: "fr:Herbe" }
        );
    }

    #[test]
    fn literal() {
        assert_eq!(
            classify("Minecraft Legend:Grass"),
            Literal { title: "Minecraft Legend:Grass" }
        );
        assert_eq!(classify("fr:Herbe"), Literal { title: "fr:Herbe" });
        assert_eq!(classify(":Grass"), Literal { title: ":Grass" });
    }

    #[test]
    fn title() {
        assert_eq!(classify("minecraft:en:Grass").title(), "Grass");
        assert_eq!(classify("Legend:Grass").title(), "Legend:Grass");
    }

    #[test]
    fn find_links() {
        let links = super::find_links("see [[Grass]] and [[de:Gras|the German page]]!")
            .collect::<Vec<_>>();
        assert_eq!(links, ["Grass", "de:Gras"]);

        let links = super::find_links("[[ [[minecraft:Stone]] [[]] [[Split\nLine]] [[Open")
            .collect::<Vec<_>>();
        assert_eq!(links, ["minecraft:Stone"]);

        assert_eq!(super::find_links("no links here").count(), 0);
    }
}
