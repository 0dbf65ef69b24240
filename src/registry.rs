//! The namespace to wiki family registry.

use crate::family::WikiFamily;
use std::{collections::HashMap, sync::Arc};

/// Maps namespaces to the wiki families which document them.
///
/// A registry is immutable once built. Reloading builds a new registry which
/// is published as part of a new [`Snapshot`](crate::Snapshot).
#[derive(Debug, Default)]
pub struct FamilyRegistry {
    /// Families, in configuration order.
    families: Vec<Arc<WikiFamily>>,
    /// Families by namespace. Several namespaces may share one family.
    by_namespace: HashMap<String, Arc<WikiFamily>>,
}

impl FamilyRegistry {
    /// Builds a registry from named family records.
    ///
    /// A record which cannot be turned into a family is logged and skipped;
    /// the remaining records still load. When two families claim the same
    /// namespace, the first one keeps it.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, serde_json::Value)>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for (name, value) in records {
            match WikiFamily::from_value(name.as_ref(), value) {
                Ok(family) => registry.insert(family),
                Err(err) => log::warn!("Skipping wiki family: {err}"),
            }
        }
        registry
    }

    /// Adds a family and claims its namespaces.
    fn insert(&mut self, family: WikiFamily) {
        let family = Arc::new(family);
        for namespace in family.namespaces() {
            if let Some(owner) = self.by_namespace.get(namespace) {
                log::warn!(
                    "{}: namespace '{namespace}' already belongs to {}",
                    family.name(),
                    owner.name()
                );
                continue;
            }
            self.by_namespace
                .insert(namespace.clone(), Arc::clone(&family));
        }
        self.families.push(family);
    }

    /// Finds the family serving the given namespace.
    pub fn get_family_by_namespace(&self, namespace: &str) -> Option<&Arc<WikiFamily>> {
        self.by_namespace.get(namespace)
    }

    /// Returns all namespaces with a family.
    pub fn get_available_namespaces(&self) -> impl Iterator<Item = &str> {
        self.by_namespace.keys().map(String::as_str)
    }

    /// Returns true if the namespace has a family.
    #[inline]
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.by_namespace.contains_key(namespace)
    }

    /// All loaded families, in configuration order.
    pub fn families(&self) -> impl Iterator<Item = &Arc<WikiFamily>> {
        self.families.iter()
    }

    /// The number of loaded families.
    #[inline]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Returns true if no family loaded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn namespaces_share_families() {
        let registry = FamilyRegistry::from_records(test_support::families());
        let minecraft = registry.get_family_by_namespace("minecraft").unwrap();
        let realms = registry.get_family_by_namespace("realms").unwrap();
        assert!(Arc::ptr_eq(minecraft, realms));
        assert!(
            Arc::ptr_eq(minecraft, registry.get_family_by_namespace("minecraft").unwrap()),
            "lookups should be referentially stable"
        );

        let namespaces = registry.get_available_namespaces().collect::<HashSet<_>>();
        assert_eq!(namespaces, HashSet::from(["minecraft", "realms", "create"]));
        assert!(registry.get_family_by_namespace("unknown").is_none());
    }

    #[test]
    fn malformed_family_is_skipped() {
        let mut records = test_support::families();
        records.insert(0, ("broken".to_string(), json!({ "namespaces": ["broken"] })));
        let registry = FamilyRegistry::from_records(records);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains_namespace("broken"));
        assert!(registry.contains_namespace("create"));
    }

    #[test]
    fn first_family_keeps_namespace() {
        let mut records = test_support::families();
        let (_, mut impostor) = records[1].clone();
        impostor["namespaces"] = json!(["minecraft", "impostor"]);
        records.push(("impostor".to_string(), impostor));

        let registry = FamilyRegistry::from_records(records);
        assert_eq!(
            registry.get_family_by_namespace("minecraft").unwrap().name(),
            "minecraft"
        );
        assert_eq!(
            registry.get_family_by_namespace("impostor").unwrap().name(),
            "impostor"
        );
    }
}
