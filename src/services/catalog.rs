//! Mod catalog: the per-session registry of discovered mods.
//!
//! Built once from a [`DiscoverySource`]; afterwards it is shared read-only
//! (behind an `Arc`) by the state manager, the problem detector and auto-sort.
//! A rescan produces a fresh catalog rather than mutating this one.

use super::discovery::DiscoverySource;
use crate::error::{EngineError, EngineResult};
use crate::models::{ModKey, ModRecord};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: IndexMap<ModKey, ModRecord>,
    /// lower-cased id -> key of the first record registered with that id
    by_id: HashMap<String, ModKey>,
}

impl Catalog {
    /// Build the catalog from a discovery source.
    ///
    /// # Errors
    ///
    /// Fails when the source itself fails, or when it reports no mods at all.
    pub fn build(source: &dyn DiscoverySource) -> Result<Self> {
        let entries = source
            .discover()
            .context("Mod discovery source is unavailable")?;

        let catalog = Self::from_records(entries.into_iter().map(ModRecord::from));
        if catalog.is_empty() {
            return Err(EngineError::EmptyCatalog.into());
        }

        tracing::info!("Catalog built with {} mods", catalog.len());
        Ok(catalog)
    }

    /// Build from ready-made records. Duplicate keys keep the first record.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ModRecord>,
    {
        let mut catalog = Self::default();
        for record in records {
            let key = record.key();
            if catalog.records.contains_key(&key) {
                tracing::warn!("Duplicate mod {} in discovery data, keeping the first", key);
                continue;
            }
            tracing::debug!("Mod registered: {}", record.label());
            catalog
                .by_id
                .entry(record.id().to_lowercase())
                .or_insert_with(|| key.clone());
            catalog.records.insert(key, record);
        }
        catalog
    }

    /// Look up a record by key.
    ///
    /// Callers must only pass keys taken from the universe; anything else is
    /// reported as [`EngineError::NotFound`].
    pub fn lookup(&self, key: &ModKey) -> EngineResult<&ModRecord> {
        self.records
            .get(key)
            .ok_or_else(|| EngineError::NotFound(key.clone()))
    }

    /// Find the record registered for a declared id, ignoring case.
    pub fn find_by_id(&self, id: &str) -> Option<&ModRecord> {
        self.by_id
            .get(&id.trim().to_lowercase())
            .and_then(|key| self.records.get(key))
    }

    pub fn contains(&self, key: &ModKey) -> bool {
        self.records.contains_key(key)
    }

    /// All keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &ModKey> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A copy of this catalog without `key`, as after deleting that mod's folder.
    pub fn without(&self, key: &ModKey) -> Self {
        Self::from_records(
            self.records
                .values()
                .filter(|record| record.key() != *key)
                .cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscoveryEntry;

    fn record(id: &str, version: &str) -> ModRecord {
        ModRecord::new(id, id.to_uppercase(), version, format!("/mods/{}", id))
    }

    #[test]
    fn test_lookup_and_not_found() {
        let catalog = Catalog::from_records(vec![record("a", "1"), record("b", "1")]);

        assert_eq!(catalog.lookup(&ModKey::new("A", "1")).unwrap().id(), "a");

        assert!(catalog.contains(&ModKey::new("B", "1")));

        let missing = ModKey::new("a", "2");
        assert!(!catalog.contains(&missing));
        assert_eq!(
            catalog.lookup(&missing).unwrap_err(),
            EngineError::NotFound(missing)
        );
    }

    #[test]
    fn test_find_by_id_prefers_first_version() {
        let catalog = Catalog::from_records(vec![record("a", "1"), record("a", "2")]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_by_id(" A ").unwrap().version(), "1");
        assert!(catalog.find_by_id("zzz").is_none());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let first = record("a", "1");
        let second = ModRecord::new("A", "Other", "1", "/elsewhere");
        let catalog = Catalog::from_records(vec![first.clone(), second]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup(&first.key()).unwrap(), &first);
    }

    #[test]
    fn test_build_rejects_empty_source() {
        let err = Catalog::build(&Vec::<DiscoveryEntry>::new()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::EmptyCatalog)
        );
    }

    #[test]
    fn test_without() {
        let catalog = Catalog::from_records(vec![record("a", "1"), record("b", "1")]);
        let smaller = catalog.without(&ModKey::new("a", "1"));

        assert_eq!(smaller.len(), 1);
        assert!(smaller.find_by_id("a").is_none());
        assert_eq!(catalog.len(), 2);
    }
}
