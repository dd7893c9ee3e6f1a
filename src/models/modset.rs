use super::{ModKey, ModPack};
use crate::error::{EngineError, EngineResult};
use indexmap::IndexSet;
use std::collections::HashSet;

/// The mutable working set: which mods exist, which are enabled and in what order.
///
/// Invariants kept by every mutator:
/// - `enabled` has no duplicates
/// - `enabled` and `disabled` are disjoint
/// - `enabled ∪ disabled == universe`
///
/// The disabled set has no meaningful order; it is an `IndexSet` only so that
/// listings are reproducible.
#[derive(Debug, Clone, Default)]
pub struct ModSetState {
    universe: IndexSet<ModKey>,
    enabled: Vec<ModKey>,
    disabled: IndexSet<ModKey>,
    selected_pack_index: usize,
}

impl ModSetState {
    /// Create a state over `universe` with nothing enabled.
    pub fn new<I>(universe: I) -> Self
    where
        I: IntoIterator<Item = ModKey>,
    {
        let universe: IndexSet<ModKey> = universe.into_iter().collect();
        Self {
            disabled: universe.clone(),
            universe,
            enabled: Vec::new(),
            selected_pack_index: 0,
        }
    }

    pub fn universe(&self) -> &IndexSet<ModKey> {
        &self.universe
    }

    pub fn enabled(&self) -> &[ModKey] {
        &self.enabled
    }

    pub fn disabled(&self) -> &IndexSet<ModKey> {
        &self.disabled
    }

    pub fn selected_pack_index(&self) -> usize {
        self.selected_pack_index
    }

    pub fn is_enabled(&self, key: &ModKey) -> bool {
        self.enabled.contains(key)
    }

    /// Switch to pack `index` and load its order.
    ///
    /// Mods in the stored order that are not in the universe are dropped from the
    /// working order and returned so the caller can tell the user. The pack itself
    /// is left untouched.
    pub fn select_pack(&mut self, index: usize, packs: &[ModPack]) -> EngineResult<Vec<ModKey>> {
        let pack = packs.get(index).ok_or(EngineError::OutOfRange {
            index,
            len: packs.len(),
        })?;

        let dropped: Vec<ModKey> = pack
            .order
            .iter()
            .filter(|key| !self.universe.contains(*key))
            .cloned()
            .collect();

        for key in &dropped {
            tracing::warn!("Pack '{}' references missing mod {}, dropping it", pack.name, key);
        }

        self.selected_pack_index = index;
        self.set_active(pack.order.iter().cloned());
        Ok(dropped)
    }

    /// Replace the enabled order wholesale and recompute the disabled set.
    ///
    /// No ordering validation happens here. Keys outside the universe and repeats
    /// are skipped.
    pub fn set_active<I>(&mut self, order: I)
    where
        I: IntoIterator<Item = ModKey>,
    {
        let mut seen = HashSet::new();
        self.enabled = order
            .into_iter()
            .filter(|key| self.universe.contains(key) && seen.insert(key.clone()))
            .collect();
        self.disabled = self
            .universe
            .iter()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
    }

    /// Move one or more mods within or between the enabled order and the disabled set.
    ///
    /// `destination_index` is where the moved block starts in the resulting
    /// enabled list (clamped to its valid range). Keys missing from the source
    /// collection are skipped, since the caller's view may be a step behind.
    ///
    /// Returns true when the state changed.
    pub fn move_keys(
        &mut self,
        keys: &[ModKey],
        destination_index: usize,
        source_is_disabled: bool,
        destination_is_disabled: bool,
    ) -> bool {
        let mut seen = HashSet::new();
        let unique: Vec<&ModKey> = keys.iter().filter(|k| seen.insert(*k)).collect();
        if unique.is_empty() {
            return false;
        }

        match (source_is_disabled, destination_is_disabled) {
            // disabled set is unordered
            (true, true) => false,
            (false, false) => {
                let moved: Vec<ModKey> = self
                    .enabled
                    .iter()
                    .filter(|k| seen.contains(k))
                    .cloned()
                    .collect();
                if moved.is_empty() {
                    return false;
                }

                let mut remaining: Vec<ModKey> = self
                    .enabled
                    .iter()
                    .filter(|k| !seen.contains(k))
                    .cloned()
                    .collect();
                let at = destination_index.min(remaining.len());
                remaining.splice(at..at, moved);

                if remaining == self.enabled {
                    return false;
                }
                self.enabled = remaining;
                true
            }
            (false, true) => {
                let before = self.enabled.len();
                self.enabled.retain(|k| !seen.contains(k));
                for key in unique {
                    if self.universe.contains(key) {
                        self.disabled.insert(key.clone());
                    }
                }
                self.enabled.len() != before
            }
            (true, false) => {
                let moved: Vec<ModKey> = unique
                    .into_iter()
                    .filter(|k| self.disabled.contains(*k))
                    .cloned()
                    .collect();
                if moved.is_empty() {
                    return false;
                }
                for key in &moved {
                    self.disabled.shift_remove(key);
                }
                let at = destination_index.min(self.enabled.len());
                self.enabled.splice(at..at, moved);
                true
            }
        }
    }

    /// Adopt a new universe after a catalog rescan.
    ///
    /// Keys that vanished are removed from both collections; new keys start disabled.
    /// Returns the keys that were removed from the enabled order.
    pub fn reconcile_universe<I>(&mut self, universe: I) -> Vec<ModKey>
    where
        I: IntoIterator<Item = ModKey>,
    {
        self.universe = universe.into_iter().collect();
        let removed: Vec<ModKey> = self
            .enabled
            .iter()
            .filter(|k| !self.universe.contains(*k))
            .cloned()
            .collect();
        let order = std::mem::take(&mut self.enabled);
        self.set_active(order);
        removed
    }

    /// Check the disjointness invariant. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let enabled: HashSet<&ModKey> = self.enabled.iter().collect();
        enabled.len() == self.enabled.len()
            && self.enabled.iter().all(|k| !self.disabled.contains(k))
            && self.enabled.len() + self.disabled.len() == self.universe.len()
            && self.universe.iter().all(|k| enabled.contains(k) || self.disabled.contains(k))
    }
}
