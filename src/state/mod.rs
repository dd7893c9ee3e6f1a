// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>>, keeps the problem list in sync with the enabled order and
// emits change events for front ends.

use crate::error::{EngineError, EngineResult};
use crate::metrics::Metrics;
use crate::models::{find_pack, mark_default, AppState, ModKey, ModPack, ModProblem, SortPolicy};
use crate::services::{
    auto_sort, detect_problems, generate_vanilla_order, problem_sources, Catalog, SortOutcome,
    TraitClassifier,
};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::broadcast;

/// Name of the pack created when a modpack file has no packs at all
pub const DEFAULT_PACK_NAME: &str = "Default";

/// Change events emitted when state is modified
///
/// These events notify interested parties (a GUI, the CLI's verbose output)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The catalog was swapped after a rescan
    CatalogReplaced { mods: usize },

    /// Packs were added, removed, renamed, re-defaulted or saved
    PacksChanged { count: usize },

    /// A different pack is now selected
    PackSelected { index: usize, name: String },

    /// The enabled order changed
    EnabledOrderChanged { enabled: usize },

    /// The problem list changed after a re-scan
    ProblemsChanged { count: usize },

    /// The working order started or stopped differing from the saved pack
    DirtyChanged { dirty: bool },

    /// Mods referenced by a pack were dropped because they are not installed
    ModsDropped { keys: Vec<ModKey> },
}

/// What happened while adopting a freshly loaded pack collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Index of the pack that was selected
    pub selected: usize,

    /// Pack entries that are not installed and were left out of the working order
    pub dropped: Vec<ModKey>,

    /// No pack (or more than one) was marked default, so the flags were fixed up
    pub default_repaired: bool,

    /// The collection was empty and a vanilla pack was created
    pub created_default: bool,
}

/// Thread-safe session manager with event emission
///
/// This is the central state component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Re-runs the problem detector after every mutation
/// - Applies transitions atomically: a failing operation leaves the state untouched
/// - Emits [`StateChange`] events over a tokio broadcast channel
///
/// # Usage
///
/// - [`read()`](Self::read) for reading state under the lock
/// - the named operations ([`move_mods`](Self::move_mods), [`auto_sort`](Self::auto_sort), ...)
///   for mutations
/// - [`update()`](Self::update) for ad-hoc mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    /// The session state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,

    classifier: Arc<TraitClassifier>,

    metrics: Arc<Metrics>,
}

impl StateManager {
    /// Create a manager over `catalog` with nothing enabled and no packs
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new(catalog: Catalog, policy: SortPolicy) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        let metrics = Arc::new(Metrics::new());
        let classifier = TraitClassifier::new(policy.clone()).with_metrics(Arc::clone(&metrics));

        Self {
            state: Arc::new(RwLock::new(AppState::new(Arc::new(catalog), policy))),
            state_tx,
            classifier: Arc::new(classifier),
            metrics,
        }
    }

    /// Get a clone of the current state
    ///
    /// The catalog is behind an `Arc`, so this copies the working set and packs only.
    pub fn snapshot(&self) -> AppState {
        self.read(|state| state.clone())
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let enabled = state_manager.read(|state| state.enabled().len());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// The problem list and the dirty flag are recomputed after `update_fn` runs.
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        match self.try_update(|state| {
            update_fn(state);
            Ok(())
        }) {
            Ok(((), changes)) => changes,
            Err(e) => {
                tracing::warn!("State update rejected: {}", e);
                Vec::new()
            }
        }
    }

    /// Subscribe to state change events
    ///
    /// Multiple subscribers can listen simultaneously.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn classifier(&self) -> &TraitClassifier {
        &self.classifier
    }

    /// Run `op` against a working copy and commit it only if it succeeds.
    fn try_update<F, T>(&self, op: F) -> EngineResult<(T, Vec<StateChange>)>
    where
        F: FnOnce(&mut AppState) -> EngineResult<T>,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut working = state.clone();

        let value = op(&mut working)?;
        let problems = detect_problems(&working.catalog, working.modset.enabled())?;
        self.metrics.record_problem_scan(problems.len());
        working.problems = problems;
        working.dirty = is_dirty(&working);

        let changes = detect_changes(&state, &working);
        *state = working;
        drop(state);

        self.metrics.record_state_update();
        for change in &changes {
            // a send error only means nobody is listening
            if self.state_tx.send(change.clone()).is_ok() {
                self.metrics.record_state_broadcast();
            } else {
                self.metrics.record_state_broadcast_error();
            }
        }

        Ok((value, changes))
    }

    /// Adopt a pack collection loaded from the modpack store
    ///
    /// Selects the first default pack. An empty collection gets a vanilla
    /// `Default` pack; a collection with no default (or several) has its
    /// flags repaired so exactly one pack is default.
    pub fn load_packs(&self, packs: Vec<ModPack>) -> EngineResult<LoadReport> {
        let (report, _) = self.try_update(|state| {
            let mut report = LoadReport::default();
            state.packs = packs;

            if state.packs.is_empty() {
                let order = generate_vanilla_order(&state.catalog, &state.policy);
                tracing::info!("No modpacks found, creating '{}' with {} vanilla mods", DEFAULT_PACK_NAME, order.len());
                state.packs.push(ModPack::new(DEFAULT_PACK_NAME, true, order));
                report.created_default = true;
            }

            let defaults = state.packs.iter().filter(|p| p.is_default).count();
            let selected = state.default_pack_index().unwrap_or(0);
            if defaults != 1 {
                tracing::warn!("{} packs marked default, keeping '{}'", defaults, state.packs[selected].name);
                mark_default(&mut state.packs, selected);
                report.default_repaired = true;
            }

            report.dropped = state.modset.select_pack(selected, &state.packs)?;
            report.selected = selected;
            state.last_dropped = report.dropped.clone();
            Ok(report)
        })?;

        tracing::info!(
            "Loaded {} packs, selected #{} ({} dropped)",
            self.read(|s| s.packs.len()),
            report.selected,
            report.dropped.len()
        );
        Ok(report)
    }

    /// Switch to pack `index`, returning the pack entries that are not installed
    pub fn select_pack(&self, index: usize) -> EngineResult<Vec<ModKey>> {
        let (dropped, _) = self.try_update(|state| {
            let dropped = state.modset.select_pack(index, &state.packs)?;
            state.last_dropped = dropped.clone();
            Ok(dropped)
        })?;
        Ok(dropped)
    }

    /// Index of the pack named `name` (case-insensitive)
    pub fn find_pack(&self, name: &str) -> EngineResult<usize> {
        self.read(|state| find_pack(&state.packs, name))
            .ok_or_else(|| EngineError::PackNotFound(name.to_string()))
    }

    /// Replace the enabled order wholesale
    pub fn set_active(&self, order: Vec<ModKey>) -> Vec<StateChange> {
        self.update(|state| state.modset.set_active(order))
    }

    /// Move mods within or between the enabled order and the disabled set
    ///
    /// Returns true when anything moved.
    pub fn move_mods(
        &self,
        keys: &[ModKey],
        destination_index: usize,
        source_is_disabled: bool,
        destination_is_disabled: bool,
    ) -> bool {
        let mut moved = false;
        let mut count = 0;
        self.update(|state| {
            // distinct keys present in the source collection before the move
            let unique: HashSet<&ModKey> = keys.iter().collect();
            count = unique
                .into_iter()
                .filter(|key| {
                    if source_is_disabled {
                        state.modset.disabled().contains(*key)
                    } else {
                        state.modset.is_enabled(key)
                    }
                })
                .count();
            moved = state.modset.move_keys(
                keys,
                destination_index,
                source_is_disabled,
                destination_is_disabled,
            );
        });
        if moved {
            self.metrics.record_moved(count);
        }
        moved
    }

    /// Auto-sort the enabled order and apply the result
    pub fn auto_sort(&self) -> EngineResult<SortOutcome> {
        let started = Instant::now();
        let (outcome, _) = self.try_update(|state| {
            let outcome = auto_sort(
                &state.catalog,
                state.modset.enabled(),
                &self.classifier,
                &state.policy,
            )?;
            if outcome.changed {
                state.modset.set_active(outcome.order.clone());
            }
            Ok(outcome)
        })?;

        self.metrics
            .record_auto_sort(outcome.changed, outcome.used_fallback, started.elapsed());
        Ok(outcome)
    }

    pub fn problems(&self) -> Vec<ModProblem> {
        self.read(|state| state.problems.clone())
    }

    /// Enabled mods that raised at least one problem, in load order
    pub fn problem_sources(&self) -> Vec<ModKey> {
        self.read(|state| problem_sources(state.modset.enabled(), &state.problems))
    }

    /// The next problem source after `current` in load order, wrapping around
    pub fn next_problem_source(&self, current: Option<&ModKey>) -> Option<ModKey> {
        let sources = self.problem_sources();
        let enabled = self.read(|state| state.modset.enabled().to_vec());
        let position = current.and_then(|key| enabled.iter().position(|k| k == key));

        let after_current = position.and_then(|pos| {
            sources
                .iter()
                .find(|s| enabled.iter().position(|k| k == *s).is_some_and(|i| i > pos))
        });
        after_current.or_else(|| sources.first()).cloned()
    }

    pub fn packs(&self) -> Vec<ModPack> {
        self.read(|state| state.packs.clone())
    }

    pub fn selected_pack(&self) -> Option<ModPack> {
        self.read(|state| state.selected_pack().cloned())
    }

    /// Store the working order into the selected pack
    pub fn save_current_pack(&self) -> EngineResult<()> {
        self.try_update(|state| {
            let index = state.modset.selected_pack_index();
            let len = state.packs.len();
            let enabled = state.modset.enabled().to_vec();
            let pack = state
                .packs
                .get_mut(index)
                .ok_or(EngineError::OutOfRange { index, len })?;
            pack.order = enabled;
            tracing::info!("Saved {} mods into pack '{}'", pack.order.len(), pack.name);
            Ok(())
        })?;
        Ok(())
    }

    /// Make pack `index` the only default pack
    pub fn set_default_pack(&self, index: usize) -> EngineResult<()> {
        self.try_update(|state| {
            let len = state.packs.len();
            if !mark_default(&mut state.packs, index) {
                return Err(EngineError::OutOfRange { index, len });
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Append a new pack seeded with the vanilla mods and select it
    pub fn create_pack(&self, name: &str) -> EngineResult<usize> {
        let (index, _) = self.try_update(|state| {
            let order = generate_vanilla_order(&state.catalog, &state.policy);
            state.packs.push(ModPack::new(name, false, order));
            let index = state.packs.len() - 1;
            state.last_dropped = state.modset.select_pack(index, &state.packs)?;
            Ok(index)
        })?;
        tracing::info!("Created pack '{}'", name);
        Ok(index)
    }

    pub fn rename_pack(&self, index: usize, name: &str) -> EngineResult<()> {
        self.try_update(|state| {
            let len = state.packs.len();
            let pack = state
                .packs
                .get_mut(index)
                .ok_or(EngineError::OutOfRange { index, len })?;
            tracing::info!("Renamed pack '{}' to '{}'", pack.name, name);
            pack.name = name.to_string();
            Ok(())
        })?;
        Ok(())
    }

    /// Delete pack `index` and select the first remaining pack
    ///
    /// The last pack cannot be deleted. If the default pack goes, the first
    /// remaining pack becomes default.
    pub fn delete_pack(&self, index: usize) -> EngineResult<()> {
        self.try_update(|state| {
            let len = state.packs.len();
            if index >= len {
                return Err(EngineError::OutOfRange { index, len });
            }
            if len == 1 {
                return Err(EngineError::LastPack);
            }

            let removed = state.packs.remove(index);
            if state.default_pack_index().is_none() {
                mark_default(&mut state.packs, 0);
            }
            state.last_dropped = state.modset.select_pack(0, &state.packs)?;
            tracing::info!("Deleted pack '{}'", removed.name);
            Ok(())
        })?;
        Ok(())
    }

    /// Bring an imported pack into the session
    ///
    /// A pack with an existing name loads its order into that pack's working
    /// order (unsaved, so the session turns dirty). Otherwise the pack is
    /// appended, never as default, and selected. Returns the pack index.
    pub fn import_pack(&self, pack: ModPack) -> EngineResult<usize> {
        let (index, _) = self.try_update(|state| {
            let index = match find_pack(&state.packs, &pack.name) {
                Some(index) => {
                    state.last_dropped = state.modset.select_pack(index, &state.packs)?;
                    state.modset.set_active(pack.order);
                    index
                }
                None => {
                    state.packs.push(ModPack::new(pack.name, false, pack.order));
                    let index = state.packs.len() - 1;
                    state.last_dropped = state.modset.select_pack(index, &state.packs)?;
                    index
                }
            };
            Ok(index)
        })?;
        Ok(index)
    }

    /// Swap in a rescanned catalog
    ///
    /// Vanished mods leave the working set, new mods start disabled and the
    /// classifier cache is cleared. Returns the keys removed from the enabled order.
    pub fn replace_catalog(&self, catalog: Catalog) -> EngineResult<Vec<ModKey>> {
        self.classifier.clear_cache();
        let (removed, _) = self.try_update(|state| {
            let removed = state.modset.reconcile_universe(catalog.keys().cloned());
            state.catalog = Arc::new(catalog);
            Ok(removed)
        })?;
        for key in &removed {
            tracing::warn!("Mod {} is no longer installed and was disabled", key);
        }
        Ok(removed)
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
            classifier: Arc::clone(&self.classifier),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Working order differs from what the selected pack has stored.
fn is_dirty(state: &AppState) -> bool {
    match state.selected_pack() {
        Some(pack) => pack.order.as_slice() != state.modset.enabled(),
        None => !state.modset.enabled().is_empty(),
    }
}

/// Detect what changed between two states and generate events
fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if !Arc::ptr_eq(&old.catalog, &new.catalog) {
        changes.push(StateChange::CatalogReplaced {
            mods: new.catalog.len(),
        });
    }

    if old.packs != new.packs {
        changes.push(StateChange::PacksChanged {
            count: new.packs.len(),
        });
    }

    let old_index = old.modset.selected_pack_index();
    let new_index = new.modset.selected_pack_index();
    let old_name = old.selected_pack().map(|p| p.name.as_str());
    let new_name = new.selected_pack().map(|p| p.name.as_str());
    if old_index != new_index || old_name != new_name {
        if let Some(name) = new_name {
            changes.push(StateChange::PackSelected {
                index: new_index,
                name: name.to_string(),
            });
        }
    }

    if old.modset.enabled() != new.modset.enabled() {
        changes.push(StateChange::EnabledOrderChanged {
            enabled: new.modset.enabled().len(),
        });
    }

    if !new.last_dropped.is_empty() && old.last_dropped != new.last_dropped {
        changes.push(StateChange::ModsDropped {
            keys: new.last_dropped.clone(),
        });
    }

    if old.problems != new.problems {
        changes.push(StateChange::ProblemsChanged {
            count: new.problems.len(),
        });
    }

    if old.dirty != new.dirty {
        changes.push(StateChange::DirtyChanged { dirty: new.dirty });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModRecord, ProblemKind};

    fn key(id: &str) -> ModKey {
        ModKey::new(id, "1")
    }

    fn plain(id: &str) -> ModRecord {
        ModRecord::new(id, id, "1", format!("/nonexistent/{}", id))
    }

    fn manager() -> StateManager {
        let catalog = Catalog::from_records(vec![
            plain("vanilla_text"),
            plain("a").with_requires_before(["b"]),
            plain("b"),
            plain("c"),
        ]);
        StateManager::new(catalog, SortPolicy::default())
    }

    fn enabled_ids(manager: &StateManager) -> Vec<String> {
        manager.read(|s| s.enabled().iter().map(|k| k.id().to_string()).collect())
    }

    #[test]
    fn test_new_state_manager() {
        let manager = manager();
        let state = manager.snapshot();

        assert!(state.enabled().is_empty());
        assert!(state.packs.is_empty());
        assert!(!state.dirty);
    }

    #[test]
    fn test_load_empty_collection_creates_vanilla_default() {
        let manager = manager();

        let report = manager.load_packs(Vec::new()).unwrap();

        assert!(report.created_default);
        let packs = manager.packs();
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].name, DEFAULT_PACK_NAME);
        assert!(packs[0].is_default);
        assert_eq!(enabled_ids(&manager), vec!["vanilla_text"]);
    }

    #[test]
    fn test_load_selects_default_and_reports_drops() {
        let manager = manager();
        let packs = vec![
            ModPack::new("first", false, vec![key("c")]),
            ModPack::new("second", true, vec![key("b"), key("ghost"), key("a")]),
        ];

        let report = manager.load_packs(packs).unwrap();

        assert_eq!(report.selected, 1);
        assert_eq!(report.dropped, vec![key("ghost")]);
        assert!(!report.default_repaired);
        assert_eq!(enabled_ids(&manager), vec!["b", "a"]);
        // pack keeps the missing entry, so the working order counts as unsaved
        assert!(manager.read(|s| s.dirty));
    }

    #[test]
    fn test_load_repairs_missing_default() {
        let manager = manager();
        let report = manager
            .load_packs(vec![
                ModPack::new("x", false, Vec::new()),
                ModPack::new("y", false, Vec::new()),
            ])
            .unwrap();

        assert!(report.default_repaired);
        assert_eq!(report.selected, 0);
        assert!(manager.packs()[0].is_default);
    }

    #[test]
    fn test_problems_follow_mutations() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("p", true, Vec::new())]).unwrap();

        manager.set_active(vec![key("a"), key("b")]);
        assert_eq!(manager.problems().len(), 1);
        assert_eq!(manager.problems()[0].kind, ProblemKind::MissingBefore);
        assert_eq!(manager.problem_sources(), vec![key("a")]);

        assert!(manager.move_mods(&[key("b")], 0, false, false));
        assert!(manager.problems().is_empty());
        assert!(manager.next_problem_source(None).is_none());
    }

    #[test]
    fn test_moved_count_ignores_repeats_and_stale_keys() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("p", true, Vec::new())]).unwrap();
        manager.set_active(vec![key("a"), key("b")]);

        // "c" is disabled, so only "b" leaves the enabled list
        assert!(manager.move_mods(&[key("b"), key("b"), key("c")], 0, false, true));
        assert_eq!(manager.metrics().snapshot().mods_moved, 1);

        assert!(!manager.move_mods(&[key("a")], 0, false, false));
        assert_eq!(manager.metrics().snapshot().mods_moved, 1);
    }

    #[test]
    fn test_auto_sort_applies_result() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("p", true, Vec::new())]).unwrap();
        manager.set_active(vec![key("c"), key("a"), key("b")]);

        let outcome = manager.auto_sort().unwrap();

        assert!(outcome.changed);
        assert_eq!(enabled_ids(&manager), vec!["c", "b", "a"]);
        assert!(manager.problems().is_empty());
        assert_eq!(manager.metrics().snapshot().auto_sorts, 1);
    }

    #[test]
    fn test_save_current_pack_clears_dirty() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("p", true, Vec::new())]).unwrap();
        manager.set_active(vec![key("c")]);
        assert!(manager.read(|s| s.dirty));

        manager.save_current_pack().unwrap();

        assert!(!manager.read(|s| s.dirty));
        assert_eq!(manager.selected_pack().unwrap().order, vec![key("c")]);
    }

    #[test]
    fn test_pack_lifecycle() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("main", true, vec![key("c")])]).unwrap();

        let index = manager.create_pack("extra").unwrap();
        assert_eq!(index, 1);
        assert_eq!(enabled_ids(&manager), vec!["vanilla_text"]);

        manager.rename_pack(1, "renamed").unwrap();
        assert_eq!(manager.find_pack("RENAMED").unwrap(), 1);

        manager.set_default_pack(1).unwrap();
        assert!(!manager.packs()[0].is_default);

        manager.delete_pack(1).unwrap();
        let packs = manager.packs();
        assert_eq!(packs.len(), 1);
        assert!(packs[0].is_default);
        assert_eq!(enabled_ids(&manager), vec!["c"]);

        assert_eq!(manager.delete_pack(0).unwrap_err(), EngineError::LastPack);
        assert_eq!(
            manager.find_pack("renamed").unwrap_err(),
            EngineError::PackNotFound("renamed".to_string())
        );
    }

    #[test]
    fn test_failed_operation_leaves_state_untouched() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("p", true, vec![key("c")])]).unwrap();
        let before = manager.snapshot();

        assert!(manager.select_pack(5).is_err());
        assert!(manager.rename_pack(9, "x").is_err());

        let after = manager.snapshot();
        assert_eq!(after.packs, before.packs);
        assert_eq!(after.enabled(), before.enabled());
    }

    #[test]
    fn test_import_pack() {
        let manager = manager();
        manager.load_packs(vec![ModPack::new("main", true, vec![key("c")])]).unwrap();

        let index = manager
            .import_pack(ModPack::new("MAIN", true, vec![key("b")]))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(enabled_ids(&manager), vec!["b"]);
        assert!(manager.read(|s| s.dirty));

        let index = manager
            .import_pack(ModPack::new("other", true, vec![key("a")]))
            .unwrap();
        assert_eq!(index, 1);
        assert!(!manager.packs()[1].is_default);
        assert_eq!(enabled_ids(&manager), vec!["a"]);
    }

    #[test]
    fn test_replace_catalog_disables_vanished_mods() {
        let manager = manager();
        manager
            .load_packs(vec![ModPack::new("p", true, vec![key("a"), key("c")])])
            .unwrap();

        let smaller = manager.read(|s| s.catalog.without(&key("c")));
        let removed = manager.replace_catalog(smaller).unwrap();

        assert_eq!(removed, vec![key("c")]);
        assert_eq!(enabled_ids(&manager), vec!["a"]);
        assert!(manager.read(|s| s.modset.is_consistent()));
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = manager();
        let mut rx = manager.subscribe();

        manager.load_packs(vec![ModPack::new("p", true, vec![key("c")])]).unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&StateChange::PacksChanged { count: 1 }));
        assert!(events.contains(&StateChange::EnabledOrderChanged { enabled: 1 }));
        assert!(events.contains(&StateChange::PackSelected {
            index: 0,
            name: "p".to_string()
        }));
    }

    #[test]
    fn test_no_subscribers_counts_broadcast_errors() {
        let manager = manager();
        manager.set_active(vec![key("c")]);
        assert!(manager.metrics().snapshot().state_broadcast_errors > 0);
    }
}
