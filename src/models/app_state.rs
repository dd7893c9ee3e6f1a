use super::{ModKey, ModPack, ModProblem, ModSetState, SortPolicy};
use crate::services::Catalog;
use std::sync::Arc;

/// Single source of truth for one mod-management session.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`].
/// Never mutate it directly; go through the manager so that problems are
/// re-scanned and change events are emitted:
/// - [`read()`](crate::state::StateManager::read) for read-only access
/// - [`update()`](crate::state::StateManager::update) for mutations with automatic change events
///
/// The catalog is shared behind an `Arc`, so cloning a snapshot does not copy
/// the mod records.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub modset: ModSetState,

    /// All modpacks, in file order. Mutated in place by index.
    pub packs: Vec<ModPack>,

    /// Result of the last problem scan over `modset.enabled()`
    pub problems: Vec<ModProblem>,

    /// Working order differs from the selected pack's saved order
    pub dirty: bool,

    /// Keys dropped by the last pack selection because they are not installed
    pub last_dropped: Vec<ModKey>,

    pub policy: SortPolicy,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, policy: SortPolicy) -> Self {
        let modset = ModSetState::new(catalog.keys().cloned());
        Self {
            catalog,
            modset,
            packs: Vec::new(),
            problems: Vec::new(),
            dirty: false,
            last_dropped: Vec::new(),
            policy,
        }
    }

    /// The pack the working order was loaded from, if any.
    pub fn selected_pack(&self) -> Option<&ModPack> {
        self.packs.get(self.modset.selected_pack_index())
    }

    pub fn default_pack_index(&self) -> Option<usize> {
        self.packs.iter().position(|p| p.is_default)
    }

    pub fn enabled(&self) -> &[ModKey] {
        self.modset.enabled()
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}
