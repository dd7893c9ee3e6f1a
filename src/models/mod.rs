//! Data models for the ModHearth engine.
//!
//! - [`ModKey`] / [`ModRecord`]: mod identity and catalog metadata
//! - [`ModPack`]: a named, ordered modlist as DFHack persists it
//! - [`ModSetState`]: the enabled/disabled working set and its transitions
//! - [`ModProblem`]: one ordering or conflict violation
//! - [`ModTraits`]: coarse content flags used by auto-sort
//! - [`UserConfig`] / [`SortPolicy`]: configuration loaded from `ModHearth Config.yaml`
//! - [`AppState`]: everything above for one session, owned by
//!   [`StateManager`](crate::state::StateManager)

pub mod app_state;
pub mod config;
pub mod mod_record;
pub mod modpack;
pub mod modset;
pub mod problem;
pub mod traits;

pub use app_state::AppState;
pub use config::{mod_manager_path_in, Settings, SortPolicy, UserConfig};
pub use mod_record::{DiscoveryEntry, ModKey, ModRecord};
pub use modpack::{find_pack, mark_default, ModPack};
pub use modset::ModSetState;
pub use problem::{ModProblem, ProblemKind};
pub use traits::ModTraits;
