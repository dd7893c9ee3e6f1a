//! Services module - the mod-list engine and its collaborators.
//!
//! Everything here is synchronous and framework-agnostic; the session layer in
//! [`crate::state`] decides when to call what.
//!
//! # Components
//!
//! - [`Catalog`]: registry of discovered mods, built once per session
//! - [`detect_problems`]: one-pass ordering and conflict check of an enabled order
//! - [`TraitClassifier`]: cached content heuristics read from mod folders
//! - [`auto_sort`]: closure, baseline ranking and topological sort of the enabled order
//! - [`DiscoverySource`] / [`JsonDiscoveryFeed`]: where mod metadata comes from
//! - [`ModpackStore`] / [`JsonModpackStore`]: where modpacks are loaded from and saved to
//!
//! # Usage Example
//!
//! ```ignore
//! use modhearth::services::{auto_sort, detect_problems, Catalog, JsonDiscoveryFeed, TraitClassifier};
//!
//! let catalog = Catalog::build(&JsonDiscoveryFeed::new("mods.json"))?;
//! let classifier = TraitClassifier::new(policy.clone());
//!
//! let problems = detect_problems(&catalog, &enabled)?;
//! let outcome = auto_sort(&catalog, &enabled, &classifier, &policy)?;
//! ```

pub mod autosort;
pub mod catalog;
pub mod classifier;
pub mod discovery;
pub mod pack_store;
pub mod problems;

pub use autosort::{auto_sort, generate_vanilla_order, sort_group, SortOutcome};
pub use catalog::Catalog;
pub use classifier::TraitClassifier;
pub use discovery::{DiscoverySource, JsonDiscoveryFeed};
pub use pack_store::{export_pack, import_pack, JsonModpackStore, ModpackStore};
pub use problems::{detect_problems, problem_sources};
