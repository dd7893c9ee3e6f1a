// ModHearth - mod-list ordering and conflict engine for Dwarf Fortress modpacks
//
// This is the library crate containing the engine, its data model and the
// session state. The binary crate (main.rs) provides the command line front end.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::{EngineError, EngineResult};
pub use models::{AppState, ModKey, ModPack, ModProblem, ModRecord, ProblemKind, SortPolicy, UserConfig};
pub use services::{auto_sort, detect_problems, Catalog, SortOutcome, TraitClassifier};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
