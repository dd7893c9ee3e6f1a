// Engine error types
//
// Only structurally invalid calls surface as errors. Data-quality problems in
// mod content (missing mods, cyclic declarations, unreadable files) are absorbed
// by the engine with a deterministic fallback and never reach this enum.

use crate::models::ModKey;
use thiserror::Error;

/// Errors returned by the mod-list engine for invalid calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Mod {0} is not in the catalog")]
    NotFound(ModKey),

    #[error("Pack index {index} is out of range (pack count: {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Discovery produced no mods; an empty catalog is not usable")]
    EmptyCatalog,

    #[error("Cannot delete the last remaining modpack")]
    LastPack,

    #[error("Pack not found: {0}")]
    PackNotFound(String),
}

/// Result type for engine operations that can only fail with [`EngineError`].
pub type EngineResult<T> = std::result::Result<T, EngineError>;
