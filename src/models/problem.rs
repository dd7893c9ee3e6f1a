use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of ordering or compatibility violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    MissingBefore,
    MissingAfter,
    ConflictPresent,
}

/// A single violation raised by `source_mod_id` about `referenced_mod_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModProblem {
    pub source_mod_id: String,
    pub referenced_mod_id: String,
    pub kind: ProblemKind,
}

impl ModProblem {
    pub fn new(
        source_mod_id: impl Into<String>,
        referenced_mod_id: impl Into<String>,
        kind: ProblemKind,
    ) -> Self {
        Self {
            source_mod_id: source_mod_id.into(),
            referenced_mod_id: referenced_mod_id.into(),
            kind,
        }
    }
}

impl fmt::Display for ModProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ProblemKind::MissingBefore => write!(
                f,
                "Mod '{}' requires mod '{}' to be loaded before it.",
                self.source_mod_id, self.referenced_mod_id
            ),
            ProblemKind::MissingAfter => write!(
                f,
                "Mod '{}' requires mod '{}' to be loaded after it.",
                self.source_mod_id, self.referenced_mod_id
            ),
            ProblemKind::ConflictPresent => write!(
                f,
                "Mod '{}' is incompatible with mod '{}'.",
                self.source_mod_id, self.referenced_mod_id
            ),
        }
    }
}
