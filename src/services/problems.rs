//! Problem detection over an enabled load order.
//!
//! The detector does a mock load from first to last, tracking which ids have
//! already "loaded" (`scanned`) and which are still to come (`unscanned`):
//!
//! - `requires_before` id not yet scanned -> [`ProblemKind::MissingBefore`]
//!   (absent, or present but ordered later)
//! - `requires_after` id in neither set -> [`ProblemKind::MissingAfter`]
//!   (only absence is flagged; an after-dependency that loads earlier is accepted)
//! - `conflicts_with` id anywhere in the enabled list -> [`ProblemKind::ConflictPresent`]
//!
//! Membership is enabled-set membership: a disabled mod counts as missing.
//! Output is in scan order, grouped by the mod that raised each problem.

use super::catalog::Catalog;
use crate::error::EngineResult;
use crate::models::{ModKey, ModProblem, ProblemKind};
use std::collections::HashSet;

/// Scan `enabled` and return every ordering or conflict violation.
///
/// # Errors
///
/// [`crate::error::EngineError::NotFound`] if an enabled key is not in the catalog.
pub fn detect_problems(catalog: &Catalog, enabled: &[ModKey]) -> EngineResult<Vec<ModProblem>> {
    let mut problems = Vec::new();
    let mut scanned: HashSet<String> = HashSet::new();
    let mut unscanned: HashSet<String> = enabled.iter().map(|k| k.id().to_lowercase()).collect();

    for key in enabled {
        let record = catalog.lookup(key)?;

        if record.has_ordering_declarations() {
            for before in record.requires_before() {
                if !scanned.contains(&before.to_lowercase()) {
                    problems.push(ModProblem::new(key.id(), before, ProblemKind::MissingBefore));
                }
            }
            for after in record.requires_after() {
                let after_id = after.to_lowercase();
                if !unscanned.contains(&after_id) && !scanned.contains(&after_id) {
                    problems.push(ModProblem::new(key.id(), after, ProblemKind::MissingAfter));
                }
            }
            for conflict in record.conflicts_with() {
                let conflict_id = conflict.to_lowercase();
                if scanned.contains(&conflict_id) || unscanned.contains(&conflict_id) {
                    problems.push(ModProblem::new(key.id(), conflict, ProblemKind::ConflictPresent));
                }
            }
        }

        let id = key.id().to_lowercase();
        unscanned.remove(&id);
        scanned.insert(id);
    }

    tracing::debug!(
        "Problem scan over {} enabled mods found {} problems",
        enabled.len(),
        problems.len()
    );
    Ok(problems)
}

/// Enabled mods that raised at least one problem, in load order.
pub fn problem_sources(enabled: &[ModKey], problems: &[ModProblem]) -> Vec<ModKey> {
    let sources: HashSet<String> = problems
        .iter()
        .map(|p| p.source_mod_id.to_lowercase())
        .collect();
    enabled
        .iter()
        .filter(|k| sources.contains(&k.id().to_lowercase()))
        .cloned()
        .collect()
}
