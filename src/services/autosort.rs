//! Auto-sort: a deterministic, dependency-respecting re-ordering of the enabled mods.
//!
//! The sort runs in four steps:
//!
//! 1. Close the enabled set over declared dependencies, pulling in catalog mods
//!    that something enabled names in `requires_before` / `requires_after`.
//! 2. Rank every mod by a baseline key (content group, reaction priority,
//!    current position, name).
//! 3. Topologically sort the dependency graph with Kahn's algorithm, always
//!    emitting the available mod with the best baseline rank.
//! 4. If a cycle stalls the sort, fall back to the baseline order so that no
//!    mod is ever dropped.

use super::catalog::Catalog;
use super::classifier::TraitClassifier;
use crate::error::EngineResult;
use crate::models::{ModKey, ModRecord, ModTraits, SortPolicy};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Result of one auto-sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// The new enabled order
    pub order: Vec<ModKey>,

    /// True when `order` differs from the input order
    pub changed: bool,

    /// True when a dependency cycle forced the baseline order
    pub used_fallback: bool,

    /// Mods that were not enabled but got pulled in as dependencies
    pub pulled_in: Vec<ModKey>,
}

/// Content group used as the primary baseline key. Lower groups load first.
///
/// Checks are applied in this order; the first that matches decides.
pub fn sort_group(record: &ModRecord, traits: &ModTraits, policy: &SortPolicy) -> u8 {
    if traits.before_vanilla || policy.is_group_zero_name(record.label()) {
        0
    } else if traits.touches_vanilla_entity {
        0
    } else if traits.adds_new_entity {
        1
    } else if traits.adds_reaction {
        4
    } else if traits.is_graphics_pack {
        2
    } else if traits.adds_new_content {
        5
    } else {
        3
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct BaselineKey {
    group: u8,
    reaction_priority: u32,
    original_index: usize,
    name: String,
    id: String,
}

struct Node<'a> {
    record: &'a ModRecord,
    key: ModKey,
    original_index: Option<usize>,
}

/// Compute a new enabled order for `enabled`.
///
/// # Errors
///
/// [`crate::error::EngineError::NotFound`] if an enabled key is not in the catalog.
pub fn auto_sort(
    catalog: &Catalog,
    enabled: &[ModKey],
    classifier: &TraitClassifier,
    policy: &SortPolicy,
) -> EngineResult<SortOutcome> {
    let (nodes, pulled_in) = dependency_closure(catalog, enabled)?;
    let baseline = baseline_order(nodes, classifier, policy);

    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    for (rank, node) in baseline.iter().enumerate() {
        index_by_id.entry(node.record.id().to_lowercase()).or_insert(rank);
    }

    let mut edges: HashSet<(usize, usize)> = HashSet::new();
    for (rank, node) in baseline.iter().enumerate() {
        for before in node.record.requires_before() {
            if let Some(&from) = index_by_id.get(&before.to_lowercase()) {
                if from != rank {
                    edges.insert((from, rank));
                }
            }
        }
        for after in node.record.requires_after() {
            if let Some(&to) = index_by_id.get(&after.to_lowercase()) {
                if to != rank {
                    edges.insert((rank, to));
                }
            }
        }
    }

    let order = match topological_order(baseline.len(), &edges) {
        Some(ranks) => ranks.into_iter().map(|rank| baseline[rank].key.clone()).collect(),
        None => Vec::new(),
    };

    let used_fallback = order.len() != baseline.len();
    let order: Vec<ModKey> = if used_fallback {
        tracing::warn!(
            "Dependency cycle among {} mods, falling back to baseline order",
            baseline.len()
        );
        baseline.iter().map(|node| node.key.clone()).collect()
    } else {
        order
    };

    let changed = order.as_slice() != enabled;
    tracing::info!(
        "Auto-sort: {} mods ({} pulled in), changed={}, fallback={}",
        order.len(),
        pulled_in.len(),
        changed,
        used_fallback
    );

    Ok(SortOutcome {
        order,
        changed,
        used_fallback,
        pulled_in,
    })
}

/// Enabled mods plus everything reachable through their ordering declarations.
fn dependency_closure<'a>(
    catalog: &'a Catalog,
    enabled: &[ModKey],
) -> EngineResult<(Vec<Node<'a>>, Vec<ModKey>)> {
    let mut nodes: Vec<Node<'a>> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_keys: HashSet<ModKey> = HashSet::new();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut pulled_in = Vec::new();

    for (index, key) in enabled.iter().enumerate() {
        if !seen_keys.insert(key.clone()) {
            continue;
        }
        let record = catalog.lookup(key)?;
        seen_ids.insert(record.id().to_lowercase());
        queue.push_back(nodes.len());
        nodes.push(Node {
            record,
            key: key.clone(),
            original_index: Some(index),
        });
    }

    while let Some(current) = queue.pop_front() {
        let record = nodes[current].record;
        for id in record.requires_before().iter().chain(record.requires_after()) {
            let id = id.to_lowercase();
            if seen_ids.contains(&id) {
                continue;
            }
            // unknown ids are the detector's business, not the sorter's
            let Some(dependency) = catalog.find_by_id(&id) else {
                continue;
            };
            seen_ids.insert(id);
            let key = dependency.key();
            seen_keys.insert(key.clone());
            tracing::debug!("Pulling {} into the sort for {}", key, record.label());
            pulled_in.push(key.clone());
            queue.push_back(nodes.len());
            nodes.push(Node {
                record: dependency,
                key,
                original_index: None,
            });
        }
    }

    Ok((nodes, pulled_in))
}

fn baseline_order<'a>(
    nodes: Vec<Node<'a>>,
    classifier: &TraitClassifier,
    policy: &SortPolicy,
) -> Vec<Node<'a>> {
    let mut keyed: Vec<(BaselineKey, Node<'a>)> = nodes
        .into_iter()
        .map(|node| {
            let traits = classifier.classify(node.record);
            let group = sort_group(node.record, &traits, policy);
            let reaction_priority = if group == 4 {
                policy.reaction_priority(node.record.display_name(), node.record.id())
            } else {
                0
            };
            let key = BaselineKey {
                group,
                reaction_priority,
                original_index: node.original_index.unwrap_or(usize::MAX),
                name: node.record.label().to_lowercase(),
                id: node.record.id().to_lowercase(),
            };
            (key, node)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, node)| node).collect()
}

/// Kahn's algorithm over nodes `0..len`, preferring the lowest index.
///
/// Returns `None` when a cycle leaves nodes unemitted.
fn topological_order(len: usize, edges: &HashSet<(usize, usize)>) -> Option<Vec<usize>> {
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut in_degree = vec![0usize; len];
    for &(from, to) in edges {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    let mut order = Vec::with_capacity(len);
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    (order.len() == len).then_some(order)
}

/// The vanilla mods in load order, skipping any the catalog does not have.
///
/// Used to seed new packs.
pub fn generate_vanilla_order(catalog: &Catalog, policy: &SortPolicy) -> Vec<ModKey> {
    policy
        .vanilla_modlist
        .iter()
        .filter_map(|id| catalog.find_by_id(id).map(ModRecord::key))
        .collect()
}
