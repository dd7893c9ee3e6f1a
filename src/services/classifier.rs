//! Trait classifier: guesses what kind of content a mod adds.
//!
//! Classification reads `info.txt` and walks the mod's raw files looking for
//! definition tags. The result only steers the auto-sort baseline, so every
//! read error is swallowed and the mod simply keeps fewer flags.

use crate::metrics::Metrics;
use crate::models::{ModRecord, ModTraits, SortPolicy};
use camino::Utf8Path;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use walkdir::WalkDir;

const INFO_FILE: &str = "info.txt";
const NEW_CONTENT_TAGS: [&str; 3] = ["[INORGANIC:", "[PLANT:", "[ITEM_"];

/// Memoizing classifier over a [`SortPolicy`].
///
/// Results are cached by lower-cased mod id until [`clear_cache`](Self::clear_cache).
pub struct TraitClassifier {
    policy: SortPolicy,
    entity_regex: Regex,
    cache: Mutex<HashMap<String, ModTraits>>,
    metrics: Option<Arc<Metrics>>,
}

impl TraitClassifier {
    pub fn new(policy: SortPolicy) -> Self {
        Self {
            policy,
            entity_regex: Regex::new(r"(?i)\[ENTITY:([^\]]+)\]").expect("Invalid entity regex"),
            cache: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Count cache hits and misses in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &SortPolicy {
        &self.policy
    }

    /// Traits for `record`, computed on first request.
    pub fn classify(&self, record: &ModRecord) -> ModTraits {
        let cache_key = record.id().to_lowercase();

        if let Some(traits) = self.lock_cache().get(&cache_key) {
            if let Some(metrics) = &self.metrics {
                metrics.record_classifier_hit();
            }
            return *traits;
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_classifier_miss();
        }
        let traits = self.scan(record);
        tracing::debug!("Classified {}: {:?}", record.label(), traits);

        self.lock_cache().insert(cache_key, traits);
        traits
    }

    /// Forget every cached result, e.g. after a rescan.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, ModTraits>> {
        // a panic mid-insert cannot leave the map half-written
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scan(&self, record: &ModRecord) -> ModTraits {
        let root = record.content_path();
        let mut traits = ModTraits::default();

        self.scan_info(root, &mut traits);

        if root.join("graphics").is_dir() || root.join("raw").join("graphics").is_dir() {
            traits.is_graphics_pack = true;
        }

        if root.is_dir() {
            self.scan_raws(root, &mut traits);
        }

        if traits.adds_creature {
            traits.adds_new_content = true;
        }
        traits
    }

    fn scan_info(&self, root: &Utf8Path, traits: &mut ModTraits) {
        let info_path = root.join(INFO_FILE);
        let contents = match fs::read_to_string(&info_path) {
            Ok(contents) => contents.to_lowercase(),
            Err(e) => {
                tracing::debug!("No readable {}: {}", info_path, e);
                return;
            }
        };

        if contents.contains(&self.policy.before_vanilla_marker.to_lowercase()) {
            traits.before_vanilla = true;
        }
        if self
            .policy
            .graphics_terms
            .iter()
            .any(|term| contents.contains(&term.to_lowercase()))
        {
            traits.is_graphics_pack = true;
        }
    }

    fn scan_raws(&self, root: &Utf8Path, traits: &mut ModTraits) {
        for entry in WalkDir::new(root).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {}: {}", root, e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_txt(entry.path()) {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let mut in_graphics = false;
            let mut in_raw = false;
            if let Some(parent) = relative.parent() {
                for component in parent.components() {
                    let name = component.as_os_str().to_string_lossy();
                    in_graphics |= name.eq_ignore_ascii_case("graphics");
                    in_raw |= name.eq_ignore_ascii_case("raw");
                }
            }

            if in_graphics {
                traits.is_graphics_pack = true;
            }
            if in_raw {
                match fs::read_to_string(entry.path()) {
                    Ok(contents) => self.scan_raw_text(&contents, traits),
                    Err(e) => tracing::debug!("Failed to read {}: {}", entry.path().display(), e),
                }
            }

            if traits.fully_determined() {
                break;
            }
        }
    }

    fn scan_raw_text(&self, contents: &str, traits: &mut ModTraits) {
        let upper = contents.to_uppercase();

        if upper.contains("[REACTION:") {
            traits.adds_reaction = true;
        }
        if upper.contains("[CREATURE:") {
            traits.adds_creature = true;
        }
        if NEW_CONTENT_TAGS.iter().any(|tag| upper.contains(tag)) {
            traits.adds_new_content = true;
        }

        for caps in self.entity_regex.captures_iter(contents) {
            let entity = caps[1].trim();
            if entity.is_empty() {
                continue;
            }
            if self.policy.is_vanilla_entity(entity) {
                traits.touches_vanilla_entity = true;
            } else {
                traits.adds_new_entity = true;
            }
        }
    }
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn mod_dir(temp_dir: &TempDir, id: &str) -> Utf8PathBuf {
        let dir = Utf8PathBuf::try_from(temp_dir.path().join(id)).unwrap();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(path: Utf8PathBuf, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_info_markers() {
        let temp_dir = TempDir::new().unwrap();
        let dir = mod_dir(&temp_dir, "pinned");
        write(
            dir.join("info.txt"),
            "[NAME:Pinned]\n[DESCRIPTION:Load Before Vanilla. Adds a new Tileset.]",
        );

        let classifier = TraitClassifier::new(SortPolicy::default());
        let traits = classifier.classify(&ModRecord::new("pinned", "Pinned", "1", dir));

        assert!(traits.before_vanilla);
        assert!(traits.is_graphics_pack);
        assert!(!traits.adds_reaction);
    }

    #[test]
    fn test_raw_tags() {
        let temp_dir = TempDir::new().unwrap();
        let dir = mod_dir(&temp_dir, "content");
        write(dir.join("raw/objects/reaction_x.txt"), "[REACTION:MAKE_THING]");
        write(dir.join("raw/objects/creature_x.txt"), "[creature:WOLF_THING]");
        write(
            dir.join("raw/objects/entity_x.txt"),
            "[ENTITY:dwarf]\n[ENTITY:GNOME]",
        );
        // outside raw: ignored
        write(dir.join("notes/readme.txt"), "[PLANT:NOT_COUNTED]");

        let classifier = TraitClassifier::new(SortPolicy::default());
        let traits = classifier.classify(&ModRecord::new("content", "", "1", dir));

        assert!(traits.adds_reaction);
        assert!(traits.adds_creature);
        assert!(traits.adds_new_content, "creatures imply new content");
        assert!(traits.touches_vanilla_entity);
        assert!(traits.adds_new_entity);
        assert!(!traits.is_graphics_pack);
    }

    #[test]
    fn test_blank_entity_tag_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let dir = mod_dir(&temp_dir, "blank");
        write(dir.join("raw/objects/entity_blank.txt"), "[ENTITY: ]");

        let classifier = TraitClassifier::new(SortPolicy::default());
        let traits = classifier.classify(&ModRecord::new("blank", "", "1", dir));

        assert!(!traits.adds_new_entity);
        assert!(!traits.touches_vanilla_entity);
    }

    #[test]
    fn test_graphics_folder() {
        let temp_dir = TempDir::new().unwrap();
        let dir = mod_dir(&temp_dir, "gfx");
        write(dir.join("raw/graphics/graphics_creatures.txt"), "[TILE_PAGE:X]");

        let classifier = TraitClassifier::new(SortPolicy::default());
        assert!(classifier.classify(&ModRecord::new("gfx", "", "1", dir)).is_graphics_pack);
    }

    #[test]
    fn test_missing_folder_yields_default_traits() {
        let classifier = TraitClassifier::new(SortPolicy::default());
        let traits = classifier.classify(&ModRecord::new("ghost", "", "1", "/no/such/mod"));
        assert_eq!(traits, ModTraits::default());
    }

    #[test]
    fn test_results_are_cached_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let dir = mod_dir(&temp_dir, "cached");
        let metrics = Arc::new(Metrics::new());
        let classifier = TraitClassifier::new(SortPolicy::default()).with_metrics(metrics.clone());
        let record = ModRecord::new("Cached", "", "1", dir.clone());

        let first = classifier.classify(&record);
        write(dir.join("raw/objects/reaction.txt"), "[REACTION:LATE]");
        let second = classifier.classify(&ModRecord::new("cached", "", "2", dir));

        assert_eq!(first, second);
        assert_eq!(classifier.cached_len(), 1);
        assert_eq!(metrics.snapshot().classifier_hits, 1);
        assert_eq!(metrics.snapshot().classifier_misses, 1);

        classifier.clear_cache();
        assert!(classifier.classify(&record).adds_reaction);
    }
}
