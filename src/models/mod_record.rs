use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable identity of a mod: declared id plus version.
///
/// Two keys are equal when both parts match after Unicode lowercasing, the same
/// folding used wherever ids are compared. The original spelling is kept so packs written back to disk look the way DFHack wrote them.
/// Versions are opaque strings; no numeric comparison is ever made.
///
/// On disk a key is a `mod-manager.json` modlist entry:
/// `{"id": "vanilla_text", "version": 5001}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PackEntry", into = "PackEntry")]
pub struct ModKey {
    id: String,
    version: String,
}

impl ModKey {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into().trim().to_string(),
            version: version.into().trim().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

}

impl PartialEq for ModKey {
    fn eq(&self, other: &Self) -> bool {
        self.id.to_lowercase() == other.id.to_lowercase()
            && self.version.to_lowercase() == other.version.to_lowercase()
    }
}

impl Eq for ModKey {}

impl Hash for ModKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // same folding as the id sets in the detector and the catalog
        self.id.to_lowercase().hash(state);
        self.version.to_lowercase().hash(state);
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.id, self.version)
    }
}

/// Version as it appears in JSON: DFHack writes numbers, hand-written files use strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum VersionValue {
    Number(serde_json::Number),
    Text(String),
}

impl VersionValue {
    fn into_string(self) -> String {
        match self {
            VersionValue::Number(n) => n.to_string(),
            VersionValue::Text(s) => s,
        }
    }

    fn from_version(version: &str) -> Self {
        match version.parse::<u64>() {
            Ok(n) if n.to_string() == version => VersionValue::Number(n.into()),
            _ => VersionValue::Text(version.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackEntry {
    id: String,
    version: VersionValue,
}

impl From<PackEntry> for ModKey {
    fn from(entry: PackEntry) -> Self {
        ModKey::new(entry.id, entry.version.into_string())
    }
}

impl From<ModKey> for PackEntry {
    fn from(key: ModKey) -> Self {
        PackEntry {
            version: VersionValue::from_version(&key.version),
            id: key.id,
        }
    }
}

fn deserialize_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(VersionValue::deserialize(deserializer)?.into_string())
}

/// One mod as reported by the discovery feed.
///
/// Field aliases accept the header names produced by the DFHack mod-manager script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(deserialize_with = "deserialize_version")]
    pub version: String,

    #[serde(alias = "src_dir", default)]
    pub path: Utf8PathBuf,

    #[serde(alias = "require_before_me", default)]
    pub requires_before: Vec<String>,

    #[serde(alias = "require_after_me", default)]
    pub requires_after: Vec<String>,

    #[serde(default)]
    pub conflicts_with: Vec<String>,
}

/// Catalog entry describing one discovered mod.
///
/// Records are immutable once built; a changed mod folder means a new catalog.
/// Declaration lists are trimmed, stripped of blanks and de-duplicated
/// case-insensitively, keeping declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRecord {
    id: String,
    display_name: String,
    version: String,
    content_path: Utf8PathBuf,
    requires_before: Vec<String>,
    requires_after: Vec<String>,
    conflicts_with: Vec<String>,
}

impl ModRecord {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        version: impl Into<String>,
        content_path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            id: id.into().trim().to_string(),
            display_name: display_name.into(),
            version: version.into().trim().to_string(),
            content_path: content_path.into(),
            requires_before: Vec::new(),
            requires_after: Vec::new(),
            conflicts_with: Vec::new(),
        }
    }

    pub fn with_requires_before<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.requires_before = normalize_ids(ids);
        self
    }

    pub fn with_requires_after<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.requires_after = normalize_ids(ids);
        self
    }

    pub fn with_conflicts<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.conflicts_with = normalize_ids(ids);
        self
    }

    pub fn key(&self) -> ModKey {
        ModKey::new(self.id.clone(), self.version.clone())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Display name, or the id when the mod has no name.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn content_path(&self) -> &Utf8Path {
        &self.content_path
    }

    pub fn requires_before(&self) -> &[String] {
        &self.requires_before
    }

    pub fn requires_after(&self) -> &[String] {
        &self.requires_after
    }

    pub fn conflicts_with(&self) -> &[String] {
        &self.conflicts_with
    }

    /// True when the mod declares any ordering or conflict constraint.
    ///
    /// Only such mods are scanned as problem sources.
    pub fn has_ordering_declarations(&self) -> bool {
        !self.requires_before.is_empty()
            || !self.requires_after.is_empty()
            || !self.conflicts_with.is_empty()
    }
}

impl From<DiscoveryEntry> for ModRecord {
    fn from(entry: DiscoveryEntry) -> Self {
        ModRecord::new(entry.id, entry.name, entry.version, entry.path)
            .with_requires_before(entry.requires_before)
            .with_requires_after(entry.requires_after)
            .with_conflicts(entry.conflicts_with)
    }
}

fn normalize_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        let id = id.as_ref().trim();
        if id.is_empty() || out.iter().any(|existing| existing.to_lowercase() == id.to_lowercase()) {
            continue;
        }
        out.push(id.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mod_key_case_insensitive_identity() {
        let a = ModKey::new("Vanilla_Text", "5001");
        let b = ModKey::new("vanilla_text ", "5001");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_mod_key_folds_non_ascii_letters() {
        let a = ModKey::new("Épée", "1");
        let b = ModKey::new("épée", "1");
        assert_eq!(a, b);

        let set: HashSet<ModKey> = [a].into_iter().collect();
        assert!(set.contains(&b));
    }

    #[test]
    fn test_mod_key_versions_are_distinct() {
        let a = ModKey::new("better_instruments", "1");
        let b = ModKey::new("better_instruments", "01");
        assert_ne!(a, b);
    }

    #[test]
    fn test_mod_key_json_numeric_version() {
        let key: ModKey = serde_json::from_str(r#"{"id":"foo","version":1}"#).unwrap();
        assert_eq!(key.version(), "1");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"{"id":"foo","version":1}"#);

        let key: ModKey = serde_json::from_str(r#"{"id":"foo","version":"1.2b"}"#).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"{"id":"foo","version":"1.2b"}"#);
    }

    #[test]
    fn test_record_normalizes_declarations() {
        let record = ModRecord::new("a", "A", "1", "/mods/a")
            .with_requires_before(["b", " B ", "", "c"])
            .with_conflicts(Vec::<String>::new());

        assert_eq!(record.requires_before(), &["b".to_string(), "c".to_string()]);
        assert!(record.has_ordering_declarations());

        let plain = ModRecord::new("x", "", "1", "/mods/x");
        assert!(!plain.has_ordering_declarations());
        assert_eq!(plain.label(), "x");
    }

    #[test]
    fn test_discovery_entry_aliases() {
        let json = r#"{
            "id": "more_reactions",
            "name": "More Reactions",
            "version": 3,
            "src_dir": "mods/more_reactions",
            "require_before_me": ["vanilla_reactions"]
        }"#;
        let entry: DiscoveryEntry = serde_json::from_str(json).unwrap();
        let record = ModRecord::from(entry);

        assert_eq!(record.version(), "3");
        assert_eq!(record.content_path(), Utf8Path::new("mods/more_reactions"));
        assert_eq!(record.requires_before(), &["vanilla_reactions".to_string()]);
        assert!(record.requires_after().is_empty());
    }
}
