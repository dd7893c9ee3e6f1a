//! Discovery feed adapters.
//!
//! Finding mods on disk or inside the running game is not the engine's job. The
//! engine only consumes a list of [`DiscoveryEntry`] values through the
//! [`DiscoverySource`] trait; this module provides the JSON file feed used by the
//! command line and an in-memory source.

use crate::models::DiscoveryEntry;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Supplies the mods known to this session.
pub trait DiscoverySource {
    fn discover(&self) -> Result<Vec<DiscoveryEntry>>;
}

impl DiscoverySource for Vec<DiscoveryEntry> {
    fn discover(&self) -> Result<Vec<DiscoveryEntry>> {
        Ok(self.clone())
    }
}

/// A JSON array of discovery entries on disk.
///
/// Relative content paths are resolved against `content_root` when one is set
/// (DFHack reports `src_dir` relative to the DF folder).
#[derive(Debug, Clone)]
pub struct JsonDiscoveryFeed {
    path: Utf8PathBuf,
    content_root: Option<Utf8PathBuf>,
}

impl JsonDiscoveryFeed {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            content_root: None,
        }
    }

    pub fn with_content_root<P: AsRef<Utf8Path>>(mut self, root: P) -> Self {
        self.content_root = Some(root.as_ref().to_path_buf());
        self
    }
}

impl DiscoverySource for JsonDiscoveryFeed {
    fn discover(&self) -> Result<Vec<DiscoveryEntry>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read discovery feed: {}", self.path))?;

        let mut entries: Vec<DiscoveryEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse discovery feed: {}", self.path))?;

        if let Some(root) = &self.content_root {
            for entry in &mut entries {
                if entry.path.is_relative() {
                    entry.path = root.join(&entry.path);
                }
            }
        }

        tracing::info!("Discovery feed {} lists {} mods", self.path, entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_feed_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let feed_path = dir.join("mods.json");
        fs::write(
            &feed_path,
            r#"[
                {"id": "a", "name": "A", "version": 1, "src_dir": "mods/a"},
                {"id": "b", "name": "B", "version": "2", "path": "/abs/b"}
            ]"#,
        )
        .unwrap();

        let entries = JsonDiscoveryFeed::new(&feed_path)
            .with_content_root("/df")
            .discover()
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, Utf8PathBuf::from("/df/mods/a"));
        assert_eq!(entries[1].path, Utf8PathBuf::from("/abs/b"));
    }

    #[test]
    fn test_missing_feed_is_an_error() {
        let feed = JsonDiscoveryFeed::new("/definitely/not/here.json");
        assert!(feed.discover().is_err());
    }
}
