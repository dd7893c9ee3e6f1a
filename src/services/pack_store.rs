//! Modpack persistence.
//!
//! The engine treats the pack collection as a single value that is loaded and
//! saved whole. [`JsonModpackStore`] targets DFHack's `mod-manager.json`.

use crate::models::ModPack;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Whole-collection load/save of modpacks.
pub trait ModpackStore {
    fn load(&self) -> Result<Vec<ModPack>>;
    fn save(&self, packs: &[ModPack]) -> Result<()>;
}

/// `mod-manager.json` on disk: a pretty-printed JSON array of packs.
#[derive(Debug, Clone)]
pub struct JsonModpackStore {
    path: Utf8PathBuf,
}

impl JsonModpackStore {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl ModpackStore for JsonModpackStore {
    fn load(&self) -> Result<Vec<ModPack>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read modpacks: {}", self.path))?;

        // DFHack writes `null` for an empty collection
        let packs: Option<Vec<ModPack>> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse modpacks: {}", self.path))?;
        let packs = packs.unwrap_or_default();

        tracing::info!("Loaded {} modpacks from {}", packs.len(), self.path);
        Ok(packs)
    }

    fn save(&self, packs: &[ModPack]) -> Result<()> {
        let json =
            serde_json::to_string_pretty(packs).context("Failed to serialize modpacks to JSON")?;
        write_atomic(&self.path, &json)?;

        tracing::info!("Saved {} modpacks to {}", packs.len(), self.path);
        Ok(())
    }
}

/// Write one pack to a standalone JSON file.
pub fn export_pack(path: &Utf8Path, pack: &ModPack) -> Result<()> {
    let json = serde_json::to_string_pretty(pack).context("Failed to serialize modpack to JSON")?;
    write_atomic(path, &json)?;
    tracing::info!("Exported pack '{}' to {}", pack.name, path);
    Ok(())
}

/// Read one pack from a standalone JSON file.
pub fn import_pack(path: &Utf8Path) -> Result<ModPack> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read modpack file: {}", path))?;
    let pack: ModPack = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid modpack file: {}", path))?;
    Ok(pack)
}

/// Write through a sibling temp file and rename over the target.
fn write_atomic(path: &Utf8Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent))?;
        }
    }

    let tmp_path = Utf8PathBuf::from(format!("{}.tmp", path));
    fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write temp file: {}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace {}", path))?;
    Ok(())
}
