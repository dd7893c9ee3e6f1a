use super::ModKey;
use serde::{Deserialize, Serialize};

/// A named, ordered modlist as stored in DFHack's `mod-manager.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModPack {
    #[serde(rename = "default", default)]
    pub is_default: bool,

    #[serde(rename = "modlist", default)]
    pub order: Vec<ModKey>,

    pub name: String,
}

impl ModPack {
    pub fn new(name: impl Into<String>, is_default: bool, order: Vec<ModKey>) -> Self {
        Self {
            is_default,
            order,
            name: name.into(),
        }
    }

    /// Pack names are matched case-insensitively.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Find a pack index by name (case-insensitive, first match wins).
pub fn find_pack(packs: &[ModPack], name: &str) -> Option<usize> {
    packs.iter().position(|p| p.has_name(name))
}

/// Make `index` the only default pack.
///
/// Returns false (and leaves the packs untouched) when `index` is out of range.
pub fn mark_default(packs: &mut [ModPack], index: usize) -> bool {
    if index >= packs.len() {
        return false;
    }
    for (i, pack) in packs.iter_mut().enumerate() {
        pack.is_default = i == index;
    }
    true
}
