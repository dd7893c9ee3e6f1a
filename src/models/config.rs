use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// User configuration from `ModHearth Config.yaml`
///
/// Contains install paths, UI preferences and the auto-sort policy tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "ModHearth", default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to `Dwarf Fortress.exe`
    #[serde(default)]
    pub df_exe_path: Option<Utf8PathBuf>,

    /// Path to DF's installed mods cache (`data/installed_mods`)
    #[serde(default)]
    pub installed_mods_path: Option<Utf8PathBuf>,

    /// 0 = light, anything else = dark. Stored for the front end only.
    #[serde(default)]
    pub theme: u32,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub sort_policy: SortPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            df_exe_path: None,
            installed_mods_path: None,
            theme: 0,
            log_dir: default_log_dir(),
            debug_mode: false,
            json_logs: false,
            sort_policy: SortPolicy::default(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Settings {
    /// Folder containing the DF executable.
    pub fn df_folder(&self) -> Option<Utf8PathBuf> {
        self.df_exe_path
            .as_ref()
            .and_then(|exe| exe.parent())
            .map(|p| p.to_path_buf())
    }

    /// The user `Mods` folder inside the DF install.
    pub fn mods_path(&self) -> Option<Utf8PathBuf> {
        self.df_folder().map(|dir| dir.join("Mods"))
    }

    /// DFHack's modpack file inside the DF install.
    pub fn mod_manager_path(&self) -> Option<Utf8PathBuf> {
        self.df_folder().map(|dir| mod_manager_path_in(&dir))
    }

    /// Configured installed-mods cache, else DF's default under `%APPDATA%`.
    pub fn installed_mods_dir(&self) -> Option<Utf8PathBuf> {
        match &self.installed_mods_path {
            Some(path) if !path.as_str().trim().is_empty() => Some(path.clone()),
            _ => std::env::var("APPDATA").ok().map(|appdata| {
                Utf8PathBuf::from(appdata)
                    .join("Bay 12 Games")
                    .join("Dwarf Fortress")
                    .join("data")
                    .join("installed_mods")
            }),
        }
    }
}

/// `dfhack-config/mod-manager.json` under a DF folder.
pub fn mod_manager_path_in(df_folder: &camino::Utf8Path) -> Utf8PathBuf {
    df_folder.join("dfhack-config").join("mod-manager.json")
}

/// Heuristic tables used by the trait classifier and the auto-sort baseline.
///
/// All matching against these lists is case-insensitive substring matching,
/// except `vanilla_entities` which is compared against whole entity ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortPolicy {
    /// Marker in `info.txt` that pins a mod ahead of vanilla content
    pub before_vanilla_marker: String,

    /// `info.txt` terms that identify a graphics pack
    pub graphics_terms: Vec<String>,

    /// Base-game entity ids; `[ENTITY:x]` with x on this list touches vanilla
    pub vanilla_entities: Vec<String>,

    /// Name fragments that always sort into group 0
    pub group_zero_names: Vec<String>,

    /// Name/id fragment -> priority inside the reaction group (lower first)
    pub reaction_priorities: IndexMap<String, u32>,

    /// Priority given to reaction mods not listed above
    pub default_reaction_priority: u32,

    /// Vanilla mod ids in load order, used to seed new packs
    pub vanilla_modlist: Vec<String>,
}

impl Default for SortPolicy {
    fn default() -> Self {
        let mut reaction_priorities = IndexMap::new();
        reaction_priorities.insert("set production".to_string(), 0);
        reaction_priorities.insert("smelt ore by product".to_string(), 1);
        reaction_priorities.insert("stone beds".to_string(), 2);
        reaction_priorities.insert("stoneworking expanded".to_string(), 2);
        reaction_priorities.insert("specific decoration".to_string(), 3);
        reaction_priorities.insert("fermented milk".to_string(), 4);

        Self {
            before_vanilla_marker: "before vanilla".to_string(),
            graphics_terms: [
                "graphics",
                "tileset",
                "tile set",
                "portrait",
                "sprite",
                "landscape",
                "stone variation",
                "rounded hills",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            vanilla_entities: ["DWARF", "ELF", "HUMAN", "GOBLIN", "KOBOLD"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            group_zero_names: vec!["better instruments".to_string()],
            reaction_priorities,
            default_reaction_priority: 100,
            vanilla_modlist: [
                "vanilla_text",
                "vanilla_languages",
                "vanilla_descriptors",
                "vanilla_materials",
                "vanilla_environment",
                "vanilla_plants",
                "vanilla_items",
                "vanilla_buildings",
                "vanilla_bodies",
                "vanilla_creatures",
                "vanilla_entities",
                "vanilla_reactions",
                "vanilla_interactions",
                "vanilla_descriptors_graphics",
                "vanilla_plants_graphics",
                "vanilla_items_graphics",
                "vanilla_buildings_graphics",
                "vanilla_creatures_graphics",
                "vanilla_world_map",
                "vanilla_interface",
                "vanilla_music",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl SortPolicy {
    pub fn is_vanilla_entity(&self, entity: &str) -> bool {
        let entity = entity.trim();
        self.vanilla_entities
            .iter()
            .any(|v| v.eq_ignore_ascii_case(entity))
    }

    /// Priority of a reaction mod from its name and id; first listed match wins.
    pub fn reaction_priority(&self, name: &str, id: &str) -> u32 {
        let label = format!("{} {}", name, id).to_lowercase();
        self.reaction_priorities
            .iter()
            .find(|(fragment, _)| label.contains(&fragment.to_lowercase()))
            .map(|(_, priority)| *priority)
            .unwrap_or(self.default_reaction_priority)
    }

    pub fn is_group_zero_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.group_zero_names
            .iter()
            .any(|fragment| name.contains(&fragment.to_lowercase()))
    }
}
