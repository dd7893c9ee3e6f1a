//! Command implementations.
//!
//! Commands write their normal output to the supplied writer so tests can
//! capture it; failures come back as [`CliError`], which carries the exit code.

use super::{Cli, Command, EngineArgs, GlobalOptions};
use crate::config::ConfigManager;
use crate::models::{find_pack, mark_default, mod_manager_path_in, ModPack, SortPolicy};
use crate::services::{export_pack, import_pack, Catalog, JsonDiscoveryFeed, JsonModpackStore, ModpackStore};
use crate::state::StateManager;
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use thiserror::Error;

/// Environment variable carrying a CI build number
pub const BUILD_NUMBER_VAR: &str = "GITHUB_RUN_NUMBER";

/// Errors that end a command, each mapped to a process exit code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Load(String),

    #[error("Pack not found: {0}")]
    PackNotFound(String),

    #[error("{0}")]
    Save(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Load(_) => 3,
            CliError::PackNotFound(_) => 4,
            CliError::Save(_) => 5,
            CliError::Output(_) => 1,
        }
    }

    fn load(e: anyhow::Error) -> Self {
        CliError::Load(format!("{:#}", e))
    }

    fn save(e: anyhow::Error) -> Self {
        CliError::Save(format!("{:#}", e))
    }
}

/// Supplies the version string printed by `version`.
pub trait VersionProvider {
    fn version(&self) -> String;
}

/// Crate version, or the CI build number when one is set.
#[derive(Debug, Clone, Default)]
pub struct BuildVersion {
    build_number: Option<String>,
}

impl BuildVersion {
    pub fn new(build_number: Option<String>) -> Self {
        Self { build_number }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(BUILD_NUMBER_VAR).ok())
    }
}

impl VersionProvider for BuildVersion {
    fn version(&self) -> String {
        match &self.build_number {
            Some(number) if !number.trim().is_empty() => number.trim().to_string(),
            _ => crate::VERSION
                .split('+')
                .next()
                .unwrap_or(crate::VERSION)
                .to_string(),
        }
    }
}

/// Run the parsed command line.
pub fn execute<W: Write>(
    cli: &Cli,
    version: &dyn VersionProvider,
    out: &mut W,
) -> Result<(), CliError> {
    match &cli.command {
        Command::Version => {
            writeln!(out, "ModHearth CLI {}", version.version())?;
            Ok(())
        }
        Command::ListPacks => list_packs(&cli.global, out),
        Command::ListMods { pack } => list_mods(&cli.global, pack, out),
        Command::SetDefault { pack } => set_default(&cli.global, pack, out),
        Command::Problems(engine) => problems(&cli.global, engine, out),
        Command::Sort { engine, write } => sort(&cli.global, engine, *write, out),
        Command::Export { pack, output } => export(&cli.global, pack, output, out),
        Command::Import { input } => import(&cli.global, input, out),
    }
}

fn list_packs<W: Write>(global: &GlobalOptions, out: &mut W) -> Result<(), CliError> {
    let (_, packs) = load_packs(global)?;

    for pack in &packs {
        let prefix = if pack.is_default { "*" } else { " " };
        writeln!(out, "{} {} [{}]", prefix, pack.name, pack.order.len())?;
    }
    Ok(())
}

fn list_mods<W: Write>(global: &GlobalOptions, name: &str, out: &mut W) -> Result<(), CliError> {
    let (_, packs) = load_packs(global)?;
    let pack = &packs[pack_index(&packs, name)?];

    if pack.order.is_empty() {
        writeln!(out, "(empty)")?;
        return Ok(());
    }
    for key in &pack.order {
        writeln!(out, "{}", key)?;
    }
    Ok(())
}

fn set_default<W: Write>(global: &GlobalOptions, name: &str, out: &mut W) -> Result<(), CliError> {
    let (store, mut packs) = load_packs(global)?;
    let index = pack_index(&packs, name)?;

    mark_default(&mut packs, index);
    store.save(&packs).map_err(CliError::save)?;

    writeln!(out, "Default pack set to: {}", packs[index].name)?;
    Ok(())
}

fn problems<W: Write>(global: &GlobalOptions, engine: &EngineArgs, out: &mut W) -> Result<(), CliError> {
    let session = Session::open(global, engine)?;
    report_dropped(&session.manager, out)?;

    let problems = session.manager.problems();
    if problems.is_empty() {
        writeln!(out, "No problems found.")?;
    }
    for problem in &problems {
        writeln!(out, "{}", problem)?;
    }
    session.manager.metrics().log_summary();
    Ok(())
}

fn sort<W: Write>(
    global: &GlobalOptions,
    engine: &EngineArgs,
    write: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let session = Session::open(global, engine)?;
    report_dropped(&session.manager, out)?;

    let outcome = session
        .manager
        .auto_sort()
        .map_err(|e| CliError::Load(e.to_string()))?;

    for key in &outcome.order {
        writeln!(out, "{}", key)?;
    }
    for key in &outcome.pulled_in {
        writeln!(out, "Added dependency: {}", key)?;
    }
    if outcome.used_fallback {
        writeln!(out, "Dependency cycle detected; kept the baseline order.")?;
    }
    if !outcome.changed {
        writeln!(out, "Order unchanged.")?;
    }

    let remaining = session.manager.problems().len();
    if remaining > 0 {
        writeln!(out, "{} problem(s) remain after sorting.", remaining)?;
    }

    if write {
        session
            .manager
            .save_current_pack()
            .map_err(|e| CliError::Save(e.to_string()))?;
        session
            .store
            .save(&session.manager.packs())
            .map_err(CliError::save)?;
        let name = session
            .manager
            .selected_pack()
            .map(|p| p.name)
            .unwrap_or_default();
        writeln!(out, "Saved pack: {}", name)?;
    }
    session.manager.metrics().log_summary();
    Ok(())
}

fn export<W: Write>(
    global: &GlobalOptions,
    name: &str,
    output: &Utf8Path,
    out: &mut W,
) -> Result<(), CliError> {
    let (_, packs) = load_packs(global)?;
    let pack = &packs[pack_index(&packs, name)?];

    export_pack(output, pack).map_err(CliError::save)?;
    writeln!(out, "Exported {} to {}", pack.name, output)?;
    Ok(())
}

fn import<W: Write>(global: &GlobalOptions, input: &Utf8Path, out: &mut W) -> Result<(), CliError> {
    let (store, mut packs) = load_packs(global)?;
    let imported = import_pack(input).map_err(CliError::load)?;

    let verb = match find_pack(&packs, &imported.name) {
        Some(index) => {
            packs[index].order = imported.order;
            "Replaced"
        }
        None => {
            packs.push(ModPack::new(imported.name.clone(), false, imported.order));
            "Added"
        }
    };
    store.save(&packs).map_err(CliError::save)?;

    writeln!(out, "{} pack: {}", verb, imported.name)?;
    Ok(())
}

/// A state manager over one loaded pack collection, for the engine commands.
struct Session {
    store: JsonModpackStore,
    manager: StateManager,
}

impl Session {
    fn open(global: &GlobalOptions, engine: &EngineArgs) -> Result<Self, CliError> {
        let (store, packs) = load_packs(global)?;
        let policy = load_policy(global)?;

        let mut feed = JsonDiscoveryFeed::new(&engine.discovery);
        if let Some(df_folder) = df_folder_of(store.path()) {
            feed = feed.with_content_root(df_folder);
        }
        let catalog = Catalog::build(&feed).map_err(CliError::load)?;

        let manager = StateManager::new(catalog, policy);
        manager
            .load_packs(packs)
            .map_err(|e| CliError::Load(e.to_string()))?;

        if let Some(name) = &engine.pack {
            let index = manager
                .find_pack(name)
                .map_err(|_| CliError::PackNotFound(name.clone()))?;
            manager
                .select_pack(index)
                .map_err(|e| CliError::Load(e.to_string()))?;
        }

        Ok(Self { store, manager })
    }
}

fn report_dropped<W: Write>(manager: &StateManager, out: &mut W) -> Result<(), CliError> {
    for key in manager.read(|state| state.last_dropped.clone()) {
        writeln!(out, "Not installed, skipped: {}", key)?;
    }
    Ok(())
}

fn pack_index(packs: &[ModPack], name: &str) -> Result<usize, CliError> {
    find_pack(packs, name).ok_or_else(|| CliError::PackNotFound(name.to_string()))
}

fn load_packs(global: &GlobalOptions) -> Result<(JsonModpackStore, Vec<ModPack>), CliError> {
    let store = JsonModpackStore::new(resolve_mod_manager_path(global)?);
    let packs = store.load().map_err(CliError::load)?;
    Ok((store, packs))
}

fn load_policy(global: &GlobalOptions) -> Result<SortPolicy, CliError> {
    match &global.config {
        Some(path) => {
            let config = ConfigManager::from_file(path)
                .load_user_config()
                .map_err(CliError::load)?;
            Ok(config.settings.sort_policy)
        }
        None => Ok(SortPolicy::default()),
    }
}

/// `--mod-manager`, else `--df-folder`, else the DF path from `--config`.
fn resolve_mod_manager_path(global: &GlobalOptions) -> Result<Utf8PathBuf, CliError> {
    let path = if let Some(path) = &global.mod_manager {
        path.clone()
    } else {
        let df_folder = match &global.df_folder {
            Some(folder) => folder.clone(),
            None => config_df_folder(global)?.ok_or_else(|| {
                CliError::Usage("Missing --mod-manager or --df-folder (or --config).".to_string())
            })?,
        };
        mod_manager_path_in(&df_folder)
    };

    if !path.is_file() {
        return Err(CliError::Usage(format!("mod-manager.json not found: {}", path)));
    }
    Ok(path)
}

fn config_df_folder(global: &GlobalOptions) -> Result<Option<Utf8PathBuf>, CliError> {
    let Some(config_path) = &global.config else {
        return Ok(None);
    };
    if !config_path.is_file() {
        return Err(CliError::Usage(format!("Config not found: {}", config_path)));
    }

    let config = ConfigManager::from_file(config_path)
        .load_user_config()
        .map_err(|e| CliError::Usage(format!("Failed to read config: {:#}", e)))?;
    Ok(config.settings.df_folder())
}

/// `<df>/dfhack-config/mod-manager.json` -> `<df>`
fn df_folder_of(mod_manager_path: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_dir = mod_manager_path.parent()?;
    if !config_dir
        .file_name()
        .is_some_and(|name| name.eq_ignore_ascii_case("dfhack-config"))
    {
        return None;
    }
    config_dir.parent().map(|p| p.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Usage(String::new()).exit_code(), 2);
        assert_eq!(CliError::Load(String::new()).exit_code(), 3);
        assert_eq!(CliError::PackNotFound(String::new()).exit_code(), 4);
        assert_eq!(CliError::Save(String::new()).exit_code(), 5);
    }

    #[test]
    fn test_build_version() {
        assert_eq!(BuildVersion::new(Some(" 42 ".to_string())).version(), "42");
        assert_eq!(BuildVersion::new(None).version(), crate::VERSION);
        assert_eq!(BuildVersion::new(Some(String::new())).version(), crate::VERSION);
    }

    #[test]
    fn test_df_folder_of() {
        assert_eq!(
            df_folder_of(Utf8Path::new("/games/df/dfhack-config/mod-manager.json")).unwrap(),
            "/games/df"
        );
        assert!(df_folder_of(Utf8Path::new("/tmp/packs.json")).is_none());
    }

    #[test]
    fn test_missing_location_is_usage_error() {
        let err = resolve_mod_manager_path(&GlobalOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
