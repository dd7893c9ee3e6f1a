//! Command line front end using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! modhearth [global options] <command>
//!   list-packs
//!   list-mods   --pack NAME
//!   set-default --pack NAME
//!   problems    --discovery FEED [--pack NAME]
//!   sort        --discovery FEED [--pack NAME] [--write]
//!   export      --pack NAME --output FILE
//!   import      --input FILE
//!   version
//! ```
//!
//! Every command that touches packs needs `mod-manager.json`, found through
//! `--mod-manager`, `--df-folder` or the DF path in `--config`, in that order.

pub mod commands;

pub use commands::{execute, BuildVersion, CliError, VersionProvider};

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// ModHearth - Dwarf Fortress modpack manager
#[derive(Debug, Parser)]
#[command(
    name = "modhearth",
    author,
    version,
    about = "Inspect, check and auto-sort DFHack modpacks",
    after_help = "EXIT CODES:\n  0 success\n  2 bad usage or mod-manager.json not found\n  \
                  3 failed to load packs or mods\n  4 pack not found\n  5 failed to save"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to dfhack-config/mod-manager.json
    #[arg(long = "mod-manager", value_name = "PATH", global = true)]
    pub mod_manager: Option<Utf8PathBuf>,

    /// Dwarf Fortress install directory
    #[arg(long = "df-folder", value_name = "PATH", global = true)]
    pub df_folder: Option<Utf8PathBuf>,

    /// ModHearth Config.yaml to read the DF path and sort policy from
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Debug logging on the console
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List modpacks; `*` marks the default
    ListPacks,

    /// List the mods of one pack in load order
    ListMods {
        #[arg(long, value_name = "NAME")]
        pack: String,
    },

    /// Make one pack the default and save
    SetDefault {
        #[arg(long, value_name = "NAME")]
        pack: String,
    },

    /// Report ordering problems and conflicts in a pack
    Problems(EngineArgs),

    /// Auto-sort a pack and print the new order
    Sort {
        #[command(flatten)]
        engine: EngineArgs,

        /// Save the sorted order back to mod-manager.json
        #[arg(long)]
        write: bool,
    },

    /// Write one pack to a standalone JSON file
    Export {
        #[arg(long, value_name = "NAME")]
        pack: String,

        #[arg(long, value_name = "FILE")]
        output: Utf8PathBuf,
    },

    /// Add a pack from a JSON file, replacing a pack with the same name
    Import {
        #[arg(long, value_name = "FILE")]
        input: Utf8PathBuf,
    },

    /// Print the version
    Version,
}

/// Arguments of the commands that need the mod catalog.
#[derive(Debug, Clone, Args)]
pub struct EngineArgs {
    /// JSON discovery feed listing installed mods
    #[arg(long, value_name = "FEED")]
    pub discovery: Utf8PathBuf,

    /// Pack to work on (default pack if omitted)
    #[arg(long, value_name = "NAME")]
    pub pack: Option<String>,
}

/// Parse the process arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
