//! ModHearth - command line front end
//!
//! # Execution Flow
//!
//! 1. Parse arguments (clap)
//! 2. Read logging settings from `--config` if given, else defaults
//! 3. Initialize logging: daily rotating file under the log dir, console on `--debug`
//! 4. Dispatch the command; errors are printed to stderr and mapped to exit codes
//!
//! Normal command output goes to stdout.

use modhearth::cli::{self, BuildVersion, CliError, GlobalOptions};
use modhearth::logging::{setup_logging_with_options, LogOptions};
use modhearth::models::Settings;
use modhearth::{ConfigManager, APP_NAME, VERSION};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::parse();

    let settings = load_settings(&cli.global);
    let log_options = LogOptions {
        debug_mode: cli.global.debug || settings.debug_mode,
        console_output: cli.global.debug,
        json: settings.json_logs,
        ..LogOptions::new(settings.log_dir.as_str(), APP_NAME)
    };
    // Keep the guard alive until exit so buffered log lines are flushed
    let _log_guard = match setup_logging_with_options(&log_options) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    tracing::info!("Starting {} v{}: {:?}", APP_NAME, VERSION, cli.command);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli::execute(&cli, &BuildVersion::from_env(), &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &CliError) -> ExitCode {
    tracing::error!("Command failed: {}", e);
    eprintln!("{e}");
    ExitCode::from(e.exit_code())
}

/// Settings from `--config`, or defaults. A broken config is reported by the
/// command that needs it, not here.
fn load_settings(global: &GlobalOptions) -> Settings {
    global
        .config
        .as_ref()
        .filter(|path| path.is_file())
        .and_then(|path| ConfigManager::from_file(path).load_user_config().ok())
        .map(|config| config.settings)
        .unwrap_or_default()
}
