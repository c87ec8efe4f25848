use anyhow::{Context, Result};
use std::path::Path;

use sunrelay::args::{CliAction, ParsedArgs, display_help, display_version_info};
use sunrelay::clock::SystemClock;
use sunrelay::commands;
use sunrelay::config::Config;
use sunrelay::constants::EXIT_FAILURE;
use sunrelay::geo::SolarCalculator;
use sunrelay::logger::Log;
use sunrelay::relay::create_relay;
use sunrelay::scheduler::Scheduler;
use sunrelay::signals::setup_signal_handler;

fn main() {
    let parsed = ParsedArgs::from_env();

    let result = match parsed.action {
        CliAction::ShowVersion => {
            display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::ShowNext {
            debug_enabled,
            config_path,
        } => {
            Log::set_debug(debug_enabled);
            commands::next::handle_next_command(config_path.as_deref())
        }
        CliAction::Run {
            debug_enabled,
            config_path,
        } => {
            Log::set_debug(debug_enabled);
            run_scheduler(config_path.as_deref())
        }
    };

    if let Err(e) = result {
        Log::log_pipe();
        Log::log_critical(&format!("{:#}", e));
        Log::log_end();
        std::process::exit(EXIT_FAILURE);
    }
}

/// Load configuration, build the collaborators and run until shutdown.
fn run_scheduler(config_path: Option<&Path>) -> Result<()> {
    Log::log_version();

    let config = Config::load_from(config_path)?;
    config.log_config(config_path);

    let location = config.location()?;

    // Signals first so a SIGTERM during GPIO setup is not lost
    let (_handle, shutdown) = setup_signal_handler()?;

    let relay = create_relay(&config).context("Failed to initialize relay")?;

    let mut scheduler = Scheduler::new(SolarCalculator::new(), relay, SystemClock::new(), location)
        .with_retry_interval(config.retry_interval());

    scheduler.run(&shutdown)?;

    Log::log_end();
    Ok(())
}
