//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, and debug flags while gracefully handling unknown options.

use std::path::PathBuf;

use crate::logger::Log;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler with these settings
    Run {
        debug_enabled: bool,
        config_path: Option<PathBuf>,
    },
    /// Print the next sunrise and sunset, then exit
    ShowNext {
        debug_enabled: bool,
        config_path: Option<PathBuf>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or malformed arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut show_next = false;
        let mut config_path: Option<PathBuf> = None;
        let mut unknown_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = &args_vec[i];
            match arg_str.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--next" | "-n" => show_next = true,
                "--config" | "-c" => match args_vec.get(i + 1) {
                    Some(path) if !path.starts_with('-') => {
                        config_path = Some(PathBuf::from(path));
                        i += 1;
                    }
                    _ => {
                        Log::log_warning("Missing path for --config. Usage: --config <path>");
                        unknown_arg_found = true;
                    }
                },
                _ => {
                    if let Some(path) = arg_str.strip_prefix("--config=") {
                        if path.is_empty() {
                            Log::log_warning("Empty path for --config");
                            unknown_arg_found = true;
                        } else {
                            config_path = Some(PathBuf::from(path));
                        }
                    } else if arg_str.starts_with('-') {
                        Log::log_warning(&format!("Unknown option: {}", arg_str));
                        unknown_arg_found = true;
                    }
                    // Non-option arguments are ignored
                }
            }
            i += 1;
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if show_next {
            CliAction::ShowNext {
                debug_enabled,
                config_path,
            }
        } else {
            CliAction::Run {
                debug_enabled,
                config_path,
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: sunrelay [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-c, --config <path>  Use a specific configuration file");
    Log::log_indented("-d, --debug          Enable detailed debug output");
    Log::log_indented("-h, --help           Print help information");
    Log::log_indented("-n, --next           Show the next sunrise and sunset, then exit");
    Log::log_indented("-V, --version        Print version information");
    Log::log_block_start("Signals:");
    Log::log_indented("SIGTERM, SIGINT, SIGHUP  Stop, leaving the relay as it is");
    Log::log_indented("SIGUSR2                  Recompute the schedule immediately");
    Log::log_end();
}
