// ABOUTME: AquaMetric CLI - analyze swim recordings from the command line
// ABOUTME: Handles single-file and directory analysis, lap classification, filter inspection and style listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 AquaMetric
//!
//! Usage:
//! ```bash
//! # Analyze one recording and print a text report
//! aquametric-cli analyze session.csv --pool-length 25
//!
//! # Same, as JSON on stdout
//! aquametric-cli analyze session.csv --json
//!
//! # Analyze every CSV in a directory
//! aquametric-cli batch recordings/
//!
//! # Classify a sample range of a recording
//! aquametric-cli classify session.csv --start 150 --end 600
//!
//! # Compare raw and filtered accelerometer statistics
//! aquametric-cli filter session.csv --cutoff-hz 2.5
//!
//! # List the recognized stroke styles
//! aquametric-cli stroke-types
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;
use std::process::ExitCode;

use aquametric::config::load_algorithm_config;
use aquametric::errors::{AppError, AppResult};
use aquametric::logging::LoggingConfig;
use aquametric_core::constants::pool::DEFAULT_POOL_LENGTH_M;
use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(
    name = "aquametric-cli",
    version,
    about = "AquaMetric swim session analysis",
    long_about = "Detects laps, stroke styles and stroke counts in wrist-worn IMU recordings exported as CSV."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Algorithm configuration file (YAML); overrides AQUAMETRIC_CONFIG_PATH
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sampling rate of the recordings in Hz; overrides the configuration
    #[arg(long, global = true)]
    sampling_hz: Option<f64>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Analyze one recording
    Analyze {
        /// CSV recording
        file: PathBuf,

        /// Pool length in meters (10-50)
        #[arg(long, default_value_t = DEFAULT_POOL_LENGTH_M)]
        pool_length: u32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze every CSV recording in a directory
    Batch {
        /// Directory holding CSV recordings
        directory: PathBuf,

        /// Pool length in meters (10-50)
        #[arg(long, default_value_t = DEFAULT_POOL_LENGTH_M)]
        pool_length: u32,

        /// Print the reports as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Classify the stroke style of a sample range
    Classify {
        /// CSV recording
        file: PathBuf,

        /// First sample (inclusive), defaults to the start of the recording
        #[arg(long)]
        start: Option<usize>,

        /// Last sample (exclusive), defaults to the end of the recording
        #[arg(long)]
        end: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-axis accelerometer statistics before and after filtering
    Filter {
        /// CSV recording
        file: PathBuf,

        /// Cutoff frequency in Hz, defaults to the configuration
        #[arg(long)]
        cutoff_hz: Option<f64>,

        /// Filter order, defaults to the configuration
        #[arg(long)]
        order: Option<usize>,
    },

    /// List the recognized stroke styles
    StrokeTypes,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = LoggingConfig::from_env().with_level(log_level).init() {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error.code = ?e.code, "{}", e.message);
            eprintln!("error: {e}");
            if e.code.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let mut config = load_algorithm_config(cli.config.as_deref())?;
    if let Some(rate) = cli.sampling_hz {
        config.sampling.frequency_hz = rate;
        config.validate().map_err(AppError::from)?;
    }

    match cli.command {
        Command::Analyze {
            file,
            pool_length,
            json,
        } => commands::analyze::analyze_file(config, &file, pool_length, json),
        Command::Batch {
            directory,
            pool_length,
            json,
        } => commands::analyze::analyze_directory(config, &directory, pool_length, json),
        Command::Classify {
            file,
            start,
            end,
            json,
        } => commands::inspect::classify(&config, &file, start, end, json),
        Command::Filter {
            file,
            cutoff_hz,
            order,
        } => commands::inspect::filter(&config, &file, cutoff_hz, order),
        Command::StrokeTypes => {
            commands::inspect::stroke_types();
            Ok(())
        }
    }
}
