// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SDAC Elia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sdac-elia")]
#[command(author, version, about = "Elia SDAC day-ahead prices as Home Assistant sensors")]
#[command(
    long_about = "Fetches the quarter-hour SDAC auction results published by Elia once per\n\
    market day, picks the price of the current 15-minute block and derives the\n\
    Ecopower and custom tariffs from it.\n\
    \nExamples:\n  \
    sdac-elia                               # Run the refresh loop\n  \
    sdac-elia --config sdac.toml run        # Run with an explicit config file\n  \
    sdac-elia show                          # Print the current readings\n  \
    sdac-elia show --date 2025-10-02        # Print one day's price table"
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON when the extension is .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Refresh prices periodically and publish sensor states
    Run,

    /// Fetch once and print the result as JSON
    Show(ShowArgs),
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Print the raw price table of this market day instead of the current readings
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["sdac-elia"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_show_with_date() {
        let cli =
            Cli::try_parse_from(["sdac-elia", "show", "--date", "2025-10-02", "-c", "x.toml"])
                .unwrap();
        match cli.command {
            Some(Commands::Show(args)) => {
                assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 10, 2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["sdac-elia", "show", "--date", "02/10/2025"]).is_err());
    }
}
