use std::path::PathBuf;

use clap::Parser;

/// Environment variable consulted when no path is given on the command line.
pub const DATA_PATH_ENV: &str = "CO2_DASHBOARD_DATA";
pub const DEFAULT_DATA_PATH: &str = "owid-co2-data.csv";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "co2-dashboard", version, about = "World CO2 emissions dashboard")]
pub struct Cli {
    /// Emissions table loaded at startup (.csv, .json or .parquet)
    #[arg(env = DATA_PATH_ENV, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset loaded before the window opens.
    pub data_path: PathBuf,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 600.0],
        }
    }
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        Self {
            data_path: cli.data_path,
            ..Default::default()
        }
    }
}

impl DashboardConfig {
    /// Parse the process arguments. Exits with usage on `--help` or bad input.
    pub fn from_args() -> Self {
        Cli::parse().into()
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_data_path() {
        let cli = Cli::try_parse_from(["co2-dashboard", "emissions.parquet"]).unwrap();
        let cfg = DashboardConfig::from(cli);
        assert_eq!(cfg.data_path, PathBuf::from("emissions.parquet"));
        assert_eq!(cfg.window_size, DashboardConfig::default().window_size);
    }

    #[test]
    fn test_help_is_not_a_path() {
        let err = Cli::try_parse_from(["co2-dashboard", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_data_path_default_and_env() {
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "data_path")
            .unwrap();
        let defaults: Vec<_> = arg.get_default_values().iter().map(|v| v.to_str()).collect();
        assert_eq!(defaults, vec![Some(DEFAULT_DATA_PATH)]);
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(DATA_PATH_ENV)));
    }
}
