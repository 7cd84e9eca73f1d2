use clap::{Parser, Subcommand};
use color_eyre::eyre::{self, eyre};
use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::api::WeatherApiClient;
use crate::api::types::CityWeather;
use crate::config::load_config;
use crate::credentials::load_credentials;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "skycast", about = "TUI and CLI for current weather conditions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Launch the interactive TUI (default)
    Tui,
    /// Fetch current conditions for one city (JSONL)
    Current {
        /// City name or location query
        city: String,
    },
    /// Fetch current conditions for every configured city (JSONL)
    All,
    /// Print the configured city list
    Cities,
}

// ---------------------------------------------------------------------------
// Client construction (shared with main.rs TUI path)
// ---------------------------------------------------------------------------

/// Build a `WeatherApiClient` from the environment credential.
pub fn build_api_client() -> eyre::Result<WeatherApiClient> {
    let creds = load_credentials().map_err(|e| eyre!("{e}"))?;
    Ok(WeatherApiClient::new(creds.api_key))
}

// ---------------------------------------------------------------------------
// Non-interactive commands
// ---------------------------------------------------------------------------

pub async fn run_command(cmd: CliCommand) -> color_eyre::Result<()> {
    match cmd {
        CliCommand::Tui => unreachable!("handled in main"),
        CliCommand::Current { city } => {
            let client = build_api_client()?;
            let resp = client.current(&city).await?;
            print_record(&CityWeather::from_response(city, &resp))
        }
        CliCommand::All => {
            let client = build_api_client()?;
            let config = load_config();

            // Independent fetches; records print in completion order, the
            // same progressive-reveal semantics as the TUI grid.
            let mut fetches: FuturesUnordered<_> = config
                .cities
                .iter()
                .map(|city| {
                    let client = &client;
                    async move { (city.clone(), client.current(city).await) }
                })
                .collect();

            let mut failures = 0usize;
            while let Some((city, result)) = fetches.next().await {
                match result {
                    Ok(resp) => print_record(&CityWeather::from_response(city, &resp))?,
                    Err(e) => {
                        failures += 1;
                        tracing::warn!(city, error = %e, "fetch failed");
                        eprintln!("{city}: {e}");
                    }
                }
            }

            if failures > 0 {
                return Err(eyre!("{failures} of {} fetches failed", config.cities.len()));
            }
            Ok(())
        }
        CliCommand::Cities => {
            for city in load_config().cities {
                println!("{city}");
            }
            Ok(())
        }
    }
}

fn print_record(record: &CityWeather) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::parse_from(["skycast"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_current_with_city() {
        let cli = Cli::parse_from(["skycast", "current", "Zagreb"]);
        match cli.command {
            Some(CliCommand::Current { city }) => assert_eq!(city, "Zagreb"),
            _ => panic!("expected current subcommand"),
        }
    }

    #[test]
    fn parses_all_and_cities() {
        assert!(matches!(
            Cli::parse_from(["skycast", "all"]).command,
            Some(CliCommand::All)
        ));
        assert!(matches!(
            Cli::parse_from(["skycast", "cities"]).command,
            Some(CliCommand::Cities)
        ));
    }
}
