use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::{io::IsTerminal, sync::Arc};
use weather_news_core::{
    Config, Coordinates, FetchStatus, GeolocationProvider, UnitSystem, WeatherPipeline,
    WeatherStore, location::location_from_config, provider::provider_from_config,
};

use crate::{
    prompt::{self, PromptedLocation},
    render::ScreenState,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-news", version, about = "Weather & News screen")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, unit system and location source.
    Configure,

    /// Locate, fetch weather and show the screen.
    Show {
        /// Latitude; overrides the configured location source.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; overrides the configured location source.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// "metric" or "imperial"; defaults to the configured unit system.
        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,

        /// Print the screen state as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Don't prompt: grant location access and never offer a retry.
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the config file location.
    ConfigPath,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => {
                let cfg = prompt::configure(Config::load()?).await?;
                cfg.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
            }
            Command::Show { lat, lon, units, json, yes } => {
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                show(explicit, units, json, yes).await?;
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

async fn show(
    explicit: Option<Coordinates>,
    units: Option<UnitSystem>,
    json: bool,
    yes: bool,
) -> anyhow::Result<()> {
    if let Some(coordinates) = explicit {
        if !coordinates.is_valid() {
            bail!("Coordinates out of range: {coordinates}");
        }
    }

    let config = Config::load()?;
    let units = units.unwrap_or(config.units);
    let interactive = !yes && !json && std::io::stdin().is_terminal();

    let provider = provider_from_config(&config)?;
    let location = location_from_config(&config, explicit)?;
    let location: Arc<dyn GeolocationProvider> = if interactive {
        Arc::new(PromptedLocation::new(location))
    } else {
        Arc::from(location)
    };

    let store = WeatherStore::shared(config.error_flag_policy());
    let pipeline = WeatherPipeline::new(location, Arc::from(provider), units, store.clone());

    loop {
        if let Err(err) = pipeline.run().await {
            // Already logged and recorded in the store.
            tracing::debug!(error = %err, "pipeline run ended with an error");
        }

        let screen = ScreenState::from_store(&store.lock());

        if json {
            let out = serde_json::to_string_pretty(&screen)
                .context("Failed to serialize screen state")?;
            println!("{out}");
        } else {
            print!("{}", screen.render());
        }

        let failed = store.lock().status() == FetchStatus::Failed;
        if !(failed && interactive && prompt::confirm_retry().await?) {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "weather-news", "show", "--lat", "-33.87", "--lon", "151.21", "--units", "imperial",
        ])
        .unwrap();

        match cli.command {
            Command::Show { lat, lon, units, json, yes } => {
                assert_eq!(lat, Some(-33.87));
                assert_eq!(lon, Some(151.21));
                assert_eq!(units, Some(UnitSystem::Imperial));
                assert!(!json);
                assert!(!yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        let res = Cli::try_parse_from(["weather-news", "show", "--lat", "10"]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_unknown_units() {
        let res = Cli::try_parse_from(["weather-news", "show", "--units", "kelvin"]);
        assert!(res.is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["weather-news", "config-path", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::ConfigPath));
    }
}
