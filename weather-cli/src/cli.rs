use std::{fmt, process::ExitCode};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};

use weather_lookup_core::{
    Config, Controller, Coordinates, IpLocation, LocationSource, OpenWeatherProvider, Query,
    RequestState, WeatherProvider,
};

use crate::{consent::PromptedLocation, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city or location")]
pub struct Cli {
    /// Print results as JSON instead of a text card.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests and responses (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the provider API key in the config file.
    Configure,

    /// Show weather for a city, or for explicit coordinates.
    #[command(group(ArgGroup::new("target").required(true).args(["city", "lat"])))]
    Show {
        /// City name, e.g. "Paris" or "Paris,FR".
        city: Option<String>,

        /// Latitude in degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Show weather for your current (approximate) location.
    Here {
        /// Skip the location consent prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Keep prompting for lookups until you quit.
    Interactive,
}

type CliController = Controller<OpenWeatherProvider, PromptedLocation<IpLocation>>;

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let assume_yes = match &self.command {
            Command::Configure => return configure(),
            Command::Here { yes } => *yes,
            _ => false,
        };

        let file = Config::load()?;
        let client = match file.resolve_from_env() {
            Ok(client) => client,
            Err(err) => {
                eprintln!("{}", render::notice(&err));
                return Ok(ExitCode::FAILURE);
            }
        };
        tracing::debug!(?client, "resolved configuration");

        let mut controller: CliController = Controller::new(
            OpenWeatherProvider::new(client),
            PromptedLocation::new(IpLocation::new(), assume_yes),
        );

        match self.command {
            Command::Configure => configure(),
            Command::Show { city: Some(city), .. } => {
                if Query::city(&city).is_err() {
                    anyhow::bail!("City name must not be empty");
                }
                report(controller.submit_city(&city).await, self.json)
            }
            Command::Show { lat: Some(lat), lon: Some(lon), .. } => {
                let coords = Coordinates::new(lat, lon)?;
                report(controller.submit_coordinates(coords).await, self.json)
            }
            Command::Show { .. } => anyhow::bail!("Give a city name or both --lat and --lon"),
            Command::Here { .. } => report(controller.submit_current_location().await, self.json),
            Command::Interactive => interactive(&mut controller, self.json).await,
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    cfg.set_api_key(api_key);
    let path = cfg.save()?;
    println!("Saved API key to {}", path.display());

    Ok(ExitCode::SUCCESS)
}

/// Print a finished lookup; failures go to stderr as a notice.
fn report(state: &RequestState, json: bool) -> anyhow::Result<ExitCode> {
    match state {
        RequestState::Succeeded(weather) if json => {
            println!("{}", render::json(weather)?);
            Ok(ExitCode::SUCCESS)
        }
        RequestState::Succeeded(weather) => {
            print!("{}", render::card(weather));
            Ok(ExitCode::SUCCESS)
        }
        RequestState::Failed(err) => {
            eprintln!("{}", render::notice(err));
            Ok(ExitCode::FAILURE)
        }
        RequestState::Idle | RequestState::Loading => Ok(ExitCode::FAILURE),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    City,
    CurrentLocation,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::City => "Get weather for a city",
            Action::CurrentLocation => "Use current location",
            Action::Quit => "Quit",
        })
    }
}

fn cancelled(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

async fn interactive<P, L>(controller: &mut Controller<P, L>, json: bool) -> anyhow::Result<ExitCode>
where
    P: WeatherProvider,
    L: LocationSource,
{
    loop {
        let actions = vec![Action::City, Action::CurrentLocation, Action::Quit];
        let action = match Select::new("What next?", actions).prompt() {
            Ok(action) => action,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        let state = match action {
            Action::Quit => break,
            Action::City => {
                let city = match Text::new("Enter city name:").prompt() {
                    Ok(city) => city,
                    Err(err) if cancelled(&err) => continue,
                    Err(err) => return Err(err.into()),
                };
                if Query::city(&city).is_err() {
                    continue;
                }
                eprintln!("Loading...");
                controller.submit_city(&city).await
            }
            Action::CurrentLocation => {
                eprintln!("Locating...");
                controller.submit_current_location().await
            }
        };

        report(state, json)?;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}
