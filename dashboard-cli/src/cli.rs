use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, Select, Text};

use dashboard_core::{
    Config, Dashboard, DashboardOptions, FavoritesStore, IpLocator, Locator, OpenWeatherClient,
    Status, Unit,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and defaults.
    Configure,

    /// Show current conditions and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Measurement system, "metric" or "imperial"; defaults to the
        /// configured one.
        #[arg(long)]
        units: Option<Unit>,
    },

    /// Show weather for the current location.
    Here {
        #[arg(long)]
        units: Option<Unit>,
    },

    /// List saved favorite cities.
    Favorites,

    /// Run the interactive dashboard.
    Dashboard {
        #[arg(long)]
        units: Option<Unit>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units } => {
                let mut dashboard = build_dashboard(units)?;
                dashboard.set_city(city);
                dashboard.search().await;
                finish(&dashboard)
            }
            Command::Here { units } => {
                let mut dashboard = build_dashboard(units)?;
                dashboard.use_location().await;
                finish(&dashboard)
            }
            Command::Favorites => {
                let favorites = FavoritesStore::open_default()?.load();
                if favorites.is_empty() {
                    println!("No favorites saved yet.");
                } else {
                    for city in favorites {
                        println!("{city}");
                    }
                }
                Ok(())
            }
            Command::Dashboard { units } => {
                let dashboard = build_dashboard(units)?;
                interactive(dashboard).await
            }
        }
    }
}

fn build_dashboard(units: Option<Unit>) -> Result<Dashboard> {
    let config = Config::load()?;
    let api_key = config.api_key()?.to_string();

    let client = OpenWeatherClient::new(api_key);
    let locator: Option<Arc<dyn Locator>> = if config.geolocation {
        IpLocator::new().ok().map(|l| Arc::new(l) as Arc<dyn Locator>)
    } else {
        None
    };
    let store = FavoritesStore::open_default()?;

    let options = DashboardOptions {
        unit: units.unwrap_or(config.units),
        suppress_forecast_errors: config.suppress_forecast_errors,
    };

    Ok(Dashboard::new(client, locator, store, options))
}

/// Render a one-shot command and turn an error status into a failing result.
fn finish(dashboard: &Dashboard) -> Result<()> {
    render::report(dashboard);
    status_to_result(dashboard.status())
}

fn status_to_result(status: &Status) -> Result<()> {
    match status.error() {
        Some(msg) => Err(anyhow::anyhow!("{msg}")),
        None => Ok(()),
    }
}

/// Interactive configuration. The key is read through a password prompt so it
/// is never echoed.
fn configure() -> Result<()> {
    let mut config = Config::load().unwrap_or_default();

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()?;
    if !api_key.is_empty() {
        config.set_api_key(api_key);
    }

    config.units = Select::new("Default units:", vec![Unit::Metric, Unit::Imperial]).prompt()?;
    config.geolocation = Confirm::new("Enable location lookup?")
        .with_default(config.geolocation)
        .prompt()?;
    config.suppress_forecast_errors = Confirm::new("Hide forecast fetch errors?")
        .with_default(config.suppress_forecast_errors)
        .prompt()?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// One entry of the interactive menu; the payloads only feed the labels.
#[derive(Debug, Clone)]
enum MenuItem {
    Search,
    UseLocation,
    ToggleUnits(Unit),
    AddFavorite(String),
    OpenFavorite,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search for a city"),
            MenuItem::UseLocation => f.write_str("Use my location"),
            MenuItem::ToggleUnits(next) => write!(f, "Switch to {}", next.symbol()),
            MenuItem::AddFavorite(name) => write!(f, "Add {name} to favorites"),
            MenuItem::OpenFavorite => f.write_str("Open a favorite"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

async fn interactive(mut dashboard: Dashboard) -> Result<()> {
    loop {
        println!();
        if let Some(msg) = dashboard.status().error() {
            eprintln!("error: {msg}");
        }
        render::report(&dashboard);
        println!();

        let mut items = vec![
            MenuItem::Search,
            MenuItem::UseLocation,
            MenuItem::ToggleUnits(dashboard.unit().toggle()),
        ];
        if let Some(snapshot) = dashboard.snapshot() {
            items.push(MenuItem::AddFavorite(snapshot.name.clone()));
        }
        if !dashboard.favorites().is_empty() {
            items.push(MenuItem::OpenFavorite);
        }
        items.push(MenuItem::Quit);

        let choice = match Select::new("Dashboard", items).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        match choice {
            MenuItem::Search => {
                if let Some(city) = Text::new("City:").prompt_skippable()? {
                    dashboard.set_city(city);
                    dashboard.search().await;
                }
            }
            MenuItem::UseLocation => dashboard.use_location().await,
            MenuItem::ToggleUnits(_) => dashboard.toggle_unit().await,
            MenuItem::AddFavorite(_) => {
                if dashboard.add_favorite()? {
                    println!("Saved.");
                }
            }
            MenuItem::OpenFavorite => {
                let favorites = dashboard.favorites().to_vec();
                if let Some(city) = Select::new("Favorite:", favorites).prompt_skippable()? {
                    dashboard.select_favorite(&city).await;
                }
            }
            MenuItem::Quit => return Ok(()),
        }
    }
}
