//! Core library for the `dashboard` weather CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather HTTP client and forecast reduction
//! - Geolocation resolution
//! - The durable favorites store
//! - The dashboard state machine tying them together
//!
//! It is used by `dashboard-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod favorites;
pub mod locate;
pub mod model;
pub mod provider;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardOptions, RequestClass, RequestTicket};
pub use favorites::FavoritesStore;
pub use locate::{Coordinates, IpLocator, LocationError, Locator};
pub use model::{ForecastEntry, Status, Unit, WeatherSnapshot, icon_url};
pub use provider::{OpenWeatherClient, WeatherError};
