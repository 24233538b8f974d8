//! The dashboard state machine: one owner of all mutable UI state, with every
//! mutation expressed as a discrete named transition.
//!
//! Each outbound request class carries a monotonically increasing sequence
//! number. A completion holding a stale ticket is discarded, so when user
//! actions overlap the most recently issued request wins regardless of which
//! response arrives last. The `begin`/`complete_*` steps are plain synchronous
//! transitions; the async methods below compose them around the actual HTTP
//! calls.

use std::sync::Arc;

use anyhow::Result;

use crate::favorites::FavoritesStore;
use crate::locate::{LocationError, Locator};
use crate::model::{ForecastEntry, Status, Unit, WeatherSnapshot};
use crate::provider::{OpenWeatherClient, WeatherError};

/// The two kinds of outbound request the dashboard issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Current,
    Forecast,
}

/// Proof that a request was issued, carrying its sequence number. Completions
/// presenting a ticket that is no longer the latest for its class are ignored.
#[derive(Debug, Clone, Copy)]
pub struct RequestTicket {
    class: RequestClass,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    pub unit: Unit,
    pub suppress_forecast_errors: bool,
}

pub struct Dashboard {
    client: OpenWeatherClient,
    locator: Option<Arc<dyn Locator>>,
    store: FavoritesStore,

    city: String,
    unit: Unit,
    snapshot: Option<WeatherSnapshot>,
    forecast: Vec<ForecastEntry>,
    favorites: Vec<String>,
    status: Status,

    suppress_forecast_errors: bool,
    seq: u64,
    latest_current: u64,
    latest_forecast: u64,
}

impl Dashboard {
    /// Build a dashboard. The favorites list is read from the store once,
    /// here; afterwards the in-memory copy is mirrored back on every add.
    pub fn new(
        client: OpenWeatherClient,
        locator: Option<Arc<dyn Locator>>,
        store: FavoritesStore,
        options: DashboardOptions,
    ) -> Self {
        let favorites = store.load();
        Self {
            client,
            locator,
            store,
            city: String::new(),
            unit: options.unit,
            snapshot: None,
            forecast: Vec::new(),
            favorites,
            status: Status::Idle,
            suppress_forecast_errors: options.suppress_forecast_errors,
            seq: 0,
            latest_current: 0,
            latest_forecast: 0,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastEntry] {
        &self.forecast
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Issue a ticket for an outbound request. Starting a current-conditions
    /// request enters the loading state and clears any prior error; forecast
    /// requests do not touch the status.
    pub fn begin(&mut self, class: RequestClass) -> RequestTicket {
        self.seq += 1;
        match class {
            RequestClass::Current => {
                self.latest_current = self.seq;
                self.status = Status::Loading;
            }
            RequestClass::Forecast => self.latest_forecast = self.seq,
        }
        RequestTicket { class, seq: self.seq }
    }

    fn is_latest(&self, ticket: RequestTicket) -> bool {
        match ticket.class {
            RequestClass::Current => ticket.seq == self.latest_current,
            RequestClass::Forecast => ticket.seq == self.latest_forecast,
        }
    }

    /// Apply the outcome of a current-conditions request. Returns the resolved
    /// location name on success so the caller can chain the forecast fetch for
    /// the name the service reports, not the raw user input. Stale tickets are
    /// discarded wholesale.
    pub fn complete_current(
        &mut self,
        ticket: RequestTicket,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Option<String> {
        if ticket.class != RequestClass::Current || !self.is_latest(ticket) {
            return None;
        }

        match result {
            Ok(snapshot) => {
                let resolved = snapshot.name.clone();
                self.snapshot = Some(snapshot);
                self.status = Status::Idle;
                Some(resolved)
            }
            Err(err) => {
                self.forecast.clear();
                self.status = Status::Error(err.to_string());
                None
            }
        }
    }

    /// Apply the outcome of a forecast request. On failure the forecast is
    /// cleared and the current-conditions display is left intact; whether the
    /// failure is user-visible or only diagnostic-logged is a configuration
    /// choice.
    pub fn complete_forecast(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<ForecastEntry>, WeatherError>,
    ) {
        if ticket.class != RequestClass::Forecast || !self.is_latest(ticket) {
            return;
        }

        match result {
            Ok(entries) => self.forecast = entries,
            Err(err) => {
                self.forecast.clear();
                if self.suppress_forecast_errors {
                    tracing::warn!(error = %err, "forecast fetch failed");
                } else {
                    self.status = Status::Error(err.to_string());
                }
            }
        }
    }

    /// Search for the city currently typed into the city field. Empty or
    /// whitespace-only input is a silent no-op: no request is issued and no
    /// state changes.
    pub async fn search(&mut self) {
        let city = self.city.trim().to_string();
        if city.is_empty() {
            return;
        }
        self.fetch_by_city(&city).await;
    }

    /// Resolve coordinates through the locator and fetch weather for them. On
    /// success the city field adopts the place name the service resolved.
    pub async fn use_location(&mut self) {
        let Some(locator) = self.locator.clone() else {
            self.status = Status::Error(LocationError::Unsupported.to_string());
            return;
        };

        self.status = Status::Loading;

        match locator.locate().await {
            Ok(coords) => {
                let ticket = self.begin(RequestClass::Current);
                let result = self.client.current_by_coords(coords, self.unit).await;
                if let Some(resolved) = self.complete_current(ticket, result) {
                    self.city = resolved.clone();
                    self.fetch_forecast(&resolved).await;
                }
            }
            Err(err) => {
                self.status = Status::Error(err.to_string());
            }
        }
    }

    /// Flip the measurement system and refresh under the new unit: a full
    /// refetch when a city is set, a forecast-only refetch when only a prior
    /// snapshot exists.
    pub async fn toggle_unit(&mut self) {
        self.unit = self.unit.toggle();

        let city = self.city.trim().to_string();
        if !city.is_empty() {
            self.fetch_by_city(&city).await;
        } else if let Some(name) = self.snapshot.as_ref().map(|s| s.name.clone()) {
            self.fetch_forecast(&name).await;
        }
    }

    /// Add the current snapshot's location to the favorites and persist the
    /// updated list. No-op without a snapshot or on an exact duplicate name.
    /// Returns whether the list changed.
    pub fn add_favorite(&mut self) -> Result<bool> {
        let Some(name) = self.snapshot.as_ref().map(|s| s.name.clone()) else {
            return Ok(false);
        };
        if self.favorites.iter().any(|f| *f == name) {
            return Ok(false);
        }

        self.favorites.push(name);
        self.store.save(&self.favorites)?;
        Ok(true)
    }

    /// Make a saved favorite the active city and run the full fetch for it
    /// under the current unit.
    pub async fn select_favorite(&mut self, name: &str) {
        self.city = name.to_string();
        self.search().await;
    }

    async fn fetch_by_city(&mut self, city: &str) {
        let ticket = self.begin(RequestClass::Current);
        let result = self.client.current_by_city(city, self.unit).await;
        if let Some(resolved) = self.complete_current(ticket, result) {
            self.fetch_forecast(&resolved).await;
        }
    }

    async fn fetch_forecast(&mut self, name: &str) {
        let ticket = self.begin(RequestClass::Forecast);
        let result = self.client.forecast_by_city(name, self.unit).await;
        self.complete_forecast(ticket, result);
    }
}
