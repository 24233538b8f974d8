use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static host serving the upstream service's condition icons.
pub const ICON_HOST: &str = "https://openweathermap.org/img/wn";

/// Measurement system sent to the upstream service as the `units` query
/// parameter. This is not a client-side conversion: it changes which absolute
/// values the service returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Metric,
    Imperial,
}

impl Unit {
    pub fn query_param(self) -> &'static str {
        match self {
            Unit::Metric => "metric",
            Unit::Imperial => "imperial",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Metric => "°C",
            Unit::Imperial => "°F",
        }
    }

    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Unit::Metric => Unit::Imperial,
            Unit::Imperial => Unit::Metric,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.query_param())
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Unit::Metric),
            "imperial" => Ok(Unit::Imperial),
            _ => Err(format!(
                "Unknown unit '{s}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Point-in-time conditions for one location. Replaced wholesale on every
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub temp: f64,
    pub humidity: u8,
    pub description: String,
    pub icon: String,
}

/// One midday sample from the 3-hourly forecast series, at most one per
/// calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    /// Feed-local time as reported in `dt_txt`.
    pub local_time: NaiveDateTime,
    pub temp: f64,
    pub description: String,
    /// Coarse condition group, e.g. "Clouds" or "Rain".
    pub kind: String,
    pub icon: String,
}

/// Single tri-state status for the dashboard. Loading and error are mutually
/// exclusive by construction; at most one error message exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Status::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// URL of the 2x condition icon for an icon identifier such as `10d`.
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_HOST}/{icon}@2x.png")
}
