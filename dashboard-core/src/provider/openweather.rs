use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::locate::Coordinates;
use crate::model::{ForecastEntry, Unit, WeatherSnapshot};

use super::WeatherError;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Feed-local time label marking the midday sample of each forecast day.
const MIDDAY_LABEL: &str = "12:00:00";

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// HTTP client for the OpenWeather current-conditions and 5-day/3-hour
/// forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different host. Used by tests to substitute a
    /// local mock for the real service.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Current conditions looked up by city name.
    pub async fn current_by_city(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let raw: OwCurrentResponse = self
            .get_json("weather", &[("q", city), ("units", unit.query_param())])
            .await?;
        Ok(raw.into_snapshot())
    }

    /// Current conditions looked up by coordinates.
    pub async fn current_by_coords(
        &self,
        coords: Coordinates,
        unit: Unit,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let raw: OwCurrentResponse = self
            .get_json(
                "weather",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", unit.query_param()),
                ],
            )
            .await?;
        Ok(raw.into_snapshot())
    }

    /// 5-day forecast reduced to the midday sample of each day.
    pub async fn forecast_by_city(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let raw: OwForecastResponse = self
            .get_json("forecast", &[("q", city), ("units", unit.query_param())])
            .await?;
        Ok(reduce_to_daily(raw.list))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(WeatherError::request)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::request)?;

        if !status.is_success() {
            return Err(WeatherError::upstream(status, &body));
        }

        serde_json::from_str(&body).map_err(WeatherError::from)
    }
}

/// Keep exactly the entries whose feed-local label is the midday sample, at
/// most one per calendar day. A day without a midday sample (query made late
/// in that day) is absent from the result; no interpolation or backfill.
fn reduce_to_daily(list: Vec<OwForecastEntry>) -> Vec<ForecastEntry> {
    let mut daily: Vec<ForecastEntry> = Vec::new();

    for entry in list {
        if !entry.dt_txt.contains(MIDDAY_LABEL) {
            continue;
        }
        let Ok(local_time) = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT) else {
            continue;
        };
        if daily
            .last()
            .is_some_and(|prev| prev.local_time.date() == local_time.date())
        {
            continue;
        }

        let (description, kind, icon) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.main, w.icon))
            .unwrap_or_else(|| ("unknown".to_string(), String::new(), String::new()));

        daily.push(ForecastEntry {
            timestamp: unix_to_utc(entry.dt).unwrap_or_else(Utc::now),
            local_time,
            temp: entry.main.temp,
            description,
            kind,
            icon,
        });
    }

    daily
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let (description, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("unknown".to_string(), String::new()));

        WeatherSnapshot {
            name: self.name,
            temp: self.main.temp,
            humidity: self.main.humidity,
            description,
            icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dt: i64, dt_txt: &str, temp: f64) -> OwForecastEntry {
        OwForecastEntry {
            dt,
            dt_txt: dt_txt.to_string(),
            main: OwMain { temp, humidity: 50 },
            weather: vec![OwWeather {
                main: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
                icon: "03d".to_string(),
            }],
        }
    }

    /// Two days of 3-hour samples, eight per day starting at midnight.
    fn two_day_series() -> Vec<OwForecastEntry> {
        let mut list = Vec::new();
        let mut ts = 1_700_000_000;
        for day in 20..22 {
            for hour in (0..24).step_by(3) {
                list.push(entry(ts, &format!("2023-11-{day} {hour:02}:00:00"), 10.0 + f64::from(hour)));
                ts += 3 * 3600;
            }
        }
        list
    }

    #[test]
    fn reduction_keeps_only_midday_samples() {
        let daily = reduce_to_daily(two_day_series());

        assert_eq!(daily.len(), 2);
        for entry in &daily {
            assert_eq!(entry.local_time.format("%H:%M:%S").to_string(), "12:00:00");
            assert_eq!(entry.temp, 22.0);
        }
        assert_eq!(daily[0].local_time.date().to_string(), "2023-11-20");
        assert_eq!(daily[1].local_time.date().to_string(), "2023-11-21");
    }

    #[test]
    fn reduction_yields_at_most_one_entry_per_day() {
        let mut list = two_day_series();
        // Duplicate midday sample on the first day.
        list.push(entry(1_700_000_100, "2023-11-20 12:00:00", 99.0));

        let daily = reduce_to_daily(list);
        let first_day: Vec<_> = daily
            .iter()
            .filter(|e| e.local_time.date().to_string() == "2023-11-20")
            .collect();
        assert_eq!(first_day.len(), 1);
        assert_eq!(first_day[0].temp, 22.0);
    }

    #[test]
    fn day_without_midday_sample_is_absent() {
        // Query made late in the day: only evening samples remain for day one.
        let list = vec![
            entry(1, "2023-11-20 18:00:00", 9.0),
            entry(2, "2023-11-20 21:00:00", 8.0),
            entry(3, "2023-11-21 12:00:00", 12.0),
        ];

        let daily = reduce_to_daily(list);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].local_time.date().to_string(), "2023-11-21");
    }

    #[test]
    fn malformed_dt_txt_is_skipped() {
        let list = vec![entry(1, "garbage 12:00:00", 5.0), entry(2, "2023-11-21 12:00:00", 6.0)];
        let daily = reduce_to_daily(list);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].temp, 6.0);
    }

    #[test]
    fn empty_series_reduces_to_empty() {
        assert!(reduce_to_daily(Vec::new()).is_empty());
    }

    #[test]
    fn current_response_maps_first_condition() {
        let raw = OwCurrentResponse {
            name: "London".to_string(),
            main: OwMain { temp: 15.0, humidity: 70 },
            weather: vec![OwWeather {
                main: "Clouds".to_string(),
                description: "cloudy".to_string(),
                icon: "04d".to_string(),
            }],
        };

        let snapshot = raw.into_snapshot();
        assert_eq!(snapshot.name, "London");
        assert_eq!(snapshot.temp, 15.0);
        assert_eq!(snapshot.humidity, 70);
        assert_eq!(snapshot.description, "cloudy");
        assert_eq!(snapshot.icon, "04d");
    }

    #[test]
    fn current_response_without_conditions_falls_back() {
        let raw = OwCurrentResponse {
            name: "Nowhere".to_string(),
            main: OwMain { temp: 0.0, humidity: 0 },
            weather: Vec::new(),
        };

        let snapshot = raw.into_snapshot();
        assert_eq!(snapshot.description, "unknown");
        assert_eq!(snapshot.icon, "");
    }
}
