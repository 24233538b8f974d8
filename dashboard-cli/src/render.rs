//! Plain-text rendering of the dashboard state.

use dashboard_core::{Dashboard, ForecastEntry, Unit, WeatherSnapshot, icon_url};

/// Print the dashboard data: current conditions, forecast strip, favorites.
/// Error status is left to the caller, which decides between printing it and
/// propagating it.
pub fn report(dashboard: &Dashboard) {
    if dashboard.status().is_loading() {
        println!("Loading...");
    }

    if let Some(snapshot) = dashboard.snapshot() {
        print!("{}", current_block(snapshot, dashboard.unit()));
    }

    if !dashboard.forecast().is_empty() {
        println!();
        println!("5-day forecast:");
        for entry in dashboard.forecast() {
            println!("{}", forecast_line(entry, dashboard.unit()));
        }
    }

    if !dashboard.favorites().is_empty() {
        println!();
        println!("Favorites:");
        for city in dashboard.favorites() {
            println!("  {city}");
        }
    }
}

fn current_block(snapshot: &WeatherSnapshot, unit: Unit) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", snapshot.name));
    out.push_str(&format!("  {:.1}{}  {}\n", snapshot.temp, unit.symbol(), snapshot.description));
    out.push_str(&format!("  humidity {}%\n", snapshot.humidity));
    if !snapshot.icon.is_empty() {
        out.push_str(&format!("  icon {}\n", icon_url(&snapshot.icon)));
    }
    out
}

fn forecast_line(entry: &ForecastEntry, unit: Unit) -> String {
    format!(
        "  {}  {:>6.1}{}  {}",
        entry.local_time.format("%a %Y-%m-%d"),
        entry.temp,
        unit.symbol(),
        entry.kind,
    )
}
