//! Human-friendly output for results and notices.

use std::fmt::Write;

use weather_lookup_core::{LookupError, WeatherResult};

/// The result card: headline, description, then one labelled row per reading.
pub fn card(w: &WeatherResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", w.location_name);
    let _ = writeln!(out, "{}°C", w.temperature_c);
    let _ = writeln!(out, "{}", w.description);
    let _ = writeln!(out);

    let rows = [
        ("Feels like", format!("{}°C", w.feels_like_c)),
        ("Humidity", format!("{}%", w.humidity_pct)),
        ("Pressure", format!("{} hPa", w.pressure_hpa)),
        ("Wind", format!("{} m/s", w.wind_speed_mps)),
        ("Clouds", format!("{}%", w.clouds_pct)),
        ("Visibility", visibility(w)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<12}{value}");
    }

    if let Some(at) = w.observed_at {
        let _ = writeln!(out, "{:<12}{}", "Observed", at.format("%Y-%m-%d %H:%M UTC"));
    }

    out
}

pub fn visibility(w: &WeatherResult) -> String {
    format!("{} km", w.visibility_km())
}

pub fn notice(err: &LookupError) -> String {
    format!("{}: {}", err.title(), err)
}

pub fn json(w: &WeatherResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(w)?)
}
