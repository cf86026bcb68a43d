//! Human-friendly text output for weather results.

use std::fmt;

use chrono::Local;
use weather_core::{CurrentWeather, DailyForecast, TemperatureUnit, WidgetState, icon_url};

/// Formats a Celsius reading in the selected unit, e.g. `18.4°C`.
pub struct Temp(pub f64, pub TemperatureUnit);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}{}", self.1.convert(self.0), self.1.symbol())
    }
}

pub struct WeatherCard<'a> {
    pub weather: &'a CurrentWeather,
    pub unit: TemperatureUnit,
}

impl fmt::Display for WeatherCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.weather;
        let unit = self.unit;

        if w.country.is_empty() {
            writeln!(f, "{}", w.location_name)?;
        } else {
            writeln!(f, "{}, {}", w.location_name, w.country)?;
        }
        writeln!(f, "  Temperature: {}", Temp(w.temperature_c, unit))?;
        writeln!(f, "  Feels like:  {}", Temp(w.feels_like_c, unit))?;
        writeln!(
            f,
            "  Min / Max:   {} / {}",
            Temp(w.temp_min_c, unit),
            Temp(w.temp_max_c, unit)
        )?;
        writeln!(f, "  Humidity:    {}%", w.humidity_pct)?;
        writeln!(f, "  Pressure:    {} hPa", w.pressure_hpa)?;
        writeln!(f, "  Wind:        {:.1} m/s, {}°", w.wind_speed_mps, w.wind_direction_deg)?;
        writeln!(f, "  Weather:     {} - {}", w.condition, w.description)?;
        if !w.icon.is_empty() {
            writeln!(f, "  Icon:        {}", icon_url(&w.icon))?;
        }
        writeln!(f, "  Cloudiness:  {}%", w.cloudiness_pct)?;
        match w.visibility_m {
            Some(m) => writeln!(f, "  Visibility:  {m} m")?,
            None => writeln!(f, "  Visibility:  n/a")?,
        }
        writeln!(
            f,
            "  Sunrise:     {}",
            w.sunrise.with_timezone(&Local).format("%H:%M:%S")
        )?;
        write!(
            f,
            "  Sunset:      {}",
            w.sunset.with_timezone(&Local).format("%H:%M:%S")
        )
    }
}

pub struct ForecastCards<'a> {
    pub days: &'a [DailyForecast],
    pub unit: TemperatureUnit,
}

impl fmt::Display for ForecastCards<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Forecast")?;
        for day in self.days {
            write!(
                f,
                "\n  {}  {} / {}  {}",
                day.date.format("%a %Y-%m-%d"),
                Temp(day.temp_min_c, self.unit),
                Temp(day.temp_max_c, self.unit),
                day.description,
            )?;
        }
        Ok(())
    }
}

/// Weather card followed by forecast cards; empty slots are skipped.
pub fn render_results(state: &WidgetState) -> String {
    let mut sections = Vec::new();

    if let Some(weather) = &state.weather {
        sections.push(WeatherCard { weather, unit: state.unit }.to_string());
    }
    if !state.forecast.is_empty() {
        sections.push(ForecastCards { days: &state.forecast, unit: state.unit }.to_string());
    }

    sections.join("\n\n")
}
