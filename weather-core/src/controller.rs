//! Search/state controller for the weather lookup widget.
//!
//! [`WeatherController`] owns the five pieces of widget state (city text,
//! current weather, daily forecast, error message, unit) and the single
//! state-changing operation, [`WeatherController::search`]. Render layers
//! read a [`WidgetState`] snapshot and never touch the state directly.
//!
//! Every search takes a generation number when it starts. Its results are
//! applied only if no newer search started while its requests were in flight.

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    error::{EMPTY_CITY_MESSAGE, FORECAST_FAILED_MESSAGE, WEATHER_FAILED_MESSAGE},
    forecast::aggregate_by_day,
    model::{CurrentWeather, DailyForecast, TemperatureUnit},
    provider::WeatherProvider,
};

/// Everything the render layer needs to draw the widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidgetState {
    pub city: String,
    pub weather: Option<CurrentWeather>,
    pub forecast: Vec<DailyForecast>,
    pub error: Option<String>,
    pub unit: TemperatureUnit,
    #[serde(skip)]
    generation: u64,
}

impl WidgetState {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a call to [`WeatherController::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The city was empty; no request was made.
    Rejected,
    /// Results (or the failure message) were written to state.
    Applied,
    /// A newer search started first; these results were discarded.
    Superseded,
}

/// Cheap-to-clone handle; clones share the same state.
#[derive(Debug, Clone)]
pub struct WeatherController {
    provider: Arc<dyn WeatherProvider>,
    state: Arc<Mutex<WidgetState>>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl WeatherController {
    pub fn new(provider: Arc<dyn WeatherProvider>, unit: TemperatureUnit) -> Self {
        let state = WidgetState { unit, ..WidgetState::default() };

        Self {
            provider,
            state: Arc::new(Mutex::new(state)),
            today: local_today,
        }
    }

    /// Replace the clock used to decide which forecast days are upcoming.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn snapshot(&self) -> WidgetState {
        self.state.lock().clone()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.lock().unit
    }

    /// Record edits to the city text without searching.
    pub fn set_city(&self, city: impl Into<String>) {
        self.state.lock().city = city.into();
    }

    /// Flip between Celsius and Fahrenheit. Display only, never fetches.
    pub fn toggle_unit(&self) -> TemperatureUnit {
        let mut state = self.state.lock();
        state.unit = state.unit.toggled();
        state.unit
    }

    /// Search for `city`, fetching current weather and the forecast.
    ///
    /// An empty city is rejected without requests; the rejection still
    /// supersedes any earlier search that has not finished yet.
    ///
    /// A completed search always replaces both result slots: a failed
    /// request leaves its slot empty rather than showing the previous
    /// city's data. When both requests fail the weather message wins.
    pub async fn search(&self, city: &str) -> SearchOutcome {
        let city = city.trim();

        let ticket = {
            let mut state = self.state.lock();
            // A rejection also supersedes any search still in flight.
            state.generation += 1;
            if city.is_empty() {
                state.error = Some(EMPTY_CITY_MESSAGE.to_string());
                return SearchOutcome::Rejected;
            }

            state.city = city.to_string();
            state.error = None;
            state.generation
        };

        debug!(city, generation = ticket, "search started");

        let (weather, slices) = tokio::join!(
            self.provider.current_weather(city),
            self.provider.forecast(city),
        );

        let weather = weather
            .inspect_err(|err| {
                warn!(
                    city,
                    endpoint = err.endpoint(),
                    error = %err,
                    "current weather request failed"
                )
            })
            .ok();
        let forecast = slices
            .inspect_err(|err| {
                warn!(city, endpoint = err.endpoint(), error = %err, "forecast request failed")
            })
            .ok()
            .map(|slices| aggregate_by_day(&slices, (self.today)()));

        let mut state = self.state.lock();
        if state.generation != ticket {
            info!(
                city,
                generation = ticket,
                latest = state.generation,
                "discarding results of superseded search"
            );
            return SearchOutcome::Superseded;
        }

        state.error = if weather.is_none() {
            Some(WEATHER_FAILED_MESSAGE.to_string())
        } else if forecast.is_none() {
            Some(FORECAST_FAILED_MESSAGE.to_string())
        } else {
            None
        };
        state.weather = weather;
        state.forecast = forecast.unwrap_or_default();

        SearchOutcome::Applied
    }
}
