//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling (proxy URL, API key, preferred unit)
//! - A client for the local weather proxy behind the [`WeatherProvider`] trait
//! - Aggregation of the 3-hour forecast feed into daily summaries
//! - The search/state controller that render layers drive
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;

pub use config::Config;
pub use controller::{SearchOutcome, WeatherController, WidgetState};
pub use error::FetchError;
pub use forecast::aggregate_by_day;
pub use model::{
    CurrentWeather, DailyForecast, ForecastSlice, TemperatureUnit, icon_url, to_fahrenheit,
};
pub use provider::{WeatherProvider, provider_from_config, proxy::ProxyProvider};
