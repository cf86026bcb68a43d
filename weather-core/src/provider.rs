use crate::{
    Config,
    error::FetchError,
    model::{CurrentWeather, ForecastSlice},
    provider::proxy::ProxyProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

pub mod proxy;

/// Source of current conditions and the 3-hour forecast feed for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, FetchError>;

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSlice>, FetchError>;
}

/// Construct the proxy-backed provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    config.validate()?;

    let provider = ProxyProvider::new(
        config.proxy_url.clone(),
        config.api_key().map(str::to_owned),
        config.timeout(),
    )
    .context("Failed to build HTTP client for the weather proxy")?;

    debug!(base_url = provider.base_url(), "weather proxy client ready");
    Ok(Arc::new(provider))
}
