use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{CurrentWeather, ForecastSlice},
};

use super::WeatherProvider;

const WEATHER_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";
const FORECAST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the local proxy that fronts the OpenWeather API.
///
/// The proxy forwards `city` and `appid` upstream and returns the provider's
/// JSON unchanged, so the response shapes below follow OpenWeather's.
#[derive(Debug, Clone)]
pub struct ProxyProvider {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl ProxyProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { base_url, api_key, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        city: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/api/{endpoint}", self.base_url);

        let mut query = vec![("city", city)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("appid", key));
        }

        debug!(%url, city, "requesting {endpoint}");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    #[serde(default)]
    base: String,
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
    visibility: Option<u32>,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwForecastCondition>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwCurrentResponse> for CurrentWeather {
    fn from(raw: OwCurrentResponse) -> Self {
        let (condition, description, icon) = match raw.weather.into_iter().next() {
            Some(w) => (w.main, w.description, w.icon),
            None => ("Unknown".to_string(), "Unknown".to_string(), String::new()),
        };

        CurrentWeather {
            location_name: raw.name,
            country: raw.sys.country,
            latitude: raw.coord.lat,
            longitude: raw.coord.lon,
            temperature_c: raw.main.temp,
            feels_like_c: raw.main.feels_like,
            temp_min_c: raw.main.temp_min,
            temp_max_c: raw.main.temp_max,
            humidity_pct: raw.main.humidity,
            pressure_hpa: raw.main.pressure,
            wind_speed_mps: raw.wind.speed,
            wind_direction_deg: raw.wind.deg,
            cloudiness_pct: raw.clouds.all,
            visibility_m: raw.visibility,
            sunrise: unix_to_utc(raw.sys.sunrise),
            sunset: unix_to_utc(raw.sys.sunset),
            condition,
            description,
            icon,
            base: raw.base,
            observation_time: unix_to_utc(raw.dt),
        }
    }
}

impl TryFrom<OwForecastEntry> for ForecastSlice {
    type Error = FetchError;

    fn try_from(raw: OwForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = NaiveDateTime::parse_from_str(&raw.dt_txt, FORECAST_TIMESTAMP_FORMAT)
            .map_err(|_| FetchError::Timestamp(raw.dt_txt.clone()))?;

        let (description, icon) = match raw.weather.into_iter().next() {
            Some(w) => (w.description, w.icon),
            None => ("Unknown".to_string(), String::new()),
        };

        Ok(ForecastSlice {
            timestamp,
            temp_min_c: raw.main.temp_min,
            temp_max_c: raw.main.temp_max,
            description,
            icon,
        })
    }
}

#[async_trait]
impl WeatherProvider for ProxyProvider {
    async fn current_weather(&self, city: &str) -> Result<CurrentWeather, FetchError> {
        let raw: OwCurrentResponse = self.get_json(WEATHER_ENDPOINT, city).await?;
        Ok(raw.into())
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSlice>, FetchError> {
        let raw: OwForecastResponse = self.get_json(FORECAST_ENDPOINT, city).await?;
        raw.list.into_iter().map(ForecastSlice::try_from).collect()
    }
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn maps_current_response() {
        let raw: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
            "base": "stations",
            "main": {
                "temp": 12.3, "feels_like": 11.1, "temp_min": 10.0, "temp_max": 14.2,
                "pressure": 1012, "humidity": 81
            },
            "visibility": 10000,
            "wind": { "speed": 4.1, "deg": 230 },
            "clouds": { "all": 75 },
            "dt": 1700000000,
            "sys": { "country": "GB", "sunrise": 1699946000, "sunset": 1699979000 },
            "name": "London"
        }))
        .unwrap();

        let weather = CurrentWeather::from(raw);
        assert_eq!(weather.location_name, "London");
        assert_eq!(weather.country, "GB");
        assert_eq!(weather.condition, "Rain");
        assert_eq!(weather.description, "light rain");
        assert_eq!(weather.icon, "10d");
        assert_eq!(weather.pressure_hpa, 1012);
        assert_eq!(weather.wind_direction_deg, 230);
        assert_eq!(weather.cloudiness_pct, 75);
        assert_eq!(weather.visibility_m, Some(10000));
        assert_eq!(weather.observation_time.timestamp(), 1_700_000_000);
        assert_eq!(weather.sunset.timestamp(), 1_699_979_000);
    }

    #[test]
    fn current_without_conditions_is_unknown() {
        let raw: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "coord": { "lon": 0.0, "lat": 0.0 },
            "weather": [],
            "main": {
                "temp": 1.0, "feels_like": 1.0, "temp_min": 1.0, "temp_max": 1.0,
                "pressure": 1000, "humidity": 50
            },
            "wind": { "speed": 0.0 },
            "clouds": { "all": 0 },
            "dt": 0,
            "sys": { "sunrise": 0, "sunset": 0 },
            "name": "Nowhere"
        }))
        .unwrap();

        let weather = CurrentWeather::from(raw);
        assert_eq!(weather.condition, "Unknown");
        assert_eq!(weather.visibility_m, None);
        assert_eq!(weather.base, "");
    }

    #[test]
    fn forecast_entry_takes_date_from_dt_txt() {
        let raw: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt_txt": "2024-01-02 21:00:00",
            "main": { "temp_min": -1.5, "temp_max": 3.0 },
            "weather": [{ "description": "snow", "icon": "13n" }]
        }))
        .unwrap();

        let slice = ForecastSlice::try_from(raw).unwrap();
        assert_eq!(slice.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(slice.description, "snow");
    }

    #[test]
    fn forecast_entry_with_bad_timestamp_fails() {
        let raw: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt_txt": "tomorrow",
            "main": { "temp_min": 0.0, "temp_max": 1.0 },
            "weather": []
        }))
        .unwrap();

        let err = ForecastSlice::try_from(raw).unwrap_err();
        assert!(matches!(err, FetchError::Timestamp(ref s) if s == "tomorrow"));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let provider =
            ProxyProvider::new("http://localhost:8000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8000");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
