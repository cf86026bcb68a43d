use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use tracing::debug;
use weather_core::{
    Config, TemperatureUnit, WeatherController, WidgetState, config::DEFAULT_TIMEOUT_SECS,
    provider_from_config,
};

use crate::render::render_results;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup client")]
pub struct Cli {
    /// Base URL of the weather proxy; overrides the config file.
    #[arg(long, global = true)]
    pub proxy_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the proxy URL, API key, default unit and request timeout.
    Configure,

    /// Show current weather and the 3-day forecast for a city.
    Show {
        /// City name, e.g. "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        /// Display temperatures in Fahrenheit.
        #[arg(long, conflicts_with = "celsius")]
        fahrenheit: bool,

        /// Display temperatures in Celsius.
        #[arg(long)]
        celsius: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search repeatedly from a prompt; `:u` toggles the unit, `:q` quits.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(self.proxy_url),
            Command::Show { city, fahrenheit, celsius, json } => {
                let config = load_config(self.proxy_url)?;
                let unit = if fahrenheit {
                    TemperatureUnit::Fahrenheit
                } else if celsius {
                    TemperatureUnit::Celsius
                } else {
                    config.unit
                };
                show(&config, unit, &city.join(" "), json).await
            }
            Command::Interactive => {
                let config = load_config(self.proxy_url)?;
                interactive(&config).await
            }
        }
    }
}

fn load_config(proxy_url: Option<String>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = proxy_url {
        config.proxy_url = url;
    }
    config.validate()?;
    debug!(proxy_url = %config.proxy_url, unit = %config.unit, "configuration loaded");
    Ok(config)
}

fn controller(config: &Config, unit: TemperatureUnit) -> anyhow::Result<WeatherController> {
    let provider = provider_from_config(config)?;
    Ok(WeatherController::new(provider, unit))
}

async fn show(
    config: &Config,
    unit: TemperatureUnit,
    city: &str,
    json: bool,
) -> anyhow::Result<()> {
    let ctl = controller(config, unit)?;
    ctl.search(city).await;
    let state = ctl.snapshot();

    if json {
        let out = serde_json::to_string_pretty(&state).context("Failed to serialize result")?;
        println!("{out}");
    } else {
        print_results(&state);
    }

    if let Some(error) = state.error {
        bail!(error);
    }

    Ok(())
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let ctl = controller(config, config.unit)?;

    loop {
        let prompt = format!("City ({}):", ctl.unit());
        let input = match Text::new(&prompt)
            .with_help_message(":u toggles °C/°F, :q quits")
            .prompt()
        {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city"),
        };

        match input.trim() {
            ":q" => break,
            ":u" => {
                ctl.toggle_unit();
            }
            city => {
                ctl.set_city(city);
                ctl.search(city).await;
            }
        }

        let state = ctl.snapshot();
        print_results(&state);
        if let Some(error) = &state.error {
            eprintln!("{error}");
        }
    }

    Ok(())
}

fn print_results(state: &WidgetState) {
    let out = render_results(state);
    if !out.is_empty() {
        println!("{out}\n");
    }
}

fn configure(proxy_url: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_url = proxy_url.unwrap_or_else(|| config.proxy_url.clone());
    config.proxy_url = Text::new("Proxy URL:")
        .with_default(&current_url)
        .prompt()
        .context("Failed to read proxy URL")?;

    let key = Text::new("API key (blank keeps the current one, '-' removes it):")
        .prompt()
        .context("Failed to read API key")?;
    match key.trim() {
        "" => {}
        "-" => config.set_api_key(None),
        key => config.set_api_key(Some(key.to_string())),
    }

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit")?;

    let timeout = match config.timeout_secs {
        0 => DEFAULT_TIMEOUT_SECS,
        secs => secs,
    };
    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(timeout)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;

    config.validate()?;
    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
