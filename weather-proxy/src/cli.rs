use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Text};
use tracing::{info, warn};
use weather_core::{Config, Overrides, provider_from_config, service};
use weather_proxy::{AppState, ServerConfig, start_server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-proxy", version, about = "HTTP proxy in front of the QWeather API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Upstream settings. Each one falls back to the config file when unset.
#[derive(Debug, Args)]
pub struct UpstreamArgs {
    /// QWeather API key.
    #[arg(long, env = "QWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// QWeather API host, e.g. https://devapi.qweather.com
    #[arg(long, env = "QWEATHER_API_HOST")]
    pub api_host: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, env = "QWEATHER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP proxy.
    Serve {
        #[arg(long, env = "WEATHER_PROXY_HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "WEATHER_PROXY_PORT", default_value_t = 3001)]
        port: u16,

        /// Number of past days served by /api/weather/history.
        #[arg(long)]
        history_days: Option<u32>,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },

    /// Store the API key and host in the config file.
    Configure,

    /// Print past days' weather for a city.
    History {
        /// City name, e.g. "北京" or "beijing".
        city: String,

        #[arg(long)]
        days: Option<u32>,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },
}

impl UpstreamArgs {
    fn into_overrides(self, history_days: Option<u32>) -> Overrides {
        Overrides {
            api_key: self.api_key,
            api_host: self.api_host,
            timeout_secs: self.timeout_secs,
            history_days,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port, history_days, upstream } => {
                let config = load_config(upstream.into_overrides(history_days));
                let provider = provider_from_config(&config)?;
                info!(api_host = config.api_host(), history_days = config.history_days(), "upstream configured");

                let state = Arc::new(AppState::new(Arc::from(provider), config.history_days()));
                start_server(&ServerConfig { host, port }, state).await?;
            }
            Command::Configure => configure()?,
            Command::History { city, days, upstream } => {
                let config = load_config(upstream.into_overrides(days));
                let provider = provider_from_config(&config)?;

                let history = service::historical_weather(
                    provider.as_ref(),
                    &city,
                    &Local::now(),
                    config.history_days(),
                )
                .await?;

                println!("{city}");
                for day in history {
                    println!(
                        "  {}  {:<8} {:>6} ~ {:<6}",
                        day.date, day.dominant_condition, day.min_temperature, day.max_temperature
                    );
                }
            }
        }

        Ok(())
    }
}

/// Config file merged with CLI/env overrides. An unreadable file is not fatal:
/// the environment alone may be enough.
fn load_config(overrides: Overrides) -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring config file");
        Config::default()
    });
    config.apply(overrides);
    config
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("QWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let current_host = config.api_host().to_owned();
    let api_host = Text::new("QWeather API host:")
        .with_default(&current_host)
        .prompt()
        .context("Failed to read API host")?;

    config.api_key = Some(api_key.trim().to_owned());
    config.api_host = Some(api_host.trim().to_owned());

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
