use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use skycast_core::{Cache, Config, FileStore, WeatherBundle, WeatherService};
use std::{process::ExitCode, sync::Arc};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and daily forecast for any place")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Show weather for a place name.
    Show {
        /// Place name, e.g. "New York" or "Paris, FR".
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print the full result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage the on-disk cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Drop every cached geocoding and weather entry.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { query, json } => show(&query.join(" "), json).await,
            Command::Cache { action: CacheAction::Clear } => {
                let path = Config::cache_file_path()?;
                Cache::new(Arc::new(FileStore::open(&path))).clear().await?;
                println!("Cleared cache at {}", path.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(query: &str, json: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load()?.with_env_overrides();
    tracing::debug!(?config, "loaded configuration");

    let service = WeatherService::from_config(&config)?;

    match service.resolve(query).await {
        Ok(bundle) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
            } else {
                print_summary(&bundle);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, debug = ?err, query, "failed to resolve weather");
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_summary(bundle: &WeatherBundle) {
    let report = &bundle.report;
    let location = &report.location;
    let current = &report.current;

    let cached = if bundle.from_cache { " (cached)" } else { "" };
    println!(
        "{} ({:.4}, {:.4}){cached}",
        location.name, location.latitude, location.longitude
    );
    println!(
        "Updated {}",
        report.updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    println!(
        "Now: {:.1}°C, {}, {} hPa, {}% humidity, wind {:.0} km/h at {}°",
        current.temperature,
        current.condition,
        current.pressure,
        current.humidity,
        current.wind_speed,
        current.wind_direction,
    );

    for day in &report.forecast {
        println!(
            "{}  {:>5.1}°C .. {:>5.1}°C  {:<16} {} hPa  {}%",
            day.date, day.min_temperature, day.max_temperature, day.condition, day.pressure, day.humidity,
        );
    }
}
