use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use tracing::info;
use weather_core::provider::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use weather_core::{
    Config, Coordinates, DEFAULT_SEARCH_LIMIT, FileStore, ForecastNormalizer, GeolocationSession,
    IpPositionProvider, LocationStore, OpenMeteoProvider, PlaceIndex, PlaceSource,
    ResolvedLocation,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit the configuration file.
    Configure,

    /// Search the place dataset by name.
    Search {
        query: String,

        /// Maximum number of results.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// Show current conditions and the daily forecast.
    Show {
        /// Place name; the best match from the dataset is used.
        place: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "place", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "place", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Print the normalized forecast as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Detect the current position from the IP address.
    Locate,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query, limit } => search(&query, limit).await,
            Command::Show {
                place,
                lat,
                lon,
                json,
            } => show(place.as_deref(), lat.zip(lon), json).await,
            Command::Locate => locate().await,
        }
    }
}

fn location_store(cfg: &Config) -> anyhow::Result<LocationStore> {
    let dir = cfg.state_dir()?;
    Ok(LocationStore::new(Arc::new(FileStore::new(dir))))
}

async fn load_index(cfg: &Config) -> anyhow::Result<PlaceIndex> {
    let dataset = cfg.dataset()?;
    let index = PlaceIndex::new(PlaceSource::from_location(dataset));
    index.load().await;
    if !index.is_ready() {
        bail!("Could not load place dataset from {dataset}");
    }
    Ok(index)
}

async fn search(query: &str, limit: usize) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let index = load_index(&cfg).await?;

    let hits = index.search(query, limit);
    if hits.is_empty() {
        println!("没有找到匹配的地点");
        return Ok(());
    }
    for place in hits {
        println!(
            "{}\t{}\t{:.4}, {:.4}",
            place.code, place.name, place.latitude, place.longitude
        );
    }
    Ok(())
}

async fn show(place: Option<&str>, coords: Option<(f64, f64)>, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let store = location_store(&cfg)?;

    let location = match (place, coords) {
        (Some(query), _) => {
            let index = load_index(&cfg).await?;
            let Some(best) = index.search(query, 1).into_iter().next() else {
                bail!("No place matches \"{query}\"");
            };
            let location = ResolvedLocation::from(best);
            store.save_last_location(&location);
            location
        }
        (None, Some((lat, lon))) => ResolvedLocation::from_coordinates(Coordinates::new(lat, lon)),
        (None, None) => store.last_location().unwrap_or_else(|| {
            ResolvedLocation::from_coordinates(Coordinates::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE))
        }),
    };
    info!(name = %location.name, "Resolved location");

    let normalizer = ForecastNormalizer::new(OpenMeteoProvider::new(cfg.forecast.endpoint.clone()))
        .with_overrides(cfg.forecast_overrides());
    let series = normalizer
        .fetch(location.latitude, location.longitude, None)
        .await
        .with_context(|| format!("Failed to fetch forecast for {}", location.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        print!("{}", render::forecast(&location, &series, cfg.forecast.past_days)?);
    }
    Ok(())
}

async fn locate() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let session = GeolocationSession::new(IpPositionProvider::default(), location_store(&cfg)?);

    let state = session.request_location().await;
    if let Some(message) = &state.error {
        eprintln!("{message}");
    }
    match state.coordinates() {
        Some(coords) => {
            println!("{:.4}, {:.4}", coords.latitude, coords.longitude);
            Ok(())
        }
        None => bail!("Position is unknown"),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let dataset = Text::new("Place dataset (path or URL):")
        .with_default(cfg.dataset.as_deref().unwrap_or_default())
        .prompt()?;
    cfg.dataset = Some(dataset.trim().to_string()).filter(|d| !d.is_empty());

    let timezone = Text::new("Timezone:")
        .with_default(&cfg.forecast.timezone)
        .prompt()?;
    let model = Text::new("Forecast model:")
        .with_default(&cfg.forecast.model)
        .prompt()?;
    cfg.forecast.timezone = timezone;
    cfg.forecast.model = model;
    cfg.forecast.past_days = CustomType::<u32>::new("Past days:")
        .with_default(cfg.forecast.past_days)
        .with_error_message("Please enter a whole number")
        .prompt()?;

    cfg.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}
