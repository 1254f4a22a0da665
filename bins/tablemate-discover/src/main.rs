//! tablemate-discover: run searches, paging and clustering over a JSON file.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tablemate_core::config::Config;
use tablemate_core::store::{FileStore, KeyValueStore, MemoryStore};
use tablemate_discovery::{DiscoveryController, DiscoveryFilter, JsonFileSource, SortOrder};
use tablemate_geo::{Coordinate, MapRegion};
use tablemate_telemetry::TelemetryConfig;

#[derive(Parser)]
#[command(name = "tablemate-discover")]
#[command(about = "Restaurant search, paging and map clustering")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to tablemate.toml lookup)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Directory for search history and the offline snapshot
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print collected metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and print the visible list
    Search {
        #[command(flatten)]
        input: Input,
        /// Pages to load beyond the first
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Cluster the map markers at a zoom level
    Cluster {
        #[command(flatten)]
        input: Input,
        /// Zoom level, log2(360 / longitude delta)
        #[arg(long, default_value_t = 14.0)]
        zoom: f64,
    },
    /// Show recent searches
    History,
}

#[derive(Args)]
struct Input {
    /// JSON array of restaurant records
    file: PathBuf,
    /// Search query; empty browses everything
    #[arg(short, long, default_value = "")]
    query: String,
    /// User position as LAT,LNG
    #[arg(long, value_parser = parse_coordinate)]
    origin: Option<Coordinate>,
    /// List order
    #[arg(long, value_enum, default_value_t = SortArg::Relevance)]
    sort: SortArg,
    /// Only this category
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    min_rating: Option<f64>,
    /// Requires --origin
    #[arg(long)]
    max_distance_km: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Distance,
    Rating,
    Reviews,
    Recommends,
    Newest,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortOrder::Relevance,
            SortArg::Distance => SortOrder::Distance,
            SortArg::Rating => SortOrder::Rating,
            SortArg::Reviews => SortOrder::ReviewCount,
            SortArg::Recommends => SortOrder::RecommendCount,
            SortArg::Newest => SortOrder::Newest,
        }
    }
}

fn parse_coordinate(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s.split_once(',').ok_or("expected LAT,LNG")?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {}", e))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("longitude: {}", e))?;
    let coord = Coordinate::new(lat, lng);
    if !coord.is_valid() {
        return Err(format!("({}, {}) is not a valid position", lat, lng));
    }
    Ok(coord)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _telemetry = tablemate_telemetry::init_with_config(TelemetryConfig {
        log_level: cli.log_level.clone(),
        ..TelemetryConfig::default()
    })?;

    let config = Config::load(cli.config.as_deref())?;
    let mut store: Box<dyn KeyValueStore> = match &cli.store {
        Some(dir) => Box::new(FileStore::new(dir.clone())?),
        None => Box::new(MemoryStore::new()),
    };

    let mut controller = DiscoveryController::new(config.schema)?;
    controller.load_history(store.as_ref());

    let output = match cli.command {
        Commands::Search { input, more } => {
            prepare(&mut controller, &input, store.as_mut())?;
            for _ in 0..more {
                if !controller.load_more() {
                    break;
                }
            }
            serde_json::json!({
                "total": controller.results().len(),
                "hasMore": controller.has_more(),
                "viewport": controller.viewport(),
                "visible": controller.visible(),
            })
        }

        Commands::Cluster { input, zoom } => {
            prepare(&mut controller, &input, store.as_mut())?;
            let center = controller
                .viewport()
                .map(|v| v.center())
                .unwrap_or_else(|| config_center(&controller));
            let region = MapRegion::new(center.latitude, center.longitude, 0.05, 360.0 / 2f64.powf(zoom))
                .context("Invalid zoom level")?;
            let outcome = controller.on_region_settled(region, Instant::now());
            tracing::debug!(?outcome, "Region settled");

            serde_json::json!({
                "zoom": controller.zoom(),
                "markers": controller.map_markers().len(),
                "clusters": controller.transitions(),
            })
        }

        Commands::History => serde_json::json!({ "recentSearches": controller.recent_searches() }),
    };

    controller.save_history(store.as_mut())?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    if cli.metrics {
        eprintln!("{}", serde_json::to_string_pretty(&tablemate_telemetry::metrics().export_json())?);
    }
    Ok(())
}

fn prepare(controller: &mut DiscoveryController, input: &Input, store: &mut dyn KeyValueStore) -> anyhow::Result<()> {
    let source = JsonFileSource::new(&input.file);
    let origin = controller
        .refresh(&source, store)
        .with_context(|| format!("Loading {}", input.file.display()))?;
    tracing::info!(?origin, "Restaurants ready");

    controller.set_origin(input.origin);
    controller.set_sort(input.sort.into());
    controller.set_filter(DiscoveryFilter {
        category: input.category.clone(),
        min_rating: input.min_rating,
        max_distance_km: input.max_distance_km,
        price_range: None,
    });
    controller.set_query(&input.query);
    Ok(())
}

fn config_center(controller: &DiscoveryController) -> Coordinate {
    controller.config().bounds.center()
}
