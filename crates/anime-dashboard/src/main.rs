//! Anime dashboard terminal front end.

mod render;

use anime_dashboard::export::{comparison_to_csv, rows_to_csv};
use anime_dashboard::{compare_view, search_view, top_view, AppState, Side, ViewOutcome};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{AnimeFormat, Config, ConfigSource, SearchParameters, TopCategory, TopParameters};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Also write the result table to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search anime by title
    Search {
        query: String,

        /// Minimum score (0-10); defaults to the configured value
        #[arg(long)]
        min_score: Option<f64>,

        /// Formats to include, comma separated (tv,movie,ova,special,ona,music)
        #[arg(long = "type", value_delimiter = ',')]
        formats: Vec<AnimeFormat>,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Browse top ranked anime
    Top {
        /// all, airing, popular or upcoming
        #[arg(long, default_value = "all")]
        category: TopCategory,

        #[arg(long = "type")]
        format: Option<AnimeFormat>,

        /// Minimum score (0-10); defaults to the configured value
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Compare two anime side by side
    Compare { left: String, right: String },

    /// Title suggestions for a partial name
    Suggest { term: String },
}

fn write_export(path: &Path, bytes: Vec<u8>) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    info!(path = %path.display(), "Exported CSV");
    Ok(())
}

fn report_other<T>(outcome: ViewOutcome<T>) {
    match outcome {
        ViewOutcome::Empty(message) => render::message(&message),
        ViewOutcome::Failed(message) => render::message(&format!("Error: {}", message)),
        ViewOutcome::Ready(_) => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let (mut config, source) = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.apply_env_overrides();

    // Initialize logging
    let mut log_config = shared::LogConfig::from_settings(&config.logging, "anime-dashboard");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("Anime dashboard starting");
    match source {
        ConfigSource::File => info!(config_file = %args.config.display(), "Loaded configuration"),
        ConfigSource::Defaults => {
            warn!(config_file = %args.config.display(), "Config file not found, using defaults")
        }
    }
    info!(base_url = %config.jikan.base_url, "Using Jikan API");

    let mut state = AppState::from_config(&config).context("Failed to create Jikan client")?;

    match args.command {
        Command::Search {
            query,
            min_score,
            formats,
            limit,
        } => {
            let min_score = min_score.unwrap_or(config.dashboard.search_min_score);
            let mut params = SearchParameters::new(query, min_score, &formats)?;
            if let Some(limit) = limit {
                params = params.with_limit(limit);
            }

            match search_view(&mut state, &params).await {
                ViewOutcome::Ready(report) => {
                    render::search(&report);
                    if let Some(path) = &args.export {
                        write_export(path, rows_to_csv(&report.rows)?)?;
                    }
                }
                other => report_other(other),
            }
        }
        Command::Top {
            category,
            format,
            min_score,
        } => {
            let min_score = min_score.unwrap_or(config.dashboard.top_min_score);
            let params = TopParameters::new(category, format, min_score)?;

            match top_view(&mut state, &params).await {
                ViewOutcome::Ready(report) => {
                    render::top(&report);
                    if let Some(path) = &args.export {
                        write_export(path, rows_to_csv(&report.rows)?)?;
                    }
                }
                other => report_other(other),
            }
        }
        Command::Compare { left, right } => {
            state.select(Side::Left, &left);
            state.select(Side::Right, &right);

            match compare_view(&mut state).await {
                ViewOutcome::Ready(pair) => {
                    render::comparison(&pair);
                    if let Some(path) = &args.export {
                        write_export(path, comparison_to_csv(&pair)?)?;
                    }
                }
                other => report_other(other),
            }
        }
        Command::Suggest { term } => {
            let entries = state.suggest(&term).await;
            render::suggestions(&entries);
            if args.export.is_some() {
                warn!("Suggestions have no table to export");
            }
        }
    }

    info!("Anime dashboard finished");
    Ok(())
}
