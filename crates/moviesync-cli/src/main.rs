//! moviesync - mirrors OMDb search results into a local movie database.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::{Args, Parser, Subcommand};
use moviesync_api::omdb::OmdbClient;
use moviesync_db::{Movie, load_movie_by_imdb_id, load_movie_genres, load_movies, open_db};
use moviesync_sync::{
    FillOutcome, SearchOutcome, fill_movie_details, fill_partial_movies, search_and_save,
};
use rusqlite::Connection;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search OMDb and store the hits as partial records.
    Search(SearchArgs),
    /// Fill partial records with full OMDb details.
    Fill(FillArgs),
    /// List stored movies.
    List(ListArgs),
    /// Show one stored movie.
    Show(ShowArgs),
}

/// Arguments for the `search` subcommand.
#[derive(Args)]
struct SearchArgs {
    /// Free-text query (e.g. "Inception").
    query: String,
    /// Search even if the term was searched within the cooldown.
    #[arg(long)]
    force: bool,
}

/// Arguments for the `fill` subcommand.
#[derive(Args)]
struct FillArgs {
    /// IMDb ID of a stored movie (e.g. "tt1375666").
    #[arg(required_unless_present = "all_partial", conflicts_with = "all_partial")]
    imdb_id: Option<String>,
    /// Fill every partial record.
    #[arg(long)]
    all_partial: bool,
}

/// Arguments for the `list` subcommand.
#[derive(Args)]
struct ListArgs {
    /// Only partial records.
    #[arg(long, conflicts_with = "full")]
    partial: bool,
    /// Only full records.
    #[arg(long)]
    full: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Args)]
struct ShowArgs {
    /// IMDb ID (e.g. "tt1375666").
    imdb_id: String,
}

/// Builds an `OmdbClient` from config, with `OMDB_API_KEY` overriding the
/// configured key.
///
/// # Errors
///
/// Returns an error if no API key is available or the client fails to build.
#[instrument(skip_all)]
fn build_omdb_client(config: &AppConfig) -> Result<OmdbClient> {
    let api_key = config
        .omdb
        .resolve_api_key(std::env::var(API_KEY_ENV).ok())
        .with_context(|| {
            format!("OMDb API key is required: set {API_KEY_ENV} or omdb.api_key in config.toml")
        })?;

    let mut builder = OmdbClient::builder().api_key(api_key);
    if let Some(url) = config.omdb.base_url()? {
        builder = builder.base_url(url);
    }

    builder
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .plot(config.omdb.plot)
        .min_interval(config.omdb.min_interval())
        .build()
        .context("failed to build OMDb client")
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if config, the API request, or DB operations fail.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = AppConfig::load_for_dir(dir).context("failed to load config")?;
    let client = build_omdb_client(&config)?;
    let conn = open_db(dir).context("failed to open database")?;

    let cooldown = if args.force {
        TimeDelta::zero()
    } else {
        config.search.cooldown()
    };

    let outcome = search_and_save(&client, &conn, &args.query, cooldown, Utc::now()).await?;
    match outcome {
        SearchOutcome::Throttled { last_search } => {
            tracing::info!(
                "'{}' was searched at {}; use --force to search again",
                args.query,
                last_search.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }
        SearchOutcome::NoResults => {
            tracing::info!("No results for '{}'", args.query);
        }
        SearchOutcome::Saved {
            saved,
            created,
            skipped,
        } => {
            tracing::info!(
                "Saved {} movie(s) ({} new, {} skipped without IMDb ID)",
                saved,
                created,
                skipped,
            );
        }
    }

    Ok(())
}

/// Runs the `fill` subcommand.
///
/// # Errors
///
/// Returns an error if config, the API request, or DB operations fail, or
/// if the requested movie is not stored.
#[instrument(skip_all)]
async fn run_fill(args: &FillArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = AppConfig::load_for_dir(dir).context("failed to load config")?;
    let client = build_omdb_client(&config)?;
    let conn = open_db(dir).context("failed to open database")?;

    if args.all_partial {
        let summary = fill_partial_movies(&client, &conn).await?;
        tracing::info!(
            "Fill complete: {} filled, {} not found, {} failed",
            summary.filled,
            summary.not_found,
            summary.failed,
        );
        return Ok(());
    }

    let imdb_id = args.imdb_id.as_deref().context("IMDb ID is required")?;
    match fill_movie_details(&client, &conn, imdb_id).await? {
        FillOutcome::AlreadyFull(movie) => {
            tracing::info!("{} already has full details", movie.imdb_id);
        }
        FillOutcome::NotFound => {
            tracing::info!("OMDb has no details for {imdb_id}");
        }
        FillOutcome::Filled { movie, .. } => {
            print_movie(&conn, &movie)?;
        }
    }

    Ok(())
}

/// Runs the `list` subcommand.
///
/// # Errors
///
/// Returns an error if DB operations fail.
#[instrument(skip_all)]
fn run_list(args: &ListArgs, dir: Option<&PathBuf>) -> Result<()> {
    let conn = open_db(dir).context("failed to open database")?;
    let movies: Vec<Movie> = load_movies(&conn)
        .context("failed to load movies")?
        .into_iter()
        .filter(|m| {
            if args.partial {
                !m.is_full_record
            } else if args.full {
                m.is_full_record
            } else {
                true
            }
        })
        .collect();

    if movies.is_empty() {
        tracing::info!("No movies in database. Run `search` first.");
        return Ok(());
    }

    tracing::info!("IMDbID\t\tYear\tFull\tTitle\t\t\tGenres");
    for movie in &movies {
        let genres = load_movie_genres(&conn, movie.id)
            .with_context(|| format!("failed to load genres of {}", movie.imdb_id))?;
        let genre_names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        tracing::info!(
            "{}\t{}\t{}\t{}\t\t{}",
            movie.imdb_id,
            movie.year.as_deref().unwrap_or("-"),
            if movie.is_full_record { "yes" } else { "no" },
            movie.title,
            genre_names.join(", "),
        );
    }
    tracing::info!("Total: {} movies", movies.len());

    Ok(())
}

/// Runs the `show` subcommand.
///
/// # Errors
///
/// Returns an error if DB operations fail or the movie is not stored.
#[instrument(skip_all)]
fn run_show(args: &ShowArgs, dir: Option<&PathBuf>) -> Result<()> {
    let conn = open_db(dir).context("failed to open database")?;
    let movie = load_movie_by_imdb_id(&conn, &args.imdb_id)?
        .with_context(|| format!("movie {} is not in the database", args.imdb_id))?;
    print_movie(&conn, &movie)
}

/// Logs every stored field of `movie` with its genres.
fn print_movie(conn: &Connection, movie: &Movie) -> Result<()> {
    let genres = load_movie_genres(conn, movie.id)
        .with_context(|| format!("failed to load genres of {}", movie.imdb_id))?;
    let genre_names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();

    tracing::info!("IMDb ID: {}", movie.imdb_id);
    tracing::info!("Title: {}", movie.title);
    tracing::info!("Year: {}", movie.year.as_deref().unwrap_or("-"));
    tracing::info!(
        "Runtime: {}",
        movie
            .runtime_minutes
            .map_or_else(|| String::from("-"), |m| format!("{m} min")),
    );
    tracing::info!("Genres: {}", genre_names.join(", "));
    tracing::info!("Full record: {}", movie.is_full_record);
    tracing::info!("Plot: {}", movie.plot.as_deref().unwrap_or("-"));

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Fill(args) => run_fill(&args, dir).await,
        Commands::List(args) => run_list(&args, dir),
        Commands::Show(args) => run_show(&args, dir),
    }
}
