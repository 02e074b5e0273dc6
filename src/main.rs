//! pagesift main entry point
//!
//! Command-line interface for turning URLs or a search query into clean,
//! model-consumable Markdown.

use clap::{Parser, Subcommand};
use pagesift::cache::DocumentCache;
use pagesift::config::{load_config_with_hash, Config};
use pagesift::search::SearchClient;
use pagesift::{ErrorKind, ExtractionOutcome, HttpRenderer, Orchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// pagesift: web pages into model-consumable Markdown
///
/// pagesift renders pages through a headless-render sidecar, selects the
/// article region with a priority-ordered selector list, and converts the
/// result to normalized Markdown. Failures are reported per URL; one bad
/// page never sinks the batch.
#[derive(Parser, Debug)]
#[command(name = "pagesift")]
#[command(version)]
#[command(about = "Web pages into model-consumable Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Bypass the document cache for this invocation
    #[arg(long)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one or more URLs and print their Markdown
    Fetch {
        /// URLs to fetch
        #[arg(value_name = "URL", required = true)]
        urls: Vec<String>,
    },

    /// Search the web and print Markdown for the top results
    Search {
        /// Search query words
        #[arg(value_name = "QUERY", required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let renderer = Arc::new(HttpRenderer::from_config(&config.render)?);
    let orchestrator = Orchestrator::new(renderer, &config);

    let cache = open_cache(&config, cli.no_cache)?;

    match cli.command {
        Command::Fetch { urls } => handle_fetch(&orchestrator, cache.as_ref(), &urls).await,
        Command::Search { query } => {
            let query = query.join(" ");
            handle_search(&orchestrator, cache.as_ref(), &config, &query).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagesift=info,warn"),
            1 => EnvFilter::new("pagesift=debug,info"),
            2 => EnvFilter::new("pagesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the document cache when configured and not bypassed
fn open_cache(config: &Config, no_cache: bool) -> anyhow::Result<Option<DocumentCache>> {
    if no_cache {
        tracing::info!("Document cache bypassed (--no-cache)");
        return Ok(None);
    }

    let Some(cache_config) = &config.cache else {
        return Ok(None);
    };

    let cache = DocumentCache::open(
        Path::new(&cache_config.database_path),
        cache_config.ttl_seconds,
    )?;
    let purged = cache.purge_stale()?;
    if purged > 0 {
        tracing::info!("Purged {} stale cache entries", purged);
    }

    Ok(Some(cache))
}

/// Runs the pipeline over URLs, serving and filling the cache around it
async fn extract_with_cache(
    orchestrator: &Orchestrator,
    cache: Option<&DocumentCache>,
    urls: &[String],
) -> anyhow::Result<Vec<ExtractionOutcome>> {
    let Some(cache) = cache else {
        return Ok(orchestrator.extract_all(urls).await);
    };

    let mut results: Vec<Option<ExtractionOutcome>> = urls.iter().map(|_| None).collect();
    let mut misses = Vec::new();
    let mut miss_indices = Vec::new();

    for (index, url) in urls.iter().enumerate() {
        match cache.lookup(url)? {
            Some(doc) => {
                results[index] = Some(ExtractionOutcome::success(doc.url, doc.markdown));
            }
            None => {
                misses.push(url.clone());
                miss_indices.push(index);
            }
        }
    }

    if !misses.is_empty() {
        tracing::info!(
            "{} of {} URLs served from cache",
            urls.len() - misses.len(),
            urls.len()
        );

        let fetched = orchestrator.extract_all(&misses).await;
        for (index, outcome) in miss_indices.into_iter().zip(fetched) {
            if let Some(markdown) = &outcome.markdown {
                if let Err(e) = cache.store(&outcome.url, markdown) {
                    tracing::warn!("Failed to cache {}: {}", outcome.url, e);
                }
            }
            results[index] = Some(outcome);
        }
    }

    Ok(results
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                ExtractionOutcome::failure(urls[index].clone(), ErrorKind::ParseFailed)
            })
        })
        .collect())
}

/// Handles the fetch subcommand: URLs in, Markdown out
async fn handle_fetch(
    orchestrator: &Orchestrator,
    cache: Option<&DocumentCache>,
    urls: &[String],
) -> anyhow::Result<()> {
    let outcomes = extract_with_cache(orchestrator, cache, urls).await?;

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.markdown {
            Some(markdown) => {
                if urls.len() > 1 {
                    println!("## {}\n", outcome.url);
                }
                println!("{}", markdown);
            }
            None => {
                failures += 1;
                report_failure(outcome);
            }
        }
    }

    if failures == outcomes.len() && !outcomes.is_empty() {
        anyhow::bail!("all {} fetches failed", failures);
    }
    Ok(())
}

/// Handles the search subcommand: query in, ranked Markdown results out
async fn handle_search(
    orchestrator: &Orchestrator,
    cache: Option<&DocumentCache>,
    config: &Config,
    query: &str,
) -> anyhow::Result<()> {
    let Some(search_config) = &config.search else {
        anyhow::bail!("the search command needs a [search] section in the configuration");
    };

    let client = SearchClient::from_config(search_config)?;
    let hits = client.search(query).await?;

    if hits.is_empty() {
        println!("No results for '{}'", query);
        return Ok(());
    }

    tracing::info!("Extracting content for {} search results", hits.len());
    let urls: Vec<String> = hits.iter().map(|hit| hit.url.clone()).collect();
    let outcomes = extract_with_cache(orchestrator, cache, &urls).await?;

    for (hit, outcome) in hits.iter().zip(&outcomes) {
        let title = if hit.title.is_empty() {
            hit.url.as_str()
        } else {
            hit.title.as_str()
        };
        println!("# {}\n", title);
        println!("<{}>\n", hit.url);

        match &outcome.markdown {
            Some(markdown) => println!("{}", markdown),
            None => {
                // The snippet is still better than nothing for a dead page
                if !hit.snippet.is_empty() {
                    println!("{}\n", hit.snippet);
                }
                report_failure(outcome);
            }
        }
    }

    Ok(())
}

/// Prints a per-URL failure to stderr without failing the batch
fn report_failure(outcome: &ExtractionOutcome) {
    let kind = outcome
        .error
        .map(|kind| kind.as_str())
        .unwrap_or("unknown");
    eprintln!("error: {}: {}", outcome.url, kind);
}
