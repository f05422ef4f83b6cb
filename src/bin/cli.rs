//! Harvester CLI
//!
//! Crawls account feeds through the admin API and ranks the harvested
//! articles by keyword relevance.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use harvester::{
    error::{AppError, Result},
    models::{Article, Config, KeywordSpec},
    pipeline::{BatchOrchestrator, JitteredPacer, KeywordScorer, PaginationCrawler},
    services::{HttpContentFetcher, MpPageFetcher},
    storage::{Listing, LocalStorage, Report, ReportStorage},
    utils::{http, parse_list, read_sources},
};
use tokio_util::sync::CancellationToken;

/// Harvester - incremental account feed crawler
#[derive(Parser, Debug)]
#[command(name = "harvester", version, about = "Incremental account feed crawler")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "harvester.toml")]
    config: PathBuf,

    /// Directory reports are written to (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct KeywordArgs {
    /// Comma-separated keywords (at most 3 are used)
    #[arg(short, long)]
    keywords: Option<String>,

    /// Comma-separated weights matching the keywords
    #[arg(short, long)]
    weights: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl recent articles of every listed source
    Crawl {
        /// Source list file, one account per line
        #[arg(short, long)]
        sources: Option<PathBuf>,

        /// Articles to collect per source
        #[arg(short = 'n', long)]
        target: Option<usize>,

        /// Days to look back, today included
        #[arg(short, long)]
        days: Option<u32>,

        /// Rank each source's articles by keyword score
        #[arg(long)]
        rank: bool,

        #[command(flatten)]
        keywords: KeywordArgs,

        /// Keep articles already listed in yesterday's report
        #[arg(long)]
        no_filter: bool,

        /// Print only, do not write a report
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch the most recent articles of one source, whatever their date,
    /// and save them under `history/`
    History {
        source: String,

        /// Maximum number of articles
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Fetch one source's history, rank it by keyword score and save it
    /// under `search/`
    Search {
        source: String,

        /// Maximum number of articles
        #[arg(short, long)]
        max: Option<usize>,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Re-rank the articles of a saved report
    Rank {
        /// Report date (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        keywords: KeywordArgs,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging; `RUST_LOG` still wins over the given level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn parse_weights(arg: &str) -> Result<Vec<f64>> {
    parse_list(arg)
        .iter()
        .map(|w| {
            w.parse::<f64>()
                .map_err(|_| AppError::validation(format!("invalid weight '{}'", w)))
        })
        .collect()
}

/// Keywords and weights from the command line, falling back to the config.
fn keyword_spec(args: &KeywordArgs, config: &Config) -> Result<KeywordSpec> {
    let keywords = match &args.keywords {
        Some(arg) => parse_list(arg),
        None => config.scoring.keywords.clone(),
    };
    let weights = match (&args.weights, &args.keywords) {
        (Some(arg), _) => parse_weights(arg)?,
        (None, Some(_)) => Vec::new(),
        (None, None) => config.scoring.weights.clone(),
    };
    KeywordSpec::new(&keywords, &weights, config.scoring.max_keywords)
}

fn build_orchestrator(config: &Config, cancel: &CancellationToken) -> Result<BatchOrchestrator> {
    let client = http::create_async_client(&config.crawler)?;
    let pages = Arc::new(MpPageFetcher::new(client.clone(), config.api.clone()));
    let contents = Arc::new(HttpContentFetcher::new(client, config.content.clone()));
    let pacer =
        Arc::new(JitteredPacer::new(config.pacing.clone()).with_cancellation(cancel.clone()));

    let crawler = PaginationCrawler::new(pages, contents.clone(), pacer.clone(), &config.crawler)
        .with_cancellation(cancel.clone());
    let scorer =
        KeywordScorer::new(contents, pacer, &config.scoring).with_cancellation(cancel.clone());
    Ok(BatchOrchestrator::new(crawler, scorer, &config.crawler))
}

/// Cancel `token` on Ctrl-C so runs end with partial results.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing with what has been collected");
            token.cancel();
        }
    });
}

fn print_articles(articles: &[Article], with_score: bool) {
    let template = if with_score {
        "[{score}] {title}\n    {source} | {time}\n    {link}"
    } else {
        "{title}\n    {source} | {time}\n    {link}"
    };
    for (i, article) in articles.iter().enumerate() {
        println!("{:>3}. {}", i + 1, article.format(template));
    }
}

/// Check the configuration and report what a crawl would start with.
async fn validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    if config.api.has_credentials() {
        log::info!("✓ API credentials present");
    } else {
        log::warn!("API cookie/token missing; crawling will refuse to start");
    }
    match read_sources(&config.paths.sources_file).await {
        Ok(sources) => log::info!("✓ {} source(s) listed", sources.len()),
        Err(e) => log::warn!("{}", e),
    }
    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    config.validate()?;
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());
    let harvester = build_orchestrator(config, &cancel)?;
    let storage = LocalStorage::new(&config.paths.output_dir);
    let today = Local::now().date_naive();

    match command {
        Command::Crawl {
            sources,
            target,
            days,
            rank,
            keywords,
            no_filter,
            dry_run,
        } => {
            let path = sources.unwrap_or_else(|| PathBuf::from(&config.paths.sources_file));
            let sources = read_sources(&path).await?;
            let target = target.unwrap_or(config.crawler.articles_per_source);
            let days = days.unwrap_or(config.crawler.recent_days);

            let mut output = if rank {
                let spec = keyword_spec(&keywords, config)?;
                harvester
                    .run_and_rank_on(&sources, target, days, &spec, today)
                    .await?
            } else {
                harvester.run_batch_on(&sources, target, days, today).await?
            };

            if !no_filter {
                if let Some(yesterday) = today.checked_sub_days(Days::new(1)) {
                    let titles = storage.load_titles(yesterday).await?;
                    output.filter_existing(&titles);
                }
            }

            print_articles(&output.articles, rank);
            log::info!("{}", output.stats.message());

            if !dry_run {
                let report = Report::new(output.stats, output.articles);
                storage.write_report(&report).await?;
            }
        }

        Command::History { source, max } => {
            let max = max.unwrap_or(config.crawler.history_max);
            let report = harvester.crawler().crawl_history(&source, max).await?;
            print_articles(&report.articles, false);
            log::info!(
                "'{}': {} article(s), {}",
                report.source,
                report.articles.len(),
                report.outcome
            );
            storage
                .write_listing(Listing::History, today, &report)
                .await?;
        }

        Command::Search {
            source,
            max,
            keywords,
        } => {
            let spec = keyword_spec(&keywords, config)?;
            let max = max.unwrap_or(config.crawler.history_max);
            let report = harvester.search_source(&source, max, &spec).await?;
            print_articles(&report.articles, true);
            log::info!(
                "'{}': {} article(s) ranked by {}",
                report.source,
                report.articles.len(),
                spec.describe()
            );
            storage.write_listing(Listing::Search, today, &report).await?;
        }

        Command::Rank { date, keywords } => {
            let date = date.unwrap_or(today);
            let spec = keyword_spec(&keywords, config)?;
            let mut report = storage.load_report(date).await?.ok_or_else(|| {
                AppError::config(format!("No report for {}", date.format("%Y-%m-%d")))
            })?;

            let articles = std::mem::take(&mut report.articles);
            report.articles = harvester.scorer().rank(articles, &spec).await?;
            print_articles(&report.articles, true);
            storage.write_report(&report).await?;
        }

        Command::Validate => validate(config).await?,
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Using default configuration ({}: {})",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };
    config.apply_env();
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.display().to_string();
    }

    match cli.command {
        Command::Validate => validate(&config).await?,
        command => run(command, &config).await?,
    }

    log::info!("Done!");

    Ok(())
}
