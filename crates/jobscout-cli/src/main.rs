//! `jobscout` - match a resume against live job listings.

use anyhow::{Context, Result};
use clap::Parser;
use jobscout_analysis::{AnalysisClient, AnthropicAnalyzer, KeywordAnalyzer};
use jobscout_core::{AppConfig, CancellationToken, ProgressEvent, ProgressReporter};
use jobscout_pipeline::{extract, export, Pipeline, PipelineRun};
use jobscout_scraper::{CompanyFilter, SearchParams};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "Rank job listings against your resume", version)]
struct Cli {
    /// Resume to match against (PDF or plain text)
    resume: PathBuf,

    /// Search keywords; repeat for several phrases
    #[arg(short, long, required = true)]
    keywords: Vec<String>,

    /// Location to search in
    #[arg(short, long)]
    location: Option<String>,

    /// Maximum number of listings to analyze
    #[arg(long)]
    max_results: Option<usize>,

    /// Listings requested per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Search radius in miles
    #[arg(long)]
    distance: Option<u32>,

    /// Only listings posted within this many days
    #[arg(long)]
    posted_within_days: Option<u32>,

    /// Companies to keep, comma separated
    #[arg(long, default_value = "")]
    include_companies: String,

    /// Companies to drop, comma separated
    #[arg(long, default_value = "")]
    exclude_companies: String,

    /// Simultaneous analysis calls
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Cancel the run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Score with the local keyword analyzer instead of the provider
    #[arg(long)]
    offline: bool,

    /// CSV file to write; defaults to job_matches_YYYYMMDD.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of top matches to print
    #[arg(long, default_value_t = 10)]
    top: usize,
}

impl Cli {
    fn search_params(&self, config: &AppConfig) -> SearchParams {
        let mut params = SearchParams::from_config(&config.search, self.keywords.clone())
            .with_companies(CompanyFilter::parse(
                &self.include_companies,
                &self.exclude_companies,
            ));

        if let Some(location) = &self.location {
            params = params.with_location(location.clone());
        }
        if let Some(max_results) = self.max_results {
            params = params.with_max_results(max_results);
        }
        if let Some(page_size) = self.page_size {
            params = params.with_page_size(page_size);
        }
        if let Some(distance) = self.distance {
            params = params.with_distance(distance);
        }
        if let Some(days) = self.posted_within_days {
            params = params.with_posted_within_days(days);
        }
        params
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "job_matches_{}.csv",
                chrono::Local::now().format("%Y%m%d")
            ))
        })
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,jobscout=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn analyzer(config: &AppConfig, offline: bool) -> Result<Arc<dyn AnalysisClient>> {
    match config.analysis.api_key.as_deref() {
        Some(key) if !offline => {
            let client = AnthropicAnalyzer::new(key, &config.analysis)
                .context("failed to create analysis client")?;
            info!("Scoring with {}", client.model());
            Ok(Arc::new(client))
        }
        _ => {
            if !offline {
                warn!("ANTHROPIC_API_KEY not set, falling back to keyword scoring");
            }
            Ok(Arc::new(KeywordAnalyzer::new()))
        }
    }
}

/// Cancel `token` on Ctrl-C or once `timeout` elapses.
fn spawn_cancellation(token: &CancellationToken, timeout: Option<Duration>) {
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with partial results");
            on_signal.cancel();
        }
    });

    if let Some(timeout) = timeout {
        let on_timeout = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            warn!("Timed out after {:?}, finishing with partial results", timeout);
            on_timeout.cancel();
        });
    }
}

fn log_progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::PageFetched {
            page, collected, ..
        } => info!("Page {} fetched, {} listing(s) so far", page + 1, collected),
        ProgressEvent::PageFailed { page, reason } => warn!("Page {} failed: {}", page + 1, reason),
        ProgressEvent::FallbackUsed { listings } => {
            warn!("Live search returned nothing, using {} sample listing(s)", listings);
        }
        ProgressEvent::ListingAnalyzed {
            completed, total, ..
        } => info!("Analyzed {}/{}", completed, total),
        ProgressEvent::Ranked { .. } => {}
    }
}

fn print_report(run: &PipelineRun, top: usize) {
    let summary = export::summarize(&run.results);

    println!();
    println!("Run {}", run.run_id);
    println!(
        "Listings: {} fetched, {} duplicate, {} rejected, {} filtered{}",
        run.manifest.fetched,
        run.manifest.deduplicated,
        run.manifest.rejected,
        run.manifest.filtered,
        if run.manifest.used_fallback { " (sample data)" } else { "" }
    );
    println!(
        "Matches: {} scored, {} failed, {} at 80 or above",
        summary.scored, summary.failed, summary.high_matches
    );
    if let Some(average) = summary.average_score {
        println!("Average score: {average:.1}");
    }

    println!();
    for (rank, result) in run.results.iter().filter(|r| r.is_scored()).take(top).enumerate() {
        let Some(listing) = run.listing_for(result) else {
            continue;
        };
        println!(
            "{:>2}. [{:>3}] {} at {}",
            rank + 1,
            result.score,
            listing.title,
            listing.company
        );
        println!("         {}", result.rationale);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let profile = extract::load_profile(&cli.resume)
        .with_context(|| format!("failed to read resume {}", cli.resume.display()))?;
    info!("Loaded {} characters of profile text", profile.as_str().len());

    let pipeline = Pipeline::from_config(&config, analyzer(&config, cli.offline)?)?;
    let params = cli.search_params(&config);
    let concurrency = cli.concurrency.unwrap_or(config.analysis.concurrency);

    let cancel = CancellationToken::new();
    spawn_cancellation(&cancel, cli.timeout_secs.map(Duration::from_secs));

    let (progress, mut events) = ProgressReporter::channel();
    let progress_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_progress(&event);
        }
    });

    let run = pipeline
        .run(&profile, &params, concurrency, &cancel, &progress)
        .await;
    drop(progress);
    let _ = progress_log.await;
    let run = run?;

    print_report(&run, cli.top);

    let path = cli.output_path();
    let rows = export::project_to_rows(&run.results, &run.listings);
    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    export::write_csv(BufWriter::new(file), &rows)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {} row(s) to {}", rows.len(), path.display());

    Ok(())
}
