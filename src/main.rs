//! Tributary command-line interface
//!
//! Runs the aggregator for a query, or for every step of a numbered plan,
//! printing each corpus and optionally collecting them into Markdown notes.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tributary::config::{load_config_with_hash, Config, CrawlMode};
use tributary::output::{MarkdownReport, ReportWriter, ResearchNotes};
use tributary::plan::{NumberedPlan, SingleStep, StepPlanner, MAX_TOTAL_STEPS};
use tributary::Aggregator;

/// Tributary: a multi-source research aggregator
///
/// Queries web search, academic, news, company-registry and encyclopedia
/// sources, crawls the top search hits, and prints one merged text corpus per
/// query.
#[derive(Parser, Debug)]
#[command(name = "tributary")]
#[command(version)]
#[command(about = "A multi-source research aggregator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured crawl mode
    #[arg(long, value_enum)]
    mode: Option<CrawlMode>,

    /// Numbered plan file; each step is aggregated in turn
    #[arg(long, value_name = "FILE")]
    plan: Option<PathBuf>,

    /// Write research notes as Markdown to this file
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write the plain-text step context (`Step:`/`Result:` pairs) to this file
    #[arg(long, value_name = "FILE")]
    context: Option<PathBuf>,

    /// Show the effective configuration and planned steps without querying
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Research query
    #[arg(value_name = "QUERY")]
    query: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let mut config = load_configuration(cli.config.as_ref())?;
    if let Some(mode) = cli.mode {
        config.aggregator.crawl_mode = mode;
    }
    config.credentials.fill_from_env();

    let question = cli.query.join(" ");
    let mut steps = match &cli.plan {
        Some(path) => {
            let plan = NumberedPlan::from_file(path)
                .with_context(|| format!("Failed to read plan {}", path.display()))?;
            if plan.is_empty() {
                bail!("Plan {} contains no numbered steps", path.display());
            }
            plan.plan(&question)?
        }
        None if question.trim().is_empty() => bail!("Provide a query or --plan FILE"),
        None => SingleStep.plan(&question)?,
    };
    if steps.len() > MAX_TOTAL_STEPS {
        tracing::warn!(
            "Plan has {} steps; only the first {} will run",
            steps.len(),
            MAX_TOTAL_STEPS
        );
        steps.truncate(MAX_TOTAL_STEPS);
    }

    if cli.dry_run {
        print_dry_run(&config, &steps);
        return Ok(());
    }

    let aggregator = Aggregator::new(config).context("Failed to initialize aggregator")?;
    let title = if question.trim().is_empty() {
        cli.plan
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    } else {
        question.clone()
    };
    let mut notes = ResearchNotes::new(title);

    for (i, step) in steps.iter().enumerate() {
        tracing::info!("Step {}/{}: {}", i + 1, steps.len(), step);
        let corpus = aggregator.aggregate(step);
        println!("=== Step {}: {} ===\n\n{}\n", i + 1, step, corpus);
        notes.record(step.as_str(), corpus);
    }

    if let Some(path) = cli.context {
        std::fs::write(&path, notes.context())
            .with_context(|| format!("Failed to write context to {}", path.display()))?;
        tracing::info!("Step context written to {}", path.display());
    }

    if let Some(path) = cli.output {
        MarkdownReport::new(&path)
            .write_report(&notes)
            .with_context(|| format!("Failed to write notes to {}", path.display()))?;
        println!("Research notes written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tributary=info,warn"),
            1 => EnvFilter::new("tributary=debug,info"),
            2 => EnvFilter::new("tributary=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the corpus
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows what a run would do
fn print_dry_run(config: &Config, steps: &[String]) {
    println!("=== Tributary Dry Run ===\n");

    println!("Aggregator:");
    println!("  Crawl mode: {}", config.aggregator.crawl_mode);
    println!("  Crawl limit: {}", config.aggregator.crawl_limit);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.retry.max_retries, config.retry.backoff_ms
    );
    println!(
        "  Timeouts: request {}ms, fetch {}ms, render {}ms",
        config.timeouts.request_ms, config.timeouts.fetch_ms, config.timeouts.render_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nEndpoints:");
    println!("  Search: {}", config.endpoints.search);
    println!("  Academic: {}", config.endpoints.academic);
    println!("  News: {}", config.endpoints.news);
    println!("  Registry: {}", config.endpoints.registry);
    println!("  Encyclopedia: {}", config.endpoints.encyclopedia);

    println!("\nCredentials:");
    println!("  {:?}", config.credentials);

    println!("\nSteps ({}):", steps.len());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    println!("\n✓ Configuration is valid");
}
