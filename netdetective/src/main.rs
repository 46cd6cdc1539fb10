// netdetective/src/main.rs
//
// netdetective: temporal pattern analysis of HTTP access logs
//
// Reads one or more `<timestamp>,<address>,<METHOD path>,<status>` logs and
// reports, per file:
//   spikes        densest recurring weekly windows
//   quiet windows weekly slots that never see traffic
//   gaps          longest real-time silences
//   weights       per-source endpoint trust from cross-source corroboration
//
// Usage:
//   netdetective access.log
//   zcat access.log.gz | netdetective -
//   netdetective --format html --output report.html access.log
//   netdetective --bucket-minutes 15 --top 5 --config netdetective.json a.log b.log

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod detectors;
mod engine;
mod events;
mod ingest;
mod report;
mod state;

use config::AnalysisConfig;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "netdetective",
    about   = "Weekly spike, quiet-window and endpoint-weight analysis of access logs",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(required = true, help = "Access log files to analyze (`-` reads stdin)")]
    paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    #[arg(long, help = "Write the report here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, help = "JSON analysis config (overridden by flags below)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Time-of-day bucket width in minutes [default: 5]")]
    bucket_minutes: Option<u32>,

    #[arg(long, help = "Entries kept per ranked list [default: 10]")]
    top: Option<usize>,

    #[arg(long, help = "Path whose failures count as failed logins [default: /login]")]
    login_path: Option<String>,

    #[arg(long, short, help = "Debug logging")]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Html,
}

// ── Config ────────────────────────────────────────────────────────────────────

async fn resolve_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut cfg = match &cli.config {
        Some(path) => AnalysisConfig::load(path).await?,
        None       => AnalysisConfig::default(),
    };
    if let Some(m) = cli.bucket_minutes { cfg.bucket_width_secs = m.saturating_mul(60); }
    if let Some(k) = cli.top            { cfg.top_k = k; }
    if let Some(p) = &cli.login_path    { cfg.login_path = p.clone(); }
    cfg.validate()?;
    Ok(cfg)
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

async fn run_file(path: &Path, cfg: &AnalysisConfig, format: Format) -> Result<String> {
    let store = if path == Path::new(ingest::STDIN_PATH) {
        ingest::load_stdin().await?
    } else {
        ingest::load_file(path).await?
    };

    let report = engine::analyze(&store, cfg);
    if report.is_empty() {
        warn!("{}: no traffic found to analyze", path.display());
    }
    Ok(match format {
        Format::Text => report::text::render_text(&report),
        Format::Json => report::to_json(&report),
        Format::Html => report::html::render_html(&report),
    })
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "netdetective=debug" } else { "netdetective=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .compact().init();

    let cfg = resolve_config(&cli).await.context("invalid configuration")?;
    info!(
        "bucket={}s top={} login_path={} files={}",
        cfg.bucket_width_secs, cfg.top_k, cfg.login_path, cli.paths.len()
    );

    let mut rendered = Vec::with_capacity(cli.paths.len());
    let mut failed   = 0usize;
    for path in &cli.paths {
        match run_file(path, &cfg, cli.format).await {
            Ok(out) => rendered.push(out),
            Err(e)  => {
                error!("{}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    // Multiple reports are concatenated in input order.
    let body = rendered.join("\n");
    match &cli.output {
        Some(out) => {
            tokio::fs::write(out, &body).await
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("report written to {}", out.display());
        }
        None => print!("{}", body),
    }

    if failed > 0 {
        bail!("{} of {} input files could not be analyzed", failed, cli.paths.len());
    }
    Ok(())
}
