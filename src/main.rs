use anyhow::{Context, Result};
use reqwest::Client;
use sheetscraper::{
    benchmark::compute_benchmarks,
    compare::{detect_anomalies, Severity},
    fetch::{self, FetchOutcome, SourceConfig},
    normalize::{normalize, NormalizedRecord},
};
use std::fs;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch the configured sheet, normalize it, diff against an optional
/// previous snapshot (JSON path as argv[1]) and print the current snapshot
/// as JSON on stdout. A wrapper script can persist stdout for the next run;
/// the core keeps no state of its own.
#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) config from env ──────────────────────────────────────────
    let config = SourceConfig::from_env()?;
    let previous_path = std::env::args().nth(1);

    // ─── 3) fetch ────────────────────────────────────────────────────
    let client = Client::new();
    let (rows, source) = match fetch::fetch(&client, &config).await {
        FetchOutcome::Success { rows, source, .. } => (rows, source),
        FetchOutcome::Failure {
            error,
            troubleshooting,
        } => {
            error!(%error, "fetch failed");
            for hint in &troubleshooting {
                eprintln!("  - {hint}");
            }
            std::process::exit(1);
        }
    };
    info!(rows = rows.len(), ?source, "fetched");

    // ─── 4) normalize ────────────────────────────────────────────────
    let current = normalize(&rows);

    // ─── 5) diff against previous snapshot, if given ─────────────────
    let previous: Vec<NormalizedRecord> = match previous_path {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading previous snapshot {path}"))?;
            serde_json::from_str(&text)
                .with_context(|| format!("decoding previous snapshot {path}"))?
        }
        None => Vec::new(),
    };
    for alert in detect_anomalies(&current, &previous) {
        match alert.severity {
            Severity::Critical | Severity::Warning => {
                warn!(kind = ?alert.kind, identity = %alert.identity, "{}", alert.message)
            }
            Severity::Info => info!(kind = ?alert.kind, identity = %alert.identity, "{}", alert.message),
        }
    }

    // ─── 6) benchmark summary ────────────────────────────────────────
    let benchmarks = compute_benchmarks(&current, None);
    if let Some(best) = benchmarks.first() {
        info!(
            identity = %best.identity,
            metric = ?best.metric,
            peers = best.category_size,
            "shortest wait"
        );
    }

    // ─── 7) emit snapshot ────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&current)?);
    info!("all done");
    Ok(())
}
