//! Retrieves header+row data for a sheet: structured Sheets API first when a
//! key is configured, public CSV export as fallback. Failures surface as
//! data with troubleshooting hints, never as errors; retries, timeouts and
//! caching belong to the caller.

pub mod api;
pub mod export;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::record::RawRecord;

/// Which sheet tab to read: a numeric gid or a tab title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetSelector {
    Gid(u64),
    Title(String),
}

impl SheetSelector {
    /// Numeric selectors are gids, anything else is a title.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u64>() {
            Ok(gid) => SheetSelector::Gid(gid),
            Err(_) => SheetSelector::Title(raw.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub source_id: String,
    pub sheet_selector: SheetSelector,
    pub api_key: Option<String>,
    /// Base URL of the structured API; tests point this at a local server.
    pub api_base: String,
    /// Base URL of the public export endpoints.
    pub export_base: String,
}

impl SourceConfig {
    pub fn new(source_id: String, sheet_selector: SheetSelector, api_key: Option<String>) -> Self {
        Self {
            source_id,
            sheet_selector,
            api_key,
            api_base: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            export_base: "https://docs.google.com/spreadsheets/d".to_string(),
        }
    }

    /// Read `SHEET_SOURCE_ID`, `SHEET_SELECTOR` (defaults to gid 0) and
    /// `SHEETS_API_KEY` (optional) from the environment.
    pub fn from_env() -> Result<Self> {
        let source_id =
            std::env::var("SHEET_SOURCE_ID").context("SHEET_SOURCE_ID is not set")?;
        let sheet_selector = std::env::var("SHEET_SELECTOR")
            .map(|s| SheetSelector::parse(&s))
            .unwrap_or(SheetSelector::Gid(0));
        let api_key = std::env::var("SHEETS_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Self::new(source_id, sheet_selector, api_key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Api,
    CsvExport,
}

/// Caller-facing fetch result. Callers branch on the variant and can render
/// `troubleshooting` verbatim on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "success")]
pub enum FetchOutcome {
    #[serde(rename = "true")]
    Success {
        headers: Vec<String>,
        rows: Vec<RawRecord>,
        source: FetchSource,
    },
    #[serde(rename = "false")]
    Failure {
        error: String,
        troubleshooting: Vec<String>,
    },
}

/// Fetch the configured sheet.
///
/// One attempt per path, no retries: an API failure is captured and the CSV
/// export is tried next; if both fail the outcome carries the union of both
/// paths' troubleshooting hints.
#[instrument(level = "info", skip(client, config), fields(source_id = %config.source_id))]
pub async fn fetch(client: &Client, config: &SourceConfig) -> FetchOutcome {
    let mut errors: Vec<String> = Vec::new();
    let mut troubleshooting: Vec<String> = Vec::new();

    if config.api_key.is_some() {
        match api::fetch_via_api(client, config).await {
            Ok(table) => return success(table, FetchSource::Api),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "structured API fetch failed, trying CSV export");
                errors.push(format!("Sheets API: {e:#}"));
                troubleshooting.extend(api::TROUBLESHOOTING.iter().map(|s| s.to_string()));
            }
        }
    } else {
        debug!("no API key configured, skipping structured fetch");
    }

    match export::fetch_via_export(client, config).await {
        Ok(table) => success(table, FetchSource::CsvExport),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "CSV export fetch failed");
            errors.push(format!("CSV export: {e:#}"));
            troubleshooting.extend(export::TROUBLESHOOTING.iter().map(|s| s.to_string()));
            FetchOutcome::Failure {
                error: errors.join("; "),
                troubleshooting,
            }
        }
    }
}

/// First row is always the header row; the rest become records keyed by
/// header position.
fn success(rows: Vec<Vec<String>>, source: FetchSource) -> FetchOutcome {
    let mut iter = rows.into_iter();
    let headers: Vec<String> = iter.next().unwrap_or_default();
    let rows: Vec<RawRecord> = iter
        .map(|cells| RawRecord::from_row(&headers, &cells))
        .collect();
    info!(rows = rows.len(), columns = headers.len(), ?source, "fetched sheet");
    FetchOutcome::Success {
        headers,
        rows,
        source,
    }
}
