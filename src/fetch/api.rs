//! Structured path: Google Sheets v4 API. Two round-trips — one metadata
//! call to resolve the selector to a tab title, one values call for that
//! title.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{SheetSelector, SourceConfig};

pub const TROUBLESHOOTING: &[&str] = &[
    "confirm SHEETS_API_KEY is valid and the Google Sheets API is enabled for it",
    "check that SHEET_SOURCE_ID matches the id in the spreadsheet URL",
    "make sure the tab named in SHEET_SELECTOR (or its gid) exists",
];

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub async fn fetch_via_api(client: &Client, config: &SourceConfig) -> Result<Vec<Vec<String>>> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow!("no API key configured"))?;

    let title = resolve_title(client, config, api_key).await?;
    debug!(%title, "resolved sheet tab");

    let mut url = Url::parse(&format!(
        "{}/{}/values/{}",
        config.api_base, config.source_id, title
    ))
    .context("building values URL")?;
    url.query_pairs_mut().append_pair("key", api_key);

    let range: ValueRange = get_json(client, &url).await.context("fetching sheet values")?;
    Ok(range
        .values
        .into_iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// Resolve the configured selector to a tab title via sheet metadata.
async fn resolve_title(client: &Client, config: &SourceConfig, api_key: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{}/{}", config.api_base, config.source_id))
        .context("building metadata URL")?;
    url.query_pairs_mut()
        .append_pair("key", api_key)
        .append_pair("fields", "sheets.properties");

    let meta: SpreadsheetMeta = get_json(client, &url)
        .await
        .context("fetching spreadsheet metadata")?;

    match &config.sheet_selector {
        SheetSelector::Gid(gid) => meta
            .sheets
            .iter()
            .find(|s| s.properties.sheet_id == *gid)
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| anyhow!("no tab with gid {gid}")),
        SheetSelector::Title(title) => meta
            .sheets
            .iter()
            .find(|s| s.properties.title == *title)
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| anyhow!("no tab titled {title:?}")),
    }
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, url: &Url) -> Result<T> {
    debug!(url = %redacted(url), "GET");
    Ok(client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", redacted(url)))?
        .error_for_status()
        .with_context(|| format!("non-success status from {}", redacted(url)))?
        .json::<T>()
        .await
        .with_context(|| format!("decoding JSON from {}", redacted(url)))?)
}

// Keep the API key out of logs and error chains.
fn redacted(url: &Url) -> Url {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == "key" {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    clean.query_pairs_mut().clear();
    for (k, v) in pairs {
        clean.query_pairs_mut().append_pair(&k, &v);
    }
    clean
}

/// API cells can be strings, numbers or bools; render them the way the CSV
/// export would.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_payload_decodes() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Wait Times"}},
                {"properties": {"sheetId": 1234, "title": "Archive"}}
            ]
        }))
        .unwrap();
        assert_eq!(meta.sheets[1].properties.sheet_id, 1234);
        assert_eq!(meta.sheets[0].properties.title, "Wait Times");
    }

    #[test]
    fn value_range_cells_stringify() {
        let range: ValueRange = serde_json::from_value(json!({
            "values": [["Name", "Days Out"], ["Clinic A", 7, true, null]]
        }))
        .unwrap();
        let rows: Vec<Vec<String>> = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        assert_eq!(rows[1], vec!["Clinic A", "7", "true", ""]);
    }

    #[test]
    fn missing_values_field_is_empty() {
        let range: ValueRange = serde_json::from_value(json!({})).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn api_key_is_redacted_from_urls() {
        let mut url = Url::parse("https://sheets.googleapis.com/v4/spreadsheets/abc").unwrap();
        url.query_pairs_mut().append_pair("key", "secret123");
        assert!(!redacted(&url).as_str().contains("secret123"));
    }
}
