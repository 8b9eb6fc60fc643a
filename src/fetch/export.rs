//! Fallback path: the public CSV export endpoint. Works without an API key
//! as long as the sheet is shared publicly; a sheet that is not shared
//! serves a login page, which we detect and reject.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{SheetSelector, SourceConfig};
use crate::parse::parse_delimited;

pub const TROUBLESHOOTING: &[&str] = &[
    "verify the sheet is shared publicly (anyone with the link can view)",
    "confirm SHEET_SELECTOR points at an existing tab (gid or title)",
    "open the export URL in a browser and check what it serves",
];

pub async fn fetch_via_export(client: &Client, config: &SourceConfig) -> Result<Vec<Vec<String>>> {
    let url = export_url(config)?;
    debug!(%url, "GET");
    let body = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .with_context(|| format!("non-success status from {url}"))?
        .text()
        .await
        .context("reading export body")?;

    if looks_like_html(&body) {
        bail!("export returned an HTML page instead of CSV (sheet is likely not public)");
    }
    Ok(parse_delimited(&body))
}

/// Gid selectors use the plain export endpoint; title selectors go through
/// the gviz query endpoint, which accepts a sheet name.
fn export_url(config: &SourceConfig) -> Result<Url> {
    let url = match &config.sheet_selector {
        SheetSelector::Gid(gid) => {
            let mut url = Url::parse(&format!(
                "{}/{}/export",
                config.export_base, config.source_id
            ))
            .context("building export URL")?;
            url.query_pairs_mut()
                .append_pair("format", "csv")
                .append_pair("gid", &gid.to_string());
            url
        }
        SheetSelector::Title(title) => {
            let mut url = Url::parse(&format!(
                "{}/{}/gviz/tq",
                config.export_base, config.source_id
            ))
            .context("building gviz URL")?;
            url.query_pairs_mut()
                .append_pair("tqx", "out:csv")
                .append_pair("sheet", title);
            url
        }
    };
    Ok(url)
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start().get(..15).unwrap_or(body.trim_start());
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(selector: SheetSelector) -> SourceConfig {
        SourceConfig::new("abc123".to_string(), selector, None)
    }

    #[test]
    fn gid_selector_uses_export_endpoint() {
        let url = export_url(&config(SheetSelector::Gid(77))).unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=77"
        );
    }

    #[test]
    fn title_selector_uses_gviz_endpoint() {
        let url = export_url(&config(SheetSelector::Title("Wait Times".to_string()))).unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out%3Acsv&sheet=Wait+Times"
        );
    }

    #[test]
    fn html_bodies_are_detected() {
        assert!(looks_like_html("<!DOCTYPE html><html>..."));
        assert!(looks_like_html("  <html lang=\"en\">"));
        assert!(!looks_like_html("Name,Days Out\nClinic A,7\n"));
        assert!(!looks_like_html(""));
    }
}
