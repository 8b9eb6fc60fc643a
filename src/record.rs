use serde::{Deserialize, Serialize};

/// One spreadsheet row, keyed by original header. Column order is preserved
/// so unrecognized columns can be passed through to display untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    columns: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Build a record by zipping `headers` against one data row. Missing
    /// trailing cells become empty strings; cells past the last header are
    /// dropped.
    pub fn from_row(headers: &[String], cells: &[String]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or_default()))
            .collect();
        Self { columns }
    }

    /// Exact, case-sensitive lookup of the first column with this header.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve an ordered alias list: first alias present with a non-empty
    /// value wins.
    pub fn first_non_empty(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|a| self.get(a))
            .find(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Service category a record is heuristically assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    None,
    Hrt,
    Surgery,
    Therapy,
}
