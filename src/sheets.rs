//! HTTP fetcher for the Sheets values-read endpoint.

use serde::Deserialize;

use crate::config::SheetsConfig;

#[derive(Debug)]
pub enum FetchError {
    Status(u16, String),
    Transport(Box<ureq::Error>),
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Status(code, body) => write!(f, "HTTP {code}: {body}"),
            FetchError::Transport(e) => write!(f, "transport error: {e}"),
            FetchError::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(&**e),
            FetchError::Status(..) | FetchError::Malformed(_) => None,
        }
    }
}

/// Response body of the values endpoint. Cells arrive as strings; the first
/// row is the sheet header.
#[derive(Debug, Deserialize)]
struct ValueRange {
    values: Option<Vec<Vec<String>>>,
}

fn fetch_values_with_url(url: &str) -> Result<Vec<Vec<String>>, FetchError> {
    let response = ureq::get(url).set("Accept", "application/json").call();
    let body = match response {
        Ok(r) => r
            .into_string()
            .map_err(|e| FetchError::Malformed(e.to_string()))?,
        Err(ureq::Error::Status(code, r)) => {
            let body = r.into_string().unwrap_or_default();
            return Err(FetchError::Status(code, body));
        }
        Err(e) => return Err(FetchError::Transport(Box::new(e))),
    };
    let range: ValueRange =
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    range
        .values
        .ok_or_else(|| FetchError::Malformed("response has no 'values' field".into()))
}

/// Fetch the raw rows of one sheet tab.
///
/// A single GET, no retries. An empty or header-only tab is returned as-is;
/// deciding whether that constitutes "no data" is the parser's job.
pub fn fetch_rows(config: &SheetsConfig, sheet: &str) -> Result<Vec<Vec<String>>, FetchError> {
    log::info!("Fetching sheet '{sheet}' from spreadsheet {}", config.spreadsheet_id);
    fetch_values_with_url(&config.values_url(sheet))
}
