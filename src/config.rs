//! Google Sheets API configuration.
//!
//! Credentials are resolved once at startup and handed to the fetcher as a
//! [`SheetsConfig`]; nothing downstream reads the environment again.

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub const SHEET_ID_VAR: &str = "GYM_SHEET_ID";
pub const API_KEY_VAR: &str = "GYM_SHEETS_API_KEY";
pub const BASE_URL_VAR: &str = "GYM_SHEETS_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingParameter(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingParameter(name) => {
                write!(f, "missing required parameter: {name}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl SheetsConfig {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let spreadsheet_id = spreadsheet_id.into();
        let api_key = api_key.into();
        if spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::MissingParameter("spreadsheet id"));
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingParameter("API key"));
        }
        Ok(Self {
            spreadsheet_id,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve configuration from the environment and persisted settings.
    ///
    /// The `GYM_SHEET_ID` and `GYM_SHEETS_API_KEY` environment variables take
    /// precedence over values stored in the settings file. `GYM_SHEETS_BASE_URL`
    /// overrides the production endpoint and exists for testing.
    pub fn resolve(
        settings_id: Option<&str>,
        settings_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let id = std::env::var(SHEET_ID_VAR)
            .ok()
            .or_else(|| settings_id.map(|s| s.to_string()))
            .ok_or(ConfigError::MissingParameter("spreadsheet id"))?;
        let key = std::env::var(API_KEY_VAR)
            .ok()
            .or_else(|| settings_key.map(|s| s.to_string()))
            .ok_or(ConfigError::MissingParameter("API key"))?;
        let config = Self::new(id, key)?;
        Ok(match std::env::var(BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    /// URL of the values-read endpoint for one sheet tab.
    pub fn values_url(&self, sheet: &str) -> String {
        format!(
            "{}/{}/values/{}?key={}",
            self.base_url, self.spreadsheet_id, sheet, self.api_key
        )
    }
}
