//! Batch fetch from the spreadsheet values API.

use serde::Deserialize;

use pride_core::Config;
use pride_observability::Logger;

use crate::rows;
use crate::types::{SheetData, StageKey};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// One tab per payload collection, fetched in a single batch call.
const SHEET_TABS: [&str; 4] = ["performers", "stages", "events", "parking"];

/// Error type for spreadsheet fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// The API answered with a non-success status.
    #[error("sheets API error: {status}")]
    Http { status: u16 },

    /// Transport or decode failure.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The batch answer did not contain one range per requested tab.
    #[error("unexpected batch shape: expected {expected} ranges, got {got}")]
    MissingRanges { expected: usize, got: usize },
}

#[derive(Debug, Deserialize)]
struct BatchValueResponse {
    #[serde(rename = "valueRanges")]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Client for the spreadsheet values API.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SheetsClient {
    /// Create a client against the public API.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: SHEETS_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch all tabs in one batch call and map them to domain types.
    pub async fn fetch_sheet_data(
        &self,
        config: &Config,
        log: &Logger,
    ) -> Result<SheetData, SheetsError> {
        let ranges: Vec<String> = SHEET_TABS.iter().map(|tab| format!("ranges={tab}")).collect();
        let url = format!(
            "{}/{}/values:batchGet?{}&key={}",
            self.base_url,
            config.sheet_id,
            ranges.join("&"),
            config.sheets_api_key
        );

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SheetsError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: BatchValueResponse = response.json().await?;
        let [performers, stages, events, parking] = &body.value_ranges[..] else {
            return Err(SheetsError::MissingRanges {
                expected: SHEET_TABS.len(),
                got: body.value_ranges.len(),
            });
        };

        // Stage keys gate the performers: a slot on an unknown stage is
        // a data error, not a payload entry.
        let stages = rows::parse_stages(&stages.values, log);
        let valid_stages: Vec<StageKey> = stages.iter().map(|s| s.id).collect();

        Ok(SheetData {
            performers: rows::parse_performers(&performers.values, &valid_stages, log),
            stages,
            events: rows::parse_events(&events.values, log),
            parking: rows::parse_parking(&parking.values, log),
        })
    }
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new()
    }
}
