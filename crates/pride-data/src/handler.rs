//! The origin handler behind the cache layer.

use async_trait::async_trait;
use serde::Serialize;

use pride_core::{Config, OriginError, OriginHandler, Request, Response, TimingRecorder};
use pride_observability::Logger;

use crate::json::json_response;
use crate::sheets::SheetsClient;
use crate::types::SheetData;

const ATTRIBUTION: &str = "Made with 🏳️‍🌈 by Keen";

#[derive(Serialize)]
struct Meta {
    attribution: &'static str,
}

#[derive(Serialize)]
struct Payload {
    #[serde(flatten)]
    data: SheetData,
    #[serde(rename = "__meta")]
    meta: Meta,
}

/// Produces the festival payload from the spreadsheet on cache misses.
pub struct PrideDataHandler {
    sheets: SheetsClient,
}

impl PrideDataHandler {
    /// Create the handler against the public spreadsheet API.
    pub fn new() -> Self {
        Self {
            sheets: SheetsClient::new(),
        }
    }

    /// Create the handler with a preconfigured client.
    pub fn with_client(sheets: SheetsClient) -> Self {
        Self { sheets }
    }
}

impl Default for PrideDataHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OriginHandler for PrideDataHandler {
    async fn handle(
        &self,
        _request: &Request,
        config: &Config,
        timing: &TimingRecorder,
    ) -> Result<Response, OriginError> {
        let log = Logger::new(config, "sheets");
        let data = timing
            .measure("sheet_fetch", self.sheets.fetch_sheet_data(config, &log))
            .await
            .map_err(OriginError::new)?;

        let payload = Payload {
            data,
            meta: Meta {
                attribution: ATTRIBUTION,
            },
        };
        json_response(&payload).map_err(OriginError::new)
    }
}
