//! Origin data handler for the pride data edge service.
//!
//! This crate provides:
//! - `PrideDataHandler` - The origin handler behind the cache layer
//! - `SheetsClient` - Batch fetch from the spreadsheet values API
//! - Row-grid parsing and validation into domain types
//! - `json_response` - ETagged JSON response construction

mod handler;
mod json;
mod rows;
mod sheets;
mod types;

pub use handler::*;
pub use json::*;
pub use rows::*;
pub use sheets::*;
pub use types::*;
