//! `Server-Timing` serialization of a request's measurements.

use pride_core::TimingRecorder;
use serde_json::{Map, Value};

/// Header carrying the per-request measurements.
pub const SERVER_TIMING: &str = "Server-Timing";

/// Serialize all measurements plus the running total.
///
/// Format: `total;dur=12.34, cache_lookup;dur=5.67, ...` with durations in
/// milliseconds at two decimal places, labels in first-recorded order.
pub fn header_value(timing: &TimingRecorder) -> String {
    let mut parts = vec![format!("total;dur={:.2}", timing.total_ms())];
    for (label, ms) in timing.entries() {
        parts.push(format!("{label};dur={ms:.2}"));
    }
    parts.join(", ")
}

/// Flatten the measurements into one structured log value.
pub fn metrics_value(timing: &TimingRecorder) -> Value {
    let mut map = Map::new();
    map.insert("total".to_string(), rounded(timing.total_ms()));
    for (label, ms) in timing.entries() {
        map.insert(label, rounded(ms));
    }
    Value::Object(map)
}

fn rounded(ms: f64) -> Value {
    Value::from((ms * 100.0).round() / 100.0)
}
