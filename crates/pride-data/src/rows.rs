//! Parsing and validation of spreadsheet value grids.
//!
//! Each tab arrives as a header row followed by data rows. Rows are
//! zipped with the header into field records, then validated into domain
//! types. A row that fails validation is skipped with a warning naming
//! the tab and its spreadsheet row number; one bad row never fails the
//! batch.

use std::collections::BTreeMap;

use pride_observability::Logger;

use crate::types::{
    EventCategory, ParkingLot, Performer, PerformerCategory, Stage, StageKey, YearEvent,
};

type Record = BTreeMap<String, String>;

/// Zip a grid's header row with each data row.
///
/// Cells missing from short rows become empty strings.
pub fn rows_to_records(values: &[Vec<String>]) -> Vec<Record> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| (key.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

// Required fields use `?` at the call site; optional ones keep the Option.
fn field(record: &Record, key: &str) -> Option<String> {
    record.get(key).filter(|v| !v.is_empty()).cloned()
}

// Spreadsheet row number: 1-based plus the header row.
fn sheet_row(index: usize) -> usize {
    index + 2
}

/// Parse the `stages` tab.
pub fn parse_stages(values: &[Vec<String>], log: &Logger) -> Vec<Stage> {
    let mut stages = Vec::new();
    for (index, record) in rows_to_records(values).iter().enumerate() {
        match stage_from_record(record) {
            Some(stage) => stages.push(stage),
            None => log.warn(format!("stages: {}", sheet_row(index))),
        }
    }
    stages
}

fn stage_from_record(record: &Record) -> Option<Stage> {
    let emcees = field(record, "emcees")?
        .split(" | ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    Some(Stage {
        id: StageKey::parse(&field(record, "key")?)?,
        name: field(record, "name")?,
        full_name: field(record, "fullName")?,
        location: field(record, "location")?,
        color: field(record, "color")?,
        emcees,
    })
}

/// Parse the `performers` tab.
///
/// A performer must reference a stage key present in the parsed `stages`
/// tab; with no valid stages there is nothing to schedule against.
pub fn parse_performers(
    values: &[Vec<String>],
    valid_stages: &[StageKey],
    log: &Logger,
) -> Vec<Performer> {
    if valid_stages.is_empty() {
        return Vec::new();
    }

    let mut performers = Vec::new();
    for (index, record) in rows_to_records(values).iter().enumerate() {
        match performer_from_record(record, valid_stages, index) {
            Some(performer) => performers.push(performer),
            None => log.warn(format!("performers: {}", sheet_row(index))),
        }
    }
    performers
}

fn performer_from_record(
    record: &Record,
    valid_stages: &[StageKey],
    index: usize,
) -> Option<Performer> {
    let stage = StageKey::parse(&field(record, "stage")?)?;
    if !valid_stages.contains(&stage) {
        return None;
    }
    let is_headliner = (record.get("isHeadliner").map(String::as_str) == Some("TRUE")).then_some(true);
    Some(Performer {
        id: (index + 1).to_string(),
        name: field(record, "name")?,
        stage,
        start_time: field(record, "startTime")?,
        end_time: field(record, "endTime")?,
        category: PerformerCategory::parse(&field(record, "category")?)?,
        description: field(record, "description"),
        is_headliner,
    })
}

/// Parse the `events` tab.
pub fn parse_events(values: &[Vec<String>], log: &Logger) -> Vec<YearEvent> {
    let mut events = Vec::new();
    for (index, record) in rows_to_records(values).iter().enumerate() {
        match event_from_record(record, index) {
            Some(event) => events.push(event),
            None => log.warn(format!("events: {}", sheet_row(index))),
        }
    }
    events
}

fn event_from_record(record: &Record, index: usize) -> Option<YearEvent> {
    Some(YearEvent {
        id: (index + 1).to_string(),
        title: field(record, "title")?,
        date: field(record, "date")?,
        time: field(record, "time"),
        location: field(record, "location")?,
        description: field(record, "description")?,
        category: EventCategory::parse(&field(record, "category")?)?,
        link: field(record, "link"),
    })
}

/// Parse the `parking` tab.
pub fn parse_parking(values: &[Vec<String>], log: &Logger) -> Vec<ParkingLot> {
    let mut lots = Vec::new();
    for (index, record) in rows_to_records(values).iter().enumerate() {
        match parking_from_record(record) {
            Some(lot) => lots.push(lot),
            None => log.warn(format!("parking: {}", sheet_row(index))),
        }
    }
    lots
}

fn parking_from_record(record: &Record) -> Option<ParkingLot> {
    Some(ParkingLot {
        name: field(record, "name")?,
        walk: field(record, "walk")?,
        spaces: field(record, "spaces")?,
    })
}
