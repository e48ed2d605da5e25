//! Domain types for the festival payload.
//!
//! Serialized field names are the public API of the JSON payload and use
//! camelCase.

use serde::{Deserialize, Serialize};

/// Identifier of a festival stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKey {
    Main,
    SchoolOfRock,
    OpenCall,
}

impl StageKey {
    /// Parse from a spreadsheet cell.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "main" => Some(Self::Main),
            "schoolofrock" => Some(Self::SchoolOfRock),
            "opencall" => Some(Self::OpenCall),
            _ => None,
        }
    }
}

/// Performance category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformerCategory {
    Music,
    Drag,
    Dance,
    Choir,
    Comedy,
    Dj,
    Theater,
    Kids,
    Other,
}

impl PerformerCategory {
    /// Parse from a spreadsheet cell.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "music" => Some(Self::Music),
            "drag" => Some(Self::Drag),
            "dance" => Some(Self::Dance),
            "choir" => Some(Self::Choir),
            "comedy" => Some(Self::Comedy),
            "dj" => Some(Self::Dj),
            "theater" => Some(Self::Theater),
            "kids" => Some(Self::Kids),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Year-round event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Community,
    Fundraiser,
    Social,
    Pride,
    Education,
}

impl EventCategory {
    /// Parse from a spreadsheet cell.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "community" => Some(Self::Community),
            "fundraiser" => Some(Self::Fundraiser),
            "social" => Some(Self::Social),
            "pride" => Some(Self::Pride),
            "education" => Some(Self::Education),
            _ => None,
        }
    }
}

/// One lineup slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub id: String,
    pub name: String,
    pub stage: StageKey,
    /// Start of the slot, e.g. `"12:00"`.
    pub start_time: String,
    pub end_time: String,
    pub category: PerformerCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_headliner: Option<bool>,
}

/// A festival stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageKey,
    pub name: String,
    pub full_name: String,
    pub location: String,
    pub color: String,
    pub emcees: Vec<String>,
}

/// A year-round community event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub location: String,
    pub description: String,
    pub category: EventCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A parking option near the festival.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLot {
    pub name: String,
    /// Walking distance description.
    pub walk: String,
    pub spaces: String,
}

/// The combined payload assembled from all spreadsheet tabs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetData {
    pub performers: Vec<Performer>,
    pub stages: Vec<Stage>,
    pub events: Vec<YearEvent>,
    pub parking: Vec<ParkingLot>,
}
