use chrono::NaiveDate;
use schedule_api::Division;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Output domain types: the shapes the map front-end reads
// ---------------------------------------------------------------------------

/// Venue copied out of the reference table when the game is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameVenue {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Source-agnostic game record written to the per-week files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalGame {
    pub id: String,
    pub week: u32,
    pub date: NaiveDate,
    pub day: String,
    pub kickoff: String,
    pub home: String,
    pub away: String,
    pub home_logo: Option<String>,
    pub away_logo: Option<String>,
    pub venue: GameVenue,
    pub division: Division,
}

/// Team as listed in the index. Display names are the join key across files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    pub division: Division,
    pub abbreviation: String,
    pub logo: Option<String>,
}

impl TeamEntry {
    pub fn new(name: &str, division: Division, logo: Option<String>) -> Self {
        Self {
            name: name.to_owned(),
            division,
            abbreviation: abbreviate(name),
            logo,
        }
    }
}

/// First three characters, uppercased. Not an official abbreviation.
pub fn abbreviate(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekLabel {
    pub number: u32,
    pub start_date: NaiveDate,
    pub label: String,
}

impl WeekLabel {
    pub fn new(number: u32, start_date: NaiveDate) -> Self {
        Self {
            number,
            start_date,
            label: format!("Week {number}"),
        }
    }
}

/// Contents of `index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    pub season: i32,
    pub last_updated: String,
    pub weeks: Vec<WeekLabel>,
    pub divisions: Vec<Division>,
    pub teams: Vec<TeamEntry>,
    /// Season years present in this run's input.
    pub years: Vec<i32>,
}
