pub mod cfbd;
pub mod client;
pub mod espn;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Raw game contract: what the fetch layer hands to the data pipeline
// ---------------------------------------------------------------------------

/// Raw games grouped by season year. Serialized as `{ "2025": [...] }`.
pub type SeasonGames<T> = BTreeMap<i32, Vec<T>>;

/// Competitive tier. Ordered the way divisions are listed in the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Fbs,
    Fcs,
    D2,
    D3,
    Nfl,
}

impl Division {
    pub const ALL: [Division; 5] = [
        Division::Fbs,
        Division::Fcs,
        Division::D2,
        Division::D3,
        Division::Nfl,
    ];

    /// Divisions served by the college football API.
    pub const COLLEGE: [Division; 4] = [Division::Fbs, Division::Fcs, Division::D2, Division::D3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Fbs => "fbs",
            Division::Fcs => "fcs",
            Division::D2 => "d2",
            Division::D3 => "d3",
            Division::Nfl => "nfl",
        }
    }

    pub fn is_college(&self) -> bool {
        !matches!(self, Division::Nfl)
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fbs" => Ok(Division::Fbs),
            "fcs" => Ok(Division::Fcs),
            "d2" | "ii" => Ok(Division::D2),
            "d3" | "iii" => Ok(Division::D3),
            "nfl" => Ok(Division::Nfl),
            other => Err(format!("unknown division: {other:?}")),
        }
    }
}

/// One college game as produced by the fetch layer.
///
/// The division stays a raw tag here; an unknown tag rejects the single record
/// downstream instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNcaaGame {
    #[serde(default, deserialize_with = "source_id")]
    pub id: String,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, alias = "homeTeam")]
    pub home_team: String,
    #[serde(default, alias = "awayTeam")]
    pub away_team: String,
    #[serde(default, alias = "homeTeamLogo", skip_serializing_if = "Option::is_none")]
    pub home_team_logo: Option<String>,
    #[serde(default, alias = "awayTeamLogo", skip_serializing_if = "Option::is_none")]
    pub away_team_logo: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

/// One NFL game as produced by the fetch layer (flattened ESPN scoreboard event).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNflGame {
    #[serde(default, deserialize_with = "source_id")]
    pub id: String,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "shortName", skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, alias = "homeTeam")]
    pub home_team: String,
    #[serde(default, alias = "awayTeam")]
    pub away_team: String,
    #[serde(default, alias = "homeTeamLogo", skip_serializing_if = "Option::is_none")]
    pub home_team_logo: Option<String>,
    #[serde(default, alias = "awayTeamLogo", skip_serializing_if = "Option::is_none")]
    pub away_team_logo: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
}

/// Source ids arrive as numbers from CFBD and as strings from ESPN.
fn source_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SourceId {
        Text(String),
        Number(i64),
    }

    Ok(match SourceId::deserialize(deserializer)? {
        SourceId::Text(s) => s,
        SourceId::Number(n) => n.to_string(),
    })
}
