/// ESPN API raw wire types: serde shapes for deserializing NFL scoreboard responses.
/// These are flattened into `RawNflGame` records in client.rs.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Scoreboard  (site v2 API)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub date: Option<String>, // ISO 8601, minutes precision: "2025-09-05T00:20Z"
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnCompetition {
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub venue: Option<EspnVenue>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>, // "home" | "away"
    pub team: Option<EspnTeam>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnTeam {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnVenue {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

impl EspnCompetition {
    pub fn competitor(&self, side: &str) -> Option<&EspnCompetitor> {
        self.competitors
            .iter()
            .flatten()
            .find(|c| c.home_away.as_deref() == Some(side))
    }
}
