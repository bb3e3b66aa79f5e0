/// College Football Data API wire types.
/// Endpoint: https://api.collegefootballdata.com/games?year={year}&division={division}
use crate::{Division, RawNcaaGame};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CfbdGame {
    pub id: Option<i64>,
    pub season: Option<i32>,
    pub week: Option<u32>,
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
    /// True when only the date is scheduled; the time part of `start_date` is a placeholder.
    #[serde(rename = "startTimeTBD", alias = "start_time_tbd")]
    pub start_time_tbd: Option<bool>,
    #[serde(alias = "home_team")]
    pub home_team: Option<String>,
    #[serde(alias = "away_team")]
    pub away_team: Option<String>,
    pub venue: Option<String>,
}

impl CfbdGame {
    /// Tag the game with the division it was requested under.
    pub fn into_raw(self, division: Division) -> RawNcaaGame {
        let start_date = match (self.start_date, self.start_time_tbd) {
            (Some(start), Some(true)) => start.split('T').next().map(str::to_owned),
            (start, _) => start,
        };

        RawNcaaGame {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            season: self.season,
            division: division.as_str().to_owned(),
            week: self.week,
            start_date,
            home_team: self.home_team.unwrap_or_default(),
            away_team: self.away_team.unwrap_or_default(),
            home_team_logo: None,
            away_team_logo: None,
            venue: self.venue,
        }
    }
}
