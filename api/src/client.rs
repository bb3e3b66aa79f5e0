use crate::cfbd::CfbdGame;
use crate::espn::{EspnEvent, ScoreboardResponse};
use crate::{Division, RawNcaaGame, RawNflGame, SeasonGames};
use chrono::{DateTime, Datelike, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const CFBD_API: &str = "https://api.collegefootballdata.com";
const ESPN_NFL_SITE_V2: &str = "https://site.api.espn.com/apis/site/v2/sports/football/nfl";

/// Regular-season weeks requested from the ESPN scoreboard.
pub const NFL_REGULAR_SEASON_WEEKS: u32 = 18;
/// ESPN `seasontype` for the regular season.
const NFL_REGULAR_SEASON_TYPE: u8 = 2;
/// Scoreboard weeks in flight at once.
const NFL_WEEK_CONCURRENCY: usize = 6;

/// Schedule client for the college football data API (NCAA) and ESPN's public
/// scoreboard (NFL).
#[derive(Debug, Clone)]
pub struct ScheduleApi {
    client: Client,
    timeout: Duration,
    cfbd_base: String,
    espn_base: String,
    cfbd_key: Option<String>,
}

impl Default for ScheduleApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("gridmap/0.1 (schedule data generator)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            cfbd_base: CFBD_API.to_owned(),
            espn_base: ESPN_NFL_SITE_V2.to_owned(),
            cfbd_key: None,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    MissingCredentials(&'static str),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::MissingCredentials(var) => write!(f, "{var} environment variable not set"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::MissingCredentials(_) => None,
        }
    }
}

impl ScheduleApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer token for the college football API. Blank keys are ignored.
    pub fn with_cfbd_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.cfbd_key = (!key.trim().is_empty()).then_some(key);
        self
    }

    /// Point the client at different hosts (used by tests).
    pub fn with_base_urls(mut self, cfbd_base: impl Into<String>, espn_base: impl Into<String>) -> Self {
        self.cfbd_base = cfbd_base.into();
        self.espn_base = espn_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch all college divisions for each year, one season at a time.
    pub async fn fetch_ncaa(&self, years: &[i32]) -> ApiResult<SeasonGames<RawNcaaGame>> {
        let mut all = SeasonGames::new();
        for &year in years {
            info!("Fetching NCAA data for {year}...");
            let games = self.fetch_ncaa_season(year).await?;
            info!("Total NCAA games for {year}: {}", games.len());
            all.insert(year, games);
        }
        Ok(all)
    }

    /// Fetch every college division for one season concurrently.
    ///
    /// Results are concatenated in fbs, fcs, d2, d3 order. A division that
    /// fails is logged and contributes no games; only missing credentials
    /// abort the season.
    pub async fn fetch_ncaa_season(&self, year: i32) -> ApiResult<Vec<RawNcaaGame>> {
        self.require_cfbd_key()?;

        let requests = Division::COLLEGE.map(|division| self.fetch_ncaa_division(year, division));
        let results = join_all(requests).await;

        let mut games = Vec::new();
        for (division, result) in Division::COLLEGE.iter().zip(results) {
            match result {
                Ok(batch) => {
                    info!("  {}: {} games", division.as_str().to_uppercase(), batch.len());
                    games.extend(batch);
                }
                Err(e) => error!("  Error fetching {division} {year}: {e}"),
            }
        }
        Ok(games)
    }

    /// Fetch one college division for one season.
    pub async fn fetch_ncaa_division(&self, year: i32, division: Division) -> ApiResult<Vec<RawNcaaGame>> {
        let key = self.require_cfbd_key()?;
        let url = format!("{}/games?year={year}&division={division}", self.cfbd_base);
        debug!("fetching {url}");
        let raw: Vec<CfbdGame> = self.get(&url, Some(key)).await?;
        Ok(raw.into_iter().map(|g| g.into_raw(division)).collect())
    }

    /// Fetch the NFL regular season for each year.
    pub async fn fetch_nfl(&self, years: &[i32]) -> ApiResult<SeasonGames<RawNflGame>> {
        let mut all = SeasonGames::new();
        for &year in years {
            info!("Fetching NFL schedule for {year}...");
            let games = self.fetch_nfl_season(year).await;
            info!("Total NFL games for {year}: {}", games.len());
            all.insert(year, games);
        }
        Ok(all)
    }

    /// Fetch weeks 1..=18 with bounded concurrency, keeping week order.
    /// Weeks that fail are logged and skipped.
    pub async fn fetch_nfl_season(&self, year: i32) -> Vec<RawNflGame> {
        let results: Vec<(u32, ApiResult<Vec<RawNflGame>>)> = stream::iter(1..=NFL_REGULAR_SEASON_WEEKS)
            .map(|week| async move { (week, self.fetch_nfl_week(year, week).await) })
            .buffered(NFL_WEEK_CONCURRENCY)
            .collect()
            .await;

        let mut games = Vec::new();
        for (week, result) in results {
            match result {
                Ok(batch) => {
                    info!("  Week {week}: {} games", batch.len());
                    games.extend(batch);
                }
                Err(e) => error!("  Error fetching week {week}: {e}"),
            }
        }
        games
    }

    /// Fetch one scoreboard week and flatten its events.
    pub async fn fetch_nfl_week(&self, year: i32, week: u32) -> ApiResult<Vec<RawNflGame>> {
        let url = format!(
            "{}/scoreboard?seasontype={NFL_REGULAR_SEASON_TYPE}&week={week}&dates={year}",
            self.espn_base
        );
        debug!("fetching {url}");
        let raw: ScoreboardResponse = self.get(&url, None).await?;
        Ok(raw
            .events
            .unwrap_or_default()
            .iter()
            .filter_map(|event| map_nfl_event(event, week))
            .collect())
    }

    fn require_cfbd_key(&self) -> ApiResult<&str> {
        self.cfbd_key
            .as_deref()
            .ok_or(ApiError::MissingCredentials("CFBD_API_KEY"))
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> ApiResult<T> {
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json");
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    warn!("{url} returned {:?}; treating as empty", e.status());
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

/// Seasons fetched when none are requested: the current year and the next one.
pub fn default_seasons(now: DateTime<Utc>) -> Vec<i32> {
    vec![now.year(), now.year() + 1]
}

// ---------------------------------------------------------------------------
// Mapping: ESPN wire types → raw NFL records
// ---------------------------------------------------------------------------

fn map_nfl_event(event: &EspnEvent, week: u32) -> Option<RawNflGame> {
    let competition = event.competitions.as_deref().and_then(|c| c.first())?;

    let team_name = |side: &str| {
        competition
            .competitor(side)
            .and_then(|c| c.team.as_ref())
            .and_then(|t| t.display_name.clone())
    };
    let team_logo = |side: &str| {
        competition
            .competitor(side)
            .and_then(|c| c.team.as_ref())
            .and_then(|t| t.logo.clone())
    };

    let (Some(home_team), Some(away_team)) = (team_name("home"), team_name("away")) else {
        debug!(
            "skipping event {:?}: missing home/away competitor",
            event.id.as_deref().unwrap_or("?")
        );
        return None;
    };

    let venue = competition
        .venue
        .as_ref()
        .and_then(|v| v.full_name.clone())
        .unwrap_or_else(|| "TBD".to_owned());

    Some(RawNflGame {
        id: event.id.clone().unwrap_or_default(),
        week,
        date: event.date.clone(),
        name: event.name.clone(),
        short_name: event.short_name.clone(),
        home_team,
        away_team,
        home_team_logo: team_logo("home"),
        away_team_logo: team_logo("away"),
        venue: Some(venue),
    })
}
