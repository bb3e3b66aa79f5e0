use crate::error::{PipelineError, Result};
use chrono::{FixedOffset, NaiveDate};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// US Eastern daylight time.
pub const DEFAULT_UTC_OFFSET: &str = "-04:00";

const NCAA_RAW_FILE: &str = "ncaa-raw.json";
const NFL_RAW_FILE: &str = "nfl-raw.json";

/// Paths and formatting options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Directory holding ncaa-raw.json and nfl-raw.json
    #[arg(long, global = true, env = "GRIDMAP_RAW_DIR", default_value = "build-data")]
    pub raw_dir: PathBuf,

    /// Output directory for the generated data tree
    #[arg(long = "out", global = true, env = "GRIDMAP_OUT_DIR", default_value = "public/data")]
    pub out_dir: PathBuf,

    /// Venue reference table (venue name -> {lat, lng})
    #[arg(long, global = true, env = "GRIDMAP_VENUES", default_value = "data/venues.json")]
    pub venues: PathBuf,

    /// Logo override table (team name -> logo URL)
    #[arg(long, global = true, env = "GRIDMAP_LOGOS", default_value = "data/team-logos.json")]
    pub logos: PathBuf,

    /// Reference UTC offset used for kickoff times, dates and weekdays
    #[arg(long, global = true, env = "GRIDMAP_UTC_OFFSET", default_value = DEFAULT_UTC_OFFSET, allow_hyphen_values = true)]
    pub utc_offset: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub venues_path: PathBuf,
    pub logos_path: PathBuf,
    pub utc_offset: FixedOffset,
    pub season_starts: SeasonStarts,
}

impl Settings {
    pub fn load(args: &SettingsArgs) -> Result<Self> {
        Ok(Self {
            raw_dir: args.raw_dir.clone(),
            out_dir: args.out_dir.clone(),
            venues_path: args.venues.clone(),
            logos_path: args.logos.clone(),
            utc_offset: parse_utc_offset(&args.utc_offset)?,
            season_starts: SeasonStarts::default(),
        })
    }

    pub fn ncaa_raw_path(&self) -> PathBuf {
        self.raw_dir.join(NCAA_RAW_FILE)
    }

    pub fn nfl_raw_path(&self) -> PathBuf {
        self.raw_dir.join(NFL_RAW_FILE)
    }
}

/// Opening date of each college season, used to back-derive week numbers.
#[derive(Debug, Clone)]
pub struct SeasonStarts(BTreeMap<i32, NaiveDate>);

impl Default for SeasonStarts {
    fn default() -> Self {
        let known = [(2025, 8, 30), (2026, 8, 29)];
        Self(
            known
                .into_iter()
                .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).map(|date| (y, date)))
                .collect(),
        )
    }
}

impl SeasonStarts {
    pub fn for_year(&self, year: i32) -> NaiveDate {
        self.0
            .get(&year)
            .copied()
            .unwrap_or_else(|| fallback_season_start(year))
    }
}

/// College seasons usually open on the last weekend of August.
pub fn fallback_season_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 8, 30).unwrap_or(NaiveDate::MIN)
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM`, `Z` or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let invalid = || PipelineError::InvalidOffset(raw.to_owned());
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
