//! Raw feed record → `CanonicalGame`.
//!
//! All date and time output is computed in an explicit reference offset so a
//! run produces the same files on any machine.

use crate::model::{CanonicalGame, GameVenue};
use crate::reference::ReferenceTables;
use crate::settings::fallback_season_start;
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Weekday,
};
use log::warn;
use schedule_api::{Division, RawNcaaGame, RawNflGame};
use std::fmt;

const SECS_PER_DAY: i64 = 24 * 60 * 60;
const TBD: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Ncaa,
    Nfl,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Ncaa => f.write_str("NCAA"),
            SourceKind::Nfl => f.write_str("NFL"),
        }
    }
}

/// One raw record plus what the field mapping needs to know about where it came from.
#[derive(Debug, Clone, Copy)]
pub enum RawGame<'a> {
    /// `season_year` is the year the record was filed under; it backs up a missing `season`.
    Ncaa { game: &'a RawNcaaGame, season_year: i32 },
    Nfl(&'a RawNflGame),
}

impl RawGame<'_> {
    pub fn kind(&self) -> SourceKind {
        match self {
            RawGame::Ncaa { .. } => SourceKind::Ncaa,
            RawGame::Nfl(_) => SourceKind::Nfl,
        }
    }

    fn describe(&self) -> String {
        let (id, home, away) = match self {
            RawGame::Ncaa { game, .. } => (&game.id, &game.home_team, &game.away_team),
            RawGame::Nfl(game) => (&game.id, &game.home_team, &game.away_team),
        };
        format!("{} game {id} ({home} vs {away})", self.kind())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub tables: &'a ReferenceTables,
    /// Reference offset for kickoff, date and weekday.
    pub offset: FixedOffset,
    /// College season opener, for records without a week number.
    pub season_start: Option<NaiveDate>,
}

impl<'a> NormalizeContext<'a> {
    pub fn new(tables: &'a ReferenceTables, offset: FixedOffset) -> Self {
        Self { tables, offset, season_start: None }
    }

    pub fn with_season_start(self, season_start: NaiveDate) -> Self {
        Self { season_start: Some(season_start), ..self }
    }
}

/// Why a raw record produced no game. Expected in normal runs; never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingVenue,
    UnknownVenue(String),
    MissingDate,
    UnparseableDate(String),
    UnknownDivision(String),
    MissingWeek,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingVenue => f.write_str("missing venue"),
            Rejection::UnknownVenue(name) => write!(f, "missing venue: {name}"),
            Rejection::MissingDate => f.write_str("missing start date"),
            Rejection::UnparseableDate(raw) => write!(f, "unparseable start date: {raw:?}"),
            Rejection::UnknownDivision(tag) => write!(f, "unknown division: {tag:?}"),
            Rejection::MissingWeek => f.write_str("missing week number"),
        }
    }
}

/// Normalize one record, logging a warning and returning `None` on rejection.
pub fn normalize(raw: RawGame<'_>, ctx: &NormalizeContext<'_>) -> Option<CanonicalGame> {
    let result = match raw {
        RawGame::Ncaa { game, season_year } => normalize_ncaa(game, season_year, ctx),
        RawGame::Nfl(game) => normalize_nfl(game, ctx),
    };
    result
        .inspect_err(|rejection| warn!("Skipping {}: {rejection}", raw.describe()))
        .ok()
}

pub fn normalize_ncaa(
    raw: &RawNcaaGame,
    season_year: i32,
    ctx: &NormalizeContext<'_>,
) -> Result<CanonicalGame, Rejection> {
    let venue = resolve_venue(raw.venue.as_deref(), ctx.tables)?;
    let start = resolve_start(raw.start_date.as_deref(), ctx.offset)?;

    let division = raw
        .division
        .parse::<Division>()
        .ok()
        .filter(Division::is_college)
        .ok_or_else(|| Rejection::UnknownDivision(raw.division.clone()))?;

    // Week 0 (early kickoff weekend) is treated like a missing week.
    let week = match raw.week {
        Some(week) if week > 0 => week,
        _ => {
            let season_start = ctx
                .season_start
                .unwrap_or_else(|| fallback_season_start(season_year));
            derive_week(start.local, season_start)
        }
    };

    let season = raw.season.unwrap_or(season_year);

    Ok(CanonicalGame {
        id: format!("{season}-{division}-{}", raw.id),
        week,
        date: start.date(),
        day: day_name(start.date()).to_owned(),
        kickoff: start.kickoff(),
        home: raw.home_team.clone(),
        away: raw.away_team.clone(),
        home_logo: ctx.tables.resolve_logo(&raw.home_team, raw.home_team_logo.as_deref()),
        away_logo: ctx.tables.resolve_logo(&raw.away_team, raw.away_team_logo.as_deref()),
        venue,
        division,
    })
}

pub fn normalize_nfl(raw: &RawNflGame, ctx: &NormalizeContext<'_>) -> Result<CanonicalGame, Rejection> {
    let venue = resolve_venue(raw.venue.as_deref(), ctx.tables)?;
    let start = resolve_start(raw.date.as_deref(), ctx.offset)?;
    if raw.week == 0 {
        return Err(Rejection::MissingWeek);
    }

    Ok(CanonicalGame {
        id: format!("nfl-{}", raw.id),
        week: raw.week,
        date: start.date(),
        day: day_name(start.date()).to_owned(),
        kickoff: start.kickoff(),
        home: raw.home_team.clone(),
        away: raw.away_team.clone(),
        home_logo: ctx.tables.resolve_logo(&raw.home_team, raw.home_team_logo.as_deref()),
        away_logo: ctx.tables.resolve_logo(&raw.away_team, raw.away_team_logo.as_deref()),
        venue,
        division: Division::Nfl,
    })
}

fn resolve_venue(name: Option<&str>, tables: &ReferenceTables) -> Result<GameVenue, Rejection> {
    let name = name.filter(|n| !n.is_empty()).ok_or(Rejection::MissingVenue)?;
    let coords = tables
        .venue(name)
        .ok_or_else(|| Rejection::UnknownVenue(name.to_owned()))?;
    Ok(GameVenue {
        name: name.to_owned(),
        lat: coords.lat,
        lng: coords.lng,
    })
}

fn resolve_start(raw: Option<&str>, offset: FixedOffset) -> Result<StartTime, Rejection> {
    let raw = raw.filter(|s| !s.trim().is_empty()).ok_or(Rejection::MissingDate)?;
    parse_start(raw, offset).ok_or_else(|| Rejection::UnparseableDate(raw.to_owned()))
}

// ---------------------------------------------------------------------------
// Date / time helpers
// ---------------------------------------------------------------------------

/// A start timestamp expressed in the reference offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTime {
    /// Midnight when the source gave a date only.
    pub local: NaiveDateTime,
    pub has_time: bool,
}

impl StartTime {
    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn kickoff(&self) -> String {
        if self.has_time {
            format_clock(self.local.time())
        } else {
            TBD.to_owned()
        }
    }
}

/// Parse the start formats the feeds produce.
///
/// Timestamps carrying an offset (or `Z`) are converted into `offset`; naive
/// timestamps are taken to already be in `offset`; a bare `YYYY-MM-DD` has no time.
pub fn parse_start(raw: &str, offset: FixedOffset) -> Option<StartTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(TBD) {
        return None;
    }

    let timed = |local: NaiveDateTime| Some(StartTime { local, has_time: true });

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return timed(dt.with_timezone(&offset).naive_local());
    }

    // ESPN drops the seconds: "2025-09-05T00:20Z"
    if let Some(utc) = raw.strip_suffix(['Z', 'z'])
        && let Ok(naive) = NaiveDateTime::parse_from_str(utc, "%Y-%m-%dT%H:%M")
    {
        return timed(offset.from_utc_datetime(&naive).naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return timed(naive);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| StartTime { local: date.and_time(NaiveTime::MIN), has_time: false })
}

/// 12-hour clock with a lowercase `a`/`p`; minutes omitted on the hour.
pub fn format_clock(time: NaiveTime) -> String {
    let (hour, minute) = (time.hour(), time.minute());
    let suffix = if hour >= 12 { 'p' } else { 'a' };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    if minute == 0 {
        format!("{hour}{suffix}")
    } else {
        format!("{hour}:{minute:02}{suffix}")
    }
}

pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Calendar-week bucket relative to the season opener:
/// `max(1, ceil(days / 7))`, with partial days rounded up first.
/// Approximate near week boundaries.
pub fn derive_week(start: NaiveDateTime, season_start: NaiveDate) -> u32 {
    let elapsed = (start - season_start.and_time(NaiveTime::MIN)).num_seconds();
    if elapsed <= 0 {
        return 1;
    }
    let days = (elapsed + SECS_PER_DAY - 1) / SECS_PER_DAY;
    let week = (days + 6) / 7;
    u32::try_from(week).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Coordinates;
    use std::collections::HashMap;

    fn edt() -> FixedOffset {
        FixedOffset::west_opt(4 * 3600).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn tables() -> ReferenceTables {
        ReferenceTables::new(
            HashMap::from([
                ("Canvas Stadium".to_owned(), Coordinates { lat: 40.57, lng: -105.0885 }),
                ("Allegiant Stadium".to_owned(), Coordinates { lat: 36.0908, lng: -115.1830 }),
            ]),
            HashMap::from([("Wyoming".to_owned(), "https://logos/wyo.png".to_owned())]),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn format_kickoff(raw: Option<&str>, offset: FixedOffset) -> String {
        raw.and_then(|r| parse_start(r, offset))
            .map(|start| start.kickoff())
            .unwrap_or_else(|| TBD.to_owned())
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn csu_wyoming() -> RawNcaaGame {
        RawNcaaGame {
            id: "42".into(),
            season: Some(2025),
            division: "fbs".into(),
            week: None,
            start_date: Some("2025-09-06T19:30:00".into()),
            home_team: "Colorado State".into(),
            away_team: "Wyoming".into(),
            venue: Some("Canvas Stadium".into()),
            ..Default::default()
        }
    }

    fn raiders_broncos() -> RawNflGame {
        RawNflGame {
            id: "401772900".into(),
            week: 3,
            date: Some("2025-09-21T20:05Z".into()),
            home_team: "Las Vegas Raiders".into(),
            away_team: "Denver Broncos".into(),
            home_team_logo: Some("https://espn/lv.png".into()),
            away_team_logo: Some(String::new()),
            venue: Some("Allegiant Stadium".into()),
            ..Default::default()
        }
    }

    #[test]
    fn ncaa_record_normalizes() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt()).with_season_start(date(2025, 8, 30));
        let game = normalize_ncaa(&csu_wyoming(), 2025, &ctx).unwrap();

        assert_eq!(game.id, "2025-fbs-42");
        assert_eq!(game.date, date(2025, 9, 6));
        assert_eq!(game.day, "Saturday");
        assert_eq!(game.kickoff, "7:30p");
        assert_eq!(game.week, 2);
        assert_eq!(game.division, Division::Fbs);
        assert_eq!(game.venue, GameVenue { name: "Canvas Stadium".into(), lat: 40.57, lng: -105.0885 });
        assert_eq!(game.home_logo, None);
        assert_eq!(game.away_logo.as_deref(), Some("https://logos/wyo.png"));
    }

    #[test]
    fn normalization_is_deterministic() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt()).with_season_start(date(2025, 8, 30));
        let raw = csu_wyoming();
        assert_eq!(normalize_ncaa(&raw, 2025, &ctx), normalize_ncaa(&raw, 2025, &ctx));
        assert_eq!(normalize_nfl(&raiders_broncos(), &ctx), normalize_nfl(&raiders_broncos(), &ctx));
    }

    #[test]
    fn source_week_wins_over_derived_week() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt()).with_season_start(date(2025, 8, 30));
        let raw = RawNcaaGame { week: Some(5), ..csu_wyoming() };
        assert_eq!(normalize_ncaa(&raw, 2025, &ctx).unwrap().week, 5);

        let week_zero = RawNcaaGame { week: Some(0), ..csu_wyoming() };
        assert_eq!(normalize_ncaa(&week_zero, 2025, &ctx).unwrap().week, 2);
    }

    #[test]
    fn missing_season_falls_back_to_filed_year() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNcaaGame { season: None, ..csu_wyoming() };
        assert_eq!(normalize_ncaa(&raw, 2025, &ctx).unwrap().id, "2025-fbs-42");
    }

    #[test]
    fn unknown_venue_is_rejected() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNcaaGame { venue: Some("Hughes Stadium".into()), ..csu_wyoming() };
        assert_eq!(
            normalize_ncaa(&raw, 2025, &ctx),
            Err(Rejection::UnknownVenue("Hughes Stadium".into()))
        );
        let raw = RawNcaaGame { venue: None, ..csu_wyoming() };
        assert_eq!(normalize_ncaa(&raw, 2025, &ctx), Err(Rejection::MissingVenue));
    }

    #[test]
    fn missing_or_bad_date_is_rejected() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNcaaGame { start_date: None, ..csu_wyoming() };
        assert_eq!(normalize_ncaa(&raw, 2025, &ctx), Err(Rejection::MissingDate));

        let raw = RawNcaaGame { start_date: Some("next saturday".into()), ..csu_wyoming() };
        assert!(matches!(normalize_ncaa(&raw, 2025, &ctx), Err(Rejection::UnparseableDate(_))));

        let nfl = RawNflGame { date: None, ..raiders_broncos() };
        assert_eq!(normalize_nfl(&nfl, &ctx), Err(Rejection::MissingDate));
    }

    #[test]
    fn normalize_returns_none_on_rejection() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNcaaGame { venue: Some("Nowhere".into()), ..csu_wyoming() };
        assert!(normalize(RawGame::Ncaa { game: &raw, season_year: 2025 }, &ctx).is_none());
        assert!(normalize(RawGame::Nfl(&raiders_broncos()), &ctx).is_some());
    }

    #[test]
    fn unknown_or_pro_division_tag_is_rejected_for_college_records() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        for tag in ["naia", "nfl", ""] {
            let raw = RawNcaaGame { division: tag.into(), ..csu_wyoming() };
            assert_eq!(
                normalize_ncaa(&raw, 2025, &ctx),
                Err(Rejection::UnknownDivision(tag.into()))
            );
        }
    }

    #[test]
    fn nfl_record_normalizes_in_reference_offset() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let game = normalize_nfl(&raiders_broncos(), &ctx).unwrap();

        assert_eq!(game.id, "nfl-401772900");
        assert_eq!(game.week, 3);
        assert_eq!(game.division, Division::Nfl);
        assert_eq!(game.kickoff, "4:05p");
        assert_eq!(game.day, "Sunday");
        assert_eq!(game.home_logo.as_deref(), Some("https://espn/lv.png"));
        assert_eq!(game.away_logo, None);
    }

    #[test]
    fn nfl_record_without_week_is_rejected() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNflGame { week: 0, ..raiders_broncos() };
        assert_eq!(normalize_nfl(&raw, &ctx), Err(Rejection::MissingWeek));
    }

    #[test]
    fn late_utc_kickoff_moves_date_and_day_back() {
        let t = tables();
        let ctx = NormalizeContext::new(&t, edt());
        let raw = RawNflGame { date: Some("2025-09-05T00:20Z".into()), ..raiders_broncos() };
        let game = normalize_nfl(&raw, &ctx).unwrap();
        assert_eq!(game.date, date(2025, 9, 4));
        assert_eq!(game.day, "Thursday");
        assert_eq!(game.kickoff, "8:20p");
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(time(0, 0)), "12a");
        assert_eq!(format_clock(time(13, 30)), "1:30p");
        assert_eq!(format_clock(time(12, 0)), "12p");
        assert_eq!(format_clock(time(9, 5)), "9:05a");
        assert_eq!(format_clock(time(23, 59)), "11:59p");
    }

    #[test]
    fn kickoff_from_raw_strings() {
        assert_eq!(format_kickoff(Some("2025-09-06T00:00:00"), utc()), "12a");
        assert_eq!(format_kickoff(Some("2025-09-06T13:30:00"), utc()), "1:30p");
        assert_eq!(format_kickoff(Some("2025-09-06T23:00:00.000Z"), edt()), "7p");
        assert_eq!(format_kickoff(Some("2025-09-06"), edt()), "TBD");
        assert_eq!(format_kickoff(Some("TBD"), edt()), "TBD");
        assert_eq!(format_kickoff(Some("soon"), edt()), "TBD");
        assert_eq!(format_kickoff(None, edt()), "TBD");
    }

    #[test]
    fn kickoff_ignores_ambient_timezone() {
        let raw = Some("2025-09-06T17:00:00Z");
        assert_eq!(format_kickoff(raw, utc()), "5p");
        assert_eq!(format_kickoff(raw, edt()), "1p");
        assert_eq!(format_kickoff(raw, FixedOffset::west_opt(7 * 3600).unwrap()), "10a");
    }

    #[test]
    fn date_only_start_has_no_time() {
        let start = parse_start("2025-09-07", edt()).unwrap();
        assert!(!start.has_time);
        assert_eq!(start.date(), date(2025, 9, 7));
    }

    #[test]
    fn week_fallback_from_season_start() {
        let opener = date(2025, 8, 30);
        assert_eq!(derive_week(date(2025, 9, 7).and_time(NaiveTime::MIN), opener), 2);
        assert_eq!(derive_week(date(2025, 8, 30).and_time(NaiveTime::MIN), opener), 1);
        assert_eq!(derive_week(date(2025, 8, 28).and_time(time(19, 0)), opener), 1);
        assert_eq!(derive_week(date(2025, 9, 6).and_time(NaiveTime::MIN), opener), 1);
        assert_eq!(derive_week(date(2025, 9, 6).and_time(time(19, 30)), opener), 2);
    }

    #[test]
    fn weekday_names() {
        assert_eq!(day_name(date(2025, 9, 6)), "Saturday");
        assert_eq!(day_name(date(2025, 9, 7)), "Sunday");
        assert_eq!(day_name(date(2025, 9, 8)), "Monday");
    }
}
