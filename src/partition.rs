use crate::model::{CanonicalGame, TeamEntry, WeekLabel};
use crate::normalize::SourceKind;
use schedule_api::Division;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// One output file within a season year: `{division}/week-{week}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    pub division: Division,
    pub week: u32,
}

impl BucketKey {
    pub fn of(game: &CanonicalGame) -> Self {
        Self { division: game.division, week: game.week }
    }

    /// Path relative to the season directory.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.division.as_str()).join(format!("week-{}.json", self.week))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/week-{}", self.division, self.week)
    }
}

/// Games of one season year, grouped per output file in source order.
pub type SeasonBuckets = BTreeMap<BucketKey, Vec<CanonicalGame>>;

/// Run-wide state folded across every season year: the team set, the week
/// labels and the years seen. Built fresh for each run.
#[derive(Debug, Default, Clone)]
pub struct Accumulator {
    teams: BTreeSet<TeamEntry>,
    weeks: BTreeMap<u32, WeekLabel>,
    years: BTreeSet<i32>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are deduplicated on all four fields.
    pub fn record_team(&mut self, entry: TeamEntry) {
        self.teams.insert(entry);
    }

    /// The first game seen for a week number labels it; later ones are ignored.
    pub fn record_week(&mut self, game: &CanonicalGame) {
        self.weeks
            .entry(game.week)
            .or_insert_with(|| WeekLabel::new(game.week, game.date));
    }

    pub fn record_year(&mut self, year: i32) {
        self.years.insert(year);
    }

    pub fn teams(&self) -> &BTreeSet<TeamEntry> {
        &self.teams
    }

    /// Ascending by week number.
    pub fn weeks(&self) -> impl Iterator<Item = &WeekLabel> {
        self.weeks.values()
    }

    /// Ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }
}

/// Group one season's normalized games into buckets and fold their teams
/// (and, for college games, week labels) into `acc`.
pub fn partition_season(
    year: i32,
    kind: SourceKind,
    games: Vec<CanonicalGame>,
    acc: &mut Accumulator,
) -> SeasonBuckets {
    acc.record_year(year);

    let mut buckets = SeasonBuckets::new();
    for game in games {
        acc.record_team(TeamEntry::new(&game.home, game.division, game.home_logo.clone()));
        acc.record_team(TeamEntry::new(&game.away, game.division, game.away_logo.clone()));
        if kind == SourceKind::Ncaa {
            acc.record_week(&game);
        }
        buckets.entry(BucketKey::of(&game)).or_default().push(game);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameVenue;
    use chrono::NaiveDate;

    fn game(id: &str, division: Division, week: u32, date: (i32, u32, u32), home: &str, away: &str) -> CanonicalGame {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        CanonicalGame {
            id: id.into(),
            week,
            date,
            day: crate::normalize::day_name(date).into(),
            kickoff: "1p".into(),
            home: home.into(),
            away: away.into(),
            home_logo: None,
            away_logo: None,
            venue: GameVenue { name: "Canvas Stadium".into(), lat: 40.57, lng: -105.0885 },
            division,
        }
    }

    #[test]
    fn games_split_by_division_and_week() {
        let mut acc = Accumulator::new();
        let buckets = partition_season(
            2025,
            SourceKind::Ncaa,
            vec![
                game("a", Division::Fbs, 1, (2025, 8, 30), "Colorado State", "Washington"),
                game("b", Division::Fbs, 2, (2025, 9, 6), "Colorado State", "Northern Colorado"),
                game("c", Division::Fbs, 1, (2025, 8, 30), "Wyoming", "Akron"),
            ],
            &mut acc,
        );

        assert_eq!(buckets.len(), 2);
        let week1 = &buckets[&BucketKey { division: Division::Fbs, week: 1 }];
        let ids: Vec<&str> = week1.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(buckets[&BucketKey { division: Division::Fbs, week: 2 }].len(), 1);
    }

    #[test]
    fn bucket_paths() {
        let key = BucketKey { division: Division::D3, week: 4 };
        assert_eq!(key.to_string(), "d3/week-4");
        assert_eq!(key.relative_path(), PathBuf::from("d3").join("week-4.json"));
        let key = BucketKey { division: Division::Nfl, week: 18 };
        assert_eq!(key.to_string(), "nfl/week-18");
    }

    #[test]
    fn identical_team_entries_collapse() {
        let mut acc = Accumulator::new();
        partition_season(
            2025,
            SourceKind::Ncaa,
            vec![
                game("a", Division::Fbs, 1, (2025, 8, 30), "Colorado State", "Washington"),
                game("b", Division::Fbs, 2, (2025, 9, 6), "Colorado State", "Wyoming"),
            ],
            &mut acc,
        );
        let names: Vec<&str> = acc.teams().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Colorado State", "Washington", "Wyoming"]);
    }

    #[test]
    fn first_week_label_wins_across_years() {
        let mut acc = Accumulator::new();
        partition_season(
            2025,
            SourceKind::Ncaa,
            vec![game("a", Division::Fbs, 1, (2025, 8, 30), "A", "B")],
            &mut acc,
        );
        partition_season(
            2026,
            SourceKind::Ncaa,
            vec![
                game("b", Division::Fcs, 1, (2026, 8, 29), "C", "D"),
                game("c", Division::Fcs, 2, (2026, 9, 5), "C", "E"),
            ],
            &mut acc,
        );

        let weeks: Vec<(u32, NaiveDate)> = acc.weeks().map(|w| (w.number, w.start_date)).collect();
        assert_eq!(
            weeks,
            vec![
                (1, NaiveDate::from_ymd_opt(2025, 8, 30).unwrap()),
                (2, NaiveDate::from_ymd_opt(2026, 9, 5).unwrap()),
            ]
        );
        assert_eq!(acc.years().collect::<Vec<_>>(), vec![2025, 2026]);
    }

    #[test]
    fn nfl_games_add_teams_but_not_week_labels() {
        let mut acc = Accumulator::new();
        let buckets = partition_season(
            2025,
            SourceKind::Nfl,
            vec![game("nfl-1", Division::Nfl, 3, (2025, 9, 21), "Las Vegas Raiders", "Denver Broncos")],
            &mut acc,
        );
        assert!(buckets.contains_key(&BucketKey { division: Division::Nfl, week: 3 }));
        assert_eq!(acc.teams().len(), 2);
        assert_eq!(acc.weeks().count(), 0);
    }
}
