use crate::model::{IndexManifest, TeamEntry};
use crate::partition::Accumulator;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use log::warn;
use schedule_api::Division;
use std::cmp::Ordering;

/// Finalize a run's accumulator into the manifest.
///
/// `season` and `lastUpdated` come from `now`, not from the data; `years`
/// lists the seasons actually processed.
pub fn build_index(acc: &Accumulator, now: DateTime<Utc>) -> IndexManifest {
    let mut teams: Vec<TeamEntry> = acc.teams().iter().cloned().collect();
    teams.sort_by(|a, b| compare_names(&a.name, &b.name));
    report_conflicting_teams(&teams);

    IndexManifest {
        season: now.year(),
        last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        weeks: acc.weeks().cloned().collect(),
        divisions: Division::ALL.to_vec(),
        teams,
        years: acc.years().collect(),
    }
}

/// Dictionary-style ordering: accents and case are ignored first. Ties go to
/// the unaccented spelling, then to lowercase before uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(case_key(b)))
}

fn accent_key(name: &str) -> String {
    name.chars().flat_map(char::to_lowercase).collect()
}

fn case_key(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.chars().map(char::is_uppercase)
}

fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ø' => 'o',
            'ñ' | 'ń' => 'n',
            'ç' | 'č' | 'ć' => 'c',
            'š' | 'ś' => 's',
            'ž' | 'ź' | 'ż' => 'z',
            'ý' | 'ÿ' => 'y',
            'ł' => 'l',
            other => other,
        })
        .collect()
}

/// Full-field dedup keeps one entry per (name, division, logo) combination, so
/// a team whose division or logo differs between games is listed twice.
/// Surface those so the reference tables can be fixed.
fn report_conflicting_teams(sorted: &[TeamEntry]) {
    for group in sorted.chunk_by(|a, b| a.name == b.name) {
        if group.len() > 1 {
            let variants: Vec<String> = group
                .iter()
                .map(|t| format!("{}:{}", t.division, t.logo.as_deref().unwrap_or("no logo")))
                .collect();
            warn!(
                "Team {:?} is listed {} times: {}",
                group[0].name,
                group.len(),
                variants.join(", ")
            );
        }
    }
}
