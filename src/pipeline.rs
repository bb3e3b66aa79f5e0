use crate::error::Result;
use crate::index::build_index;
use crate::model::{CanonicalGame, IndexManifest};
use crate::normalize::{NormalizeContext, RawGame, SourceKind, normalize};
use crate::partition::{Accumulator, partition_season};
use crate::reference::ReferenceTables;
use crate::settings::SeasonStarts;
use crate::store;
use chrono::{DateTime, FixedOffset, Utc};
use log::info;
use schedule_api::{RawNcaaGame, RawNflGame, SeasonGames};
use std::path::Path;

/// Raw feeds for every season year in this run.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub ncaa: SeasonGames<RawNcaaGame>,
    pub nfl: SeasonGames<RawNflGame>,
}

impl RawDataset {
    pub fn load(ncaa_path: &Path, nfl_path: &Path) -> Result<Self> {
        Ok(Self {
            ncaa: store::read_json(ncaa_path)?,
            nfl: store::read_json(nfl_path)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineContext<'a> {
    pub tables: &'a ReferenceTables,
    pub offset: FixedOffset,
    pub season_starts: &'a SeasonStarts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub games_written: usize,
    pub rejected: usize,
    pub files_written: usize,
    pub teams: usize,
}

/// Normalize, partition and write every college year, then every NFL year,
/// then the index. Any write failure aborts the run; files already written stay.
pub fn generate(
    data: &RawDataset,
    ctx: &PipelineContext<'_>,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<(IndexManifest, RunSummary)> {
    let mut acc = Accumulator::new();
    let mut summary = RunSummary::default();

    for (&year, games) in &data.ncaa {
        info!("Processing NCAA {year}...");
        let normalize_ctx = NormalizeContext::new(ctx.tables, ctx.offset)
            .with_season_start(ctx.season_starts.for_year(year));
        let normalized: Vec<CanonicalGame> = games
            .iter()
            .filter_map(|game| normalize(RawGame::Ncaa { game, season_year: year }, &normalize_ctx))
            .collect();
        write_year(year, SourceKind::Ncaa, games.len(), normalized, &mut acc, out_dir, &mut summary)?;
    }

    for (&year, games) in &data.nfl {
        info!("Processing NFL {year}...");
        let normalize_ctx = NormalizeContext::new(ctx.tables, ctx.offset);
        let normalized: Vec<CanonicalGame> = games
            .iter()
            .filter_map(|game| normalize(RawGame::Nfl(game), &normalize_ctx))
            .collect();
        write_year(year, SourceKind::Nfl, games.len(), normalized, &mut acc, out_dir, &mut summary)?;
    }

    let index = build_index(&acc, now);
    store::write_index(out_dir, &index)?;
    summary.teams = index.teams.len();
    info!("Total teams: {}", summary.teams);

    Ok((index, summary))
}

fn write_year(
    year: i32,
    kind: SourceKind,
    raw_count: usize,
    normalized: Vec<CanonicalGame>,
    acc: &mut Accumulator,
    out_dir: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    let kept = normalized.len();
    let rejected = raw_count - kept;
    info!("  Normalized {kept} {kind} games ({rejected} rejected)");

    let buckets = partition_season(year, kind, normalized, acc);
    summary.files_written += store::write_season(out_dir, year, &buckets)?;
    summary.games_written += kept;
    summary.rejected += rejected;
    Ok(())
}
