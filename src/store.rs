//! Flat-file reads and writes. Every write overwrites; nothing is merged with
//! earlier output.

use crate::error::{PipelineError, Result};
use crate::model::IndexManifest;
use crate::partition::SeasonBuckets;
use log::info;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.json";

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PipelineError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Pretty-printed with two-space indentation, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
            path: parent.to_owned(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| PipelineError::Serialize {
        path: path.to_owned(),
        source,
    })?;
    fs::write(path, json).map_err(|source| PipelineError::Write {
        path: path.to_owned(),
        source,
    })
}

/// Write `{out_dir}/{year}/{division}/week-{N}.json` for every bucket.
/// Returns the number of files written.
pub fn write_season(out_dir: &Path, year: i32, buckets: &SeasonBuckets) -> Result<usize> {
    let season_dir = out_dir.join(year.to_string());
    for (key, games) in buckets {
        let path = season_dir.join(key.relative_path());
        write_json(&path, games)?;
        info!("  Wrote {} ({} games)", path.display(), games.len());
    }
    Ok(buckets.len())
}

pub fn write_index(out_dir: &Path, index: &IndexManifest) -> Result<PathBuf> {
    let path = out_dir.join(INDEX_FILE);
    write_json(&path, index)?;
    info!("Wrote index to {}", path.display());
    Ok(path)
}
