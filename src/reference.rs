//! Static lookup tables: venue coordinates and team logo overrides.
//!
//! Both are loaded once per run and never mutated. Venue lookups are exact
//! string matches against the raw feed's venue name.

use crate::error::Result;
use crate::store::read_json;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    venues: HashMap<String, Coordinates>,
    logos: HashMap<String, String>,
}

impl ReferenceTables {
    pub fn new(venues: HashMap<String, Coordinates>, logos: HashMap<String, String>) -> Self {
        Self { venues, logos }
    }

    /// Load both tables. Either file failing to load is fatal for the run.
    pub fn load(venues_path: &Path, logos_path: &Path) -> Result<Self> {
        let venues: HashMap<String, Coordinates> = read_json(venues_path)?;
        let logos: HashMap<String, String> = read_json(logos_path)?;
        info!(
            "Loaded {} venues from {} and {} logo overrides from {}",
            venues.len(),
            venues_path.display(),
            logos.len(),
            logos_path.display()
        );
        Ok(Self::new(venues, logos))
    }

    pub fn venue(&self, name: &str) -> Option<Coordinates> {
        self.venues.get(name).copied()
    }

    pub fn logo_override(&self, team: &str) -> Option<&str> {
        self.logos.get(team).map(String::as_str)
    }

    /// Override first, then a non-empty source URL, otherwise none.
    pub fn resolve_logo(&self, team: &str, source: Option<&str>) -> Option<String> {
        self.logo_override(team)
            .or_else(|| source.filter(|url| !url.trim().is_empty()))
            .map(str::to_owned)
    }
}
