mod error;
mod index;
mod model;
mod normalize;
mod partition;
mod pipeline;
mod reference;
mod settings;
mod store;

use crate::pipeline::{PipelineContext, RawDataset};
use crate::reference::ReferenceTables;
use crate::settings::{Settings, SettingsArgs};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use schedule_api::client::{ScheduleApi, default_seasons};

#[derive(Parser)]
#[command(name = "gridmap", version)]
#[command(about = "College football and NFL schedules as static JSON for the game map", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download raw schedules into the raw data directory
    Fetch {
        /// Season years to fetch, comma separated (default: this year and next)
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,

        /// College football data API key
        #[arg(long, env = "CFBD_API_KEY", hide_env_values = true)]
        cfbd_api_key: Option<String>,

        /// Leave ncaa-raw.json untouched
        #[arg(long)]
        skip_ncaa: bool,

        /// Leave nfl-raw.json untouched
        #[arg(long)]
        skip_nfl: bool,
    },
    /// Normalize the raw schedules into per-week files and index.json
    Generate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    better_panic::install();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let settings = Settings::load(&cli.settings)?;

    match cli.command {
        Command::Fetch { years, cfbd_api_key, skip_ncaa, skip_nfl } => {
            let years = if years.is_empty() { default_seasons(Utc::now()) } else { years };
            let api = ScheduleApi::new().with_cfbd_key(cfbd_api_key.unwrap_or_default());
            fetch(&settings, &api, &years, !skip_ncaa, !skip_nfl).await
        }
        Command::Generate => generate(&settings),
    }
}

async fn fetch(
    settings: &Settings,
    api: &ScheduleApi,
    years: &[i32],
    ncaa: bool,
    nfl: bool,
) -> anyhow::Result<()> {
    if ncaa {
        let data = api.fetch_ncaa(years).await?;
        let path = settings.ncaa_raw_path();
        store::write_json(&path, &data)?;
        info!("Saved NCAA data to {}", path.display());
    }

    if nfl {
        let data = api.fetch_nfl(years).await?;
        let path = settings.nfl_raw_path();
        store::write_json(&path, &data)?;
        info!("Saved NFL data to {}", path.display());
    }

    Ok(())
}

fn generate(settings: &Settings) -> anyhow::Result<()> {
    let tables = ReferenceTables::load(&settings.venues_path, &settings.logos_path)
        .context("failed to load reference tables")?;
    let data = RawDataset::load(&settings.ncaa_raw_path(), &settings.nfl_raw_path())
        .context("failed to load raw schedules")?;

    let ctx = PipelineContext {
        tables: &tables,
        offset: settings.utc_offset,
        season_starts: &settings.season_starts,
    };
    let (_, summary) = pipeline::generate(&data, &ctx, &settings.out_dir, Utc::now())?;

    info!(
        "Data generation complete: {} games in {} files ({} rejected), {} teams",
        summary.games_written, summary.files_written, summary.rejected, summary.teams
    );
    Ok(())
}
