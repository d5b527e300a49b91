use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use log::info;
use udm_intake::config::Config;
use udm_intake::projection::SourceCrs;
use udm_intake::{geo, run_pipeline};

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> Result<()>;
}

/// The `run` command processes one run archive end to end: extract, stage
/// the result raster, write the key parameter report and the catalog
/// metadata document.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(
        long,
        env = "DATA_PATH",
        help = "Base data directory (expects an inputs/ subdirectory)"
    )]
    data_path: Option<PathBuf>,
    #[arg(
        long,
        env = "DESIGNATED_FILE",
        help = "Result raster to copy out of the extracted archive"
    )]
    designated_file: Option<String>,
    #[arg(
        short,
        long,
        env = "KEYWORD",
        help = "Keyword recorded in the catalog metadata"
    )]
    keyword: Option<String>,
    #[arg(
        long,
        env = "SOURCE_CRS",
        help = "Projection of the result raster, e.g. EPSG:27700"
    )]
    source_crs: Option<SourceCrs>,
}

impl RunArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(data_path) = &self.data_path {
            config.data_path = data_path.clone();
        }
        if let Some(designated_file) = &self.designated_file {
            config.designated_file = designated_file.clone();
        }
        if let Some(keyword) = &self.keyword {
            config.keyword = keyword.clone();
        }
        if let Some(source_crs) = self.source_crs {
            config.source_crs = source_crs;
        }
        config
    }
}

impl RunCommand for RunArgs {
    fn run(&self, config: Config) -> Result<()> {
        info!("Running `run` subcommand");
        let config = self.apply(config);
        let summary = run_pipeline(config).context("pipeline failed")?;
        println!(
            "Catalogued run {}: raster {}, report {}, metadata {}",
            summary.run.base_name(),
            summary.staged_output.display(),
            summary.report_path.display(),
            summary.metadata_path.display()
        );
        Ok(())
    }
}

/// The `footprint` command prints the WGS84 footprint of a single raster as
/// a GeoJSON feature, without running the rest of the pipeline.
#[derive(Args, Debug)]
pub struct FootprintArgs {
    #[arg(help = "Path to an ESRI ASCII grid raster")]
    raster: PathBuf,
    #[arg(long, help = "Projection of the raster, e.g. EPSG:27700")]
    source_crs: Option<SourceCrs>,
}

impl RunCommand for FootprintArgs {
    fn run(&self, config: Config) -> Result<()> {
        info!("Running `footprint` subcommand");
        let source_crs = self.source_crs.unwrap_or(config.source_crs);
        let feature = geo::compute_footprint(&self.raster, source_crs)?;
        println!("{feature}");
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about = "Catalogue the outputs of a UDM model run", long_about = None, name = "udm-intake")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Process one run archive into catalogued outputs
    Run(RunArgs),
    /// Print the WGS84 footprint of a raster as GeoJSON
    Footprint(FootprintArgs),
}
