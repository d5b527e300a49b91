//! Intake-to-catalog pipeline for UDM model run archives.
//!
//! Given a single zipped run archive whose filename encodes the run
//! parameters, this crate extracts it, stages the designated result raster
//! under a canonical name, derives the run's key parameters, computes the
//! raster's WGS84 footprint and writes a DAFNI catalog metadata document.

pub mod archive;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod metadata;
pub mod pipeline;
pub mod projection;
pub mod raster;
pub mod report;
pub mod run_id;
pub mod tables;

pub use config::Config;
pub use error::{IntakeError, IntakeResult};
pub use pipeline::{run_pipeline, Pipeline, PipelineState, RunSummary};
pub use run_id::{FloodzoneStatus, RunIdentifier};
