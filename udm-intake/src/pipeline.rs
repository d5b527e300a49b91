//! The intake-to-catalog pipeline driver.
//!
//! One archive, one pass: every step runs sequentially and any failure is
//! terminal. The driver owns the run log and records each state it enters,
//! so a failed run's log ends at the step that killed it.

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use strum_macros::Display;

use crate::archive;
use crate::config::Config;
use crate::error::{IntakeError, IntakeResult};
use crate::geo;
use crate::logging::{RunLog, LOG_FILE_NAME};
use crate::metadata::{self, CatalogMetadata};
use crate::report::{self, REPORT_FILE_NAME};
use crate::run_id::RunIdentifier;
use crate::tables;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Init,
    ValidatingInput,
    Extracting,
    LocatingOutput,
    ReadingParameters,
    WritingParameterReport,
    ComputingBbox,
    WritingCatalog,
    Done,
    Failed,
}

/// What a completed run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub run: RunIdentifier,
    pub staged_output: PathBuf,
    pub report_path: PathBuf,
    pub metadata_path: PathBuf,
}

pub struct Pipeline {
    config: Config,
    state: PipelineState,
    log: RunLog,
}

impl Pipeline {
    /// Validate the directory layout and open the run log. The input
    /// directory must already exist; outputs are created.
    pub fn new(config: Config) -> IntakeResult<Self> {
        let inputs = config.inputs_dir();
        if !inputs.is_dir() {
            return Err(IntakeError::MissingRequiredInput(format!(
                "input directory {} does not exist",
                inputs.display()
            )));
        }
        let outputs = config.outputs_dir();
        fs::create_dir_all(&outputs).map_err(|source| IntakeError::WriteFailure {
            path: outputs.clone(),
            source,
        })?;
        let log = RunLog::create(&outputs.join(LOG_FILE_NAME))?;
        Ok(Pipeline {
            config,
            state: PipelineState::Init,
            log,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run the whole pipeline. The log is flushed whether the run completes
    /// or fails; there are no retries.
    pub fn run(mut self) -> IntakeResult<RunSummary> {
        match self.execute() {
            Ok(summary) => {
                self.enter(PipelineState::Done);
                self.log.flush()?;
                Ok(summary)
            }
            Err(err) => {
                self.log
                    .error(&format!("failed during {}: {err}", self.state));
                self.state = PipelineState::Failed;
                let _ = self.log.flush();
                Err(err)
            }
        }
    }

    fn enter(&mut self, state: PipelineState) {
        self.state = state;
        self.log.info(&format!("state: {state}"));
    }

    fn execute(&mut self) -> IntakeResult<RunSummary> {
        let outputs = self.config.outputs_dir();

        self.enter(PipelineState::ValidatingInput);
        let archive_path = archive::find_archive(&self.config.inputs_dir())?;
        let base_name = archive_path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| IntakeError::MalformedRunIdentifier {
                name: archive_path.display().to_string(),
                reason: "archive name is not valid UTF-8".to_string(),
            })?;
        let run = RunIdentifier::parse(base_name)?;
        self.log.info(&format!(
            "archive {} parsed as model={} scenario={} year={} floodzone={}",
            archive_path.display(),
            run.model,
            run.scenario,
            run.year,
            run.floodzone().as_bool()
        ));

        self.enter(PipelineState::Extracting);
        archive::extract_archive(&archive_path, &outputs)?;

        self.enter(PipelineState::LocatingOutput);
        let (tables_dir, staged_output) = archive::stage_designated_output(
            &outputs,
            &run,
            &self.config.designated_file,
            &outputs,
        )?;

        self.enter(PipelineState::ReadingParameters);
        let attractors = tables::read_table(&tables_dir, "attractors")?;
        let constraints = tables::read_table(&tables_dir, "constraints")?;

        self.enter(PipelineState::WritingParameterReport);
        let report_path = outputs.join(REPORT_FILE_NAME);
        report::write_key_parameters(&report_path, &run, &attractors, &constraints)?;

        self.enter(PipelineState::ComputingBbox);
        let footprint = geo::compute_footprint(&staged_output, self.config.source_crs)?;

        self.enter(PipelineState::WritingCatalog);
        let staged_stem = staged_output
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        let title = format!("UDM output {staged_stem}");
        let description = format!(
            "Output of a {} model run for scenario {} in {}, {} the floodzone constraint applied.",
            run.model,
            run.scenario,
            run.year,
            if run.floodzone().as_bool() {
                "with"
            } else {
                "without"
            }
        );
        let document = CatalogMetadata::new(&title, &description, &self.config.keyword, footprint);
        let metadata_path = metadata::write_metadata(&self.config.metadata_dir(), &document)?;
        self.log
            .info(&format!("catalog record written to {}", metadata_path.display()));

        Ok(RunSummary {
            run,
            staged_output,
            report_path,
            metadata_path,
        })
    }
}

/// One-shot entry point: build and run a pipeline for `config`.
pub fn run_pipeline(config: Config) -> IntakeResult<RunSummary> {
    Pipeline::new(config)?.run()
}
