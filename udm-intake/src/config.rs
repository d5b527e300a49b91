use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::projection::SourceCrs;

/// Run configuration. Defaults match the reference DAFNI deployment; any
/// field can be overridden from the config file, environment or CLI.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base data directory, expected to contain `inputs/`.
    pub data_path: PathBuf,
    /// Result raster to copy out of the extracted archive.
    pub designated_file: String,
    /// Keyword recorded in the catalog metadata document.
    pub keyword: String,
    /// Projection the designated raster's coordinates are expressed in.
    pub source_crs: SourceCrs,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: "/data".into(),
            designated_file: "out_cell_dph.asc".into(),
            keyword: "OpenCLIM".into(),
            source_crs: SourceCrs::BritishNationalGrid,
        }
    }
}

impl Config {
    pub fn inputs_dir(&self) -> PathBuf {
        self.data_path.join("inputs")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.data_path.join("outputs")
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.outputs_dir().join("metadata")
    }
}
