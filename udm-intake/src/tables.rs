//! Auxiliary parameter tables (constraints and attractors).

use std::path::Path;

use itertools::Itertools;
use polars::frame::DataFrame;
use polars::prelude::{AnyValue, CsvReadOptions, SerReader};

use crate::error::{IntakeError, IntakeResult};

/// A named tabular file loaded from the extracted archive. Read-only after
/// load.
#[derive(Debug)]
pub struct ParameterTable {
    pub name: String,
    pub df: DataFrame,
}

/// Load `<dir>/<name>.csv` into a `ParameterTable`.
pub fn read_table(dir: &Path, name: &str) -> IntakeResult<ParameterTable> {
    let path = dir.join(format!("{name}.csv"));
    if !path.is_file() {
        return Err(IntakeError::MissingParameterTable(path));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.clone()))
        .and_then(|reader| reader.finish())
        .map_err(|source| IntakeError::MalformedParameterTable { path, source })?;
    Ok(ParameterTable {
        name: name.to_string(),
        df,
    })
}

impl ParameterTable {
    /// Deterministic one-line rendering of the table: `col=value` pairs
    /// space-joined within a row, rows joined by `"; "`. This is what the
    /// key parameter report embeds.
    pub fn serialize_rows(&self) -> String {
        (0..self.df.height())
            .map(|idx| {
                self.df
                    .get_columns()
                    .iter()
                    .map(|series| {
                        let value = series.get(idx).unwrap_or(AnyValue::Null);
                        format!("{}={}", series.name(), any_value_to_string(&value))
                    })
                    .join(" ")
            })
            .join("; ")
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}

fn any_value_to_string(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}
