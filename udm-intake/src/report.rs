//! The flat key parameter report.

use std::path::Path;

use crate::error::{IntakeError, IntakeResult};
use crate::run_id::RunIdentifier;
use crate::tables::ParameterTable;

pub const REPORT_FILE_NAME: &str = "key_parameters.csv";

/// Render the report body. Line order is fixed (SSP, YEAR, FLOODZONE,
/// ATTRACTORS, CONSTRAINTS); downstream consumers index into it.
pub fn render_report(
    run: &RunIdentifier,
    attractors: &ParameterTable,
    constraints: &ParameterTable,
) -> String {
    let floodzone = if run.floodzone().as_bool() {
        "TRUE"
    } else {
        "FALSE"
    };
    format!(
        "PARAMETER, VALUE\n\
         SSP, {}\n\
         YEAR, {}\n\
         FLOODZONE, {}\n\
         ATTRACTORS, {}\n\
         CONSTRAINTS, {}\n",
        run.scenario,
        run.year,
        floodzone,
        attractors.serialize_rows(),
        constraints.serialize_rows(),
    )
}

/// Write the report to `path`, replacing any existing file.
pub fn write_key_parameters(
    path: &Path,
    run: &RunIdentifier,
    attractors: &ParameterTable,
    constraints: &ParameterTable,
) -> IntakeResult<()> {
    std::fs::write(path, render_report(run, attractors, constraints)).map_err(|source| {
        IntakeError::WriteFailure {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::tables::read_table;

    fn fixture() -> (RunIdentifier, ParameterTable, ParameterTable, TempDir) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("attractors.csv"),
            "name,weight\nroads,0.5\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("constraints.csv"),
            "name,weight\nfloodzone,1\n",
        )
        .unwrap();
        let attractors = read_table(dir.path(), "attractors").unwrap();
        let constraints = read_table(dir.path(), "constraints").unwrap();
        let run = RunIdentifier::parse("UDM-SSP2-2050-withfz").unwrap();
        (run, attractors, constraints, dir)
    }

    #[test]
    fn report_lines_are_in_fixed_order() {
        let (run, attractors, constraints, _dir) = fixture();
        let report = render_report(&run, &attractors, &constraints);
        let prefixes: Vec<&str> = report
            .lines()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "PARAMETER",
                "SSP",
                "YEAR",
                "FLOODZONE",
                "ATTRACTORS",
                "CONSTRAINTS"
            ]
        );
    }

    #[test]
    fn floodzone_is_reported_as_a_boolean() {
        let (_, attractors, constraints, _dir) = fixture();
        let with = RunIdentifier::parse("UDM-SSP2-2050-withfz").unwrap();
        let without = RunIdentifier::parse("UDM-SSP2-2050-nofz").unwrap();
        assert!(render_report(&with, &attractors, &constraints).contains("FLOODZONE, TRUE"));
        assert!(render_report(&without, &attractors, &constraints).contains("FLOODZONE, FALSE"));
    }

    #[test]
    fn writing_overwrites_an_existing_report() {
        let (run, attractors, constraints, dir) = fixture();
        let path = dir.path().join(REPORT_FILE_NAME);
        std::fs::write(&path, "stale contents").unwrap();
        write_key_parameters(&path, &run, &attractors, &constraints).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("PARAMETER, VALUE\n"));
        assert!(written.contains("SSP, SSP2"));
        assert!(written.contains("YEAR, 2050"));
    }
}
