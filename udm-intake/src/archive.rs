//! Archive discovery, extraction and output staging.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::info;
use zip::ZipArchive;

use crate::error::{IntakeError, IntakeResult};
use crate::run_id::RunIdentifier;

/// Find the single run archive in `inputs_dir`.
///
/// Exactly one zip is required. Multiple archives fail the run outright
/// rather than silently processing whichever is found first.
pub fn find_archive(inputs_dir: &Path) -> IntakeResult<PathBuf> {
    let entries = fs::read_dir(inputs_dir).map_err(|e| {
        IntakeError::MissingRequiredInput(format!(
            "cannot read input directory {}: {e}",
            inputs_dir.display()
        ))
    })?;

    let mut archives: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(OsStr::to_str)
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        })
        .collect();
    archives.sort();

    match archives.len() {
        0 => Err(IntakeError::ArchiveNotFound(inputs_dir.to_path_buf())),
        1 => Ok(archives.remove(0)),
        count => Err(IntakeError::AmbiguousArchive {
            dir: inputs_dir.to_path_buf(),
            count,
        }),
    }
}

fn extraction_failure(path: &Path, reason: impl ToString) -> IntakeError {
    IntakeError::ExtractionFailure {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Unpack `archive` into `dest`. Blocks until extraction completes.
pub fn extract_archive(archive: &Path, dest: &Path) -> IntakeResult<()> {
    let file = File::open(archive).map_err(|e| extraction_failure(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| extraction_failure(archive, e))?;
    info!(
        "extracting {} ({} entries) into {}",
        archive.display(),
        zip.len(),
        dest.display()
    );
    zip.extract(dest).map_err(|e| extraction_failure(archive, e))
}

/// Locate the designated output file in the extracted tree and copy it to
/// `outputs_dir` under its canonical name, which embeds the run tag
/// (e.g. `out_cell_dph.asc` becomes `out_cell_dph-SSP2_2050_withfz.asc`).
///
/// Returns the directory the file was found in (where the parameter tables
/// also live) and the staged path.
pub fn stage_designated_output(
    extracted_dir: &Path,
    run: &RunIdentifier,
    designated: &str,
    outputs_dir: &Path,
) -> IntakeResult<(PathBuf, PathBuf)> {
    // The archive's top-level directory is normally named after the archive
    // itself; tolerate archives with no top-level directory.
    let nested = extracted_dir.join(run.base_name()).join(designated);
    let flat = extracted_dir.join(designated);
    let source = if nested.is_file() {
        nested
    } else if flat.is_file() {
        flat
    } else {
        return Err(IntakeError::MissingDesignatedOutput(nested));
    };

    let designated_path = Path::new(designated);
    let stem = designated_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(designated);
    let staged_name = match designated_path.extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{stem}-{}.{ext}", run.run_tag()),
        None => format!("{stem}-{}", run.run_tag()),
    };
    let staged = outputs_dir.join(staged_name);

    fs::copy(&source, &staged).map_err(|source_err| IntakeError::WriteFailure {
        path: staged.clone(),
        source: source_err,
    })?;
    info!("staged {} as {}", source.display(), staged.display());

    let tables_dir = source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| extracted_dir.to_path_buf());
    Ok((tables_dir, staged))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn finds_a_single_archive() {
        let dir = TempDir::new().unwrap();
        write_zip(&dir.path().join("UDM-SSP2-2050-withfz.zip"), &[("a", "1")]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let archive = find_archive(dir.path()).unwrap();
        assert!(archive.ends_with("UDM-SSP2-2050-withfz.zip"));
    }

    #[test]
    fn no_archive_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = find_archive(dir.path()).unwrap_err();
        assert!(matches!(err, IntakeError::ArchiveNotFound(_)));
    }

    #[test]
    fn multiple_archives_are_ambiguous() {
        let dir = TempDir::new().unwrap();
        write_zip(&dir.path().join("a.zip"), &[("a", "1")]);
        write_zip(&dir.path().join("b.zip"), &[("b", "2")]);
        let err = find_archive(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            IntakeError::AmbiguousArchive { count: 2, .. }
        ));
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("run.zip");
        write_zip(
            &archive,
            &[("run/out.asc", "ncols 1\n"), ("run/constraints.csv", "a,b\n")],
        );
        let dest = TempDir::new().unwrap();
        extract_archive(&archive, dest.path()).unwrap();
        assert!(dest.path().join("run/out.asc").is_file());
        assert!(dest.path().join("run/constraints.csv").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_extraction_failure() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bad.zip");
        std::fs::write(&archive, "this is not a zip file").unwrap();
        let err = extract_archive(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, IntakeError::ExtractionFailure { .. }));
    }

    #[test]
    fn stages_the_designated_output_under_its_canonical_name() {
        let run = RunIdentifier::parse("UDM-SSP2-2050-withfz").unwrap();
        let extracted = TempDir::new().unwrap();
        let run_dir = extracted.path().join("UDM-SSP2-2050-withfz");
        std::fs::create_dir_all(&run_dir).unwrap();
        std::fs::write(run_dir.join("out_cell_dph.asc"), "ncols 1\n").unwrap();

        let outputs = TempDir::new().unwrap();
        let (tables_dir, staged) =
            stage_designated_output(extracted.path(), &run, "out_cell_dph.asc", outputs.path())
                .unwrap();
        assert_eq!(tables_dir, run_dir);
        assert!(staged.ends_with("out_cell_dph-SSP2_2050_withfz.asc"));
        assert!(staged.is_file());
    }

    #[test]
    fn missing_designated_output_is_an_error() {
        let run = RunIdentifier::parse("UDM-SSP2-2050-withfz").unwrap();
        let extracted = TempDir::new().unwrap();
        let outputs = TempDir::new().unwrap();
        let err =
            stage_designated_output(extracted.path(), &run, "out_cell_dph.asc", outputs.path())
                .unwrap_err();
        assert!(matches!(err, IntakeError::MissingDesignatedOutput(_)));
    }
}
