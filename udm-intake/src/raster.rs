//! ESRI ASCII grid header parsing.
//!
//! The designated output raster is an ASCII grid (`.asc`). Only the header
//! matters here: the footprint is derived from the grid shape, origin and
//! cell size, never from the cell values.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IntakeError, IntakeResult};

// Header lines an ASCII grid may carry before the data rows.
const MAX_HEADER_LINES: usize = 6;

// Upper bound on grid dimensions; anything larger is a corrupt header, not
// a raster this pipeline could have produced.
const MAX_GRID_DIM: f64 = 1e9;

/// Parsed ASCII grid header with the origin normalised to the lower-left
/// cell corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AsciiGridHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub xll: f64,
    pub yll: f64,
    pub cellsize: f64,
    pub nodata_value: Option<f64>,
}

/// Native rectangular extent of a raster, in the raster's own CRS.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterExtent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl AsciiGridHeader {
    pub fn extent(&self) -> RasterExtent {
        RasterExtent {
            xmin: self.xll,
            ymin: self.yll,
            xmax: self.xll + self.ncols as f64 * self.cellsize,
            ymax: self.yll + self.nrows as f64 * self.cellsize,
        }
    }
}

fn open_error(path: &Path, reason: impl Into<String>) -> IntakeError {
    IntakeError::RasterOpenError {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Read and validate the header of an ASCII grid raster.
///
/// Fails with `RasterOpenError` when the file is unreadable or its leading
/// lines are not `key value` pairs, and with `MissingSpatialReference` when
/// the grid shape parses but the georeference keys (origin and cell size)
/// are absent.
pub fn read_header(path: &Path) -> IntakeResult<AsciiGridHeader> {
    let file = File::open(path).map_err(|e| open_error(path, e.to_string()))?;
    let reader = BufReader::new(file);

    let mut fields: HashMap<String, f64> = HashMap::new();
    for line in reader.lines().take(MAX_HEADER_LINES) {
        let line = line.map_err(|e| open_error(path, e.to_string()))?;
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            break;
        };
        if !key.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            // First data row reached.
            break;
        }
        let value = value
            .parse::<f64>()
            .map_err(|_| open_error(path, format!("malformed header line {line:?}")))?;
        fields.insert(key.to_ascii_lowercase(), value);
    }

    let (Some(&ncols), Some(&nrows)) = (fields.get("ncols"), fields.get("nrows")) else {
        return Err(open_error(path, "not an ASCII grid (no ncols/nrows header)"));
    };
    if !(1.0..=MAX_GRID_DIM).contains(&ncols)
        || !(1.0..=MAX_GRID_DIM).contains(&nrows)
        || ncols.fract() != 0.0
        || nrows.fract() != 0.0
    {
        return Err(open_error(path, "ncols/nrows must be positive integers"));
    }

    let missing_ref = |what: &str| IntakeError::MissingSpatialReference {
        path: path.to_path_buf(),
        reason: what.to_string(),
    };
    // NaN and infinity survive `f64::parse`, so finiteness is checked
    // explicitly; a non-finite extent would poison the reprojection.
    let cellsize = *fields
        .get("cellsize")
        .ok_or_else(|| missing_ref("no cellsize"))?;
    if !cellsize.is_finite() || cellsize <= 0.0 {
        return Err(missing_ref("cellsize must be positive and finite"));
    }

    // Corner-form and center-form origins are both allowed; center form is
    // shifted by half a cell.
    let xll = match (fields.get("xllcorner"), fields.get("xllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - cellsize / 2.0,
        (None, None) => return Err(missing_ref("no xllcorner/xllcenter")),
    };
    let yll = match (fields.get("yllcorner"), fields.get("yllcenter")) {
        (Some(&corner), _) => corner,
        (None, Some(&center)) => center - cellsize / 2.0,
        (None, None) => return Err(missing_ref("no yllcorner/yllcenter")),
    };
    if !xll.is_finite() || !yll.is_finite() {
        return Err(missing_ref("origin must be finite"));
    }

    Ok(AsciiGridHeader {
        ncols: ncols as usize,
        nrows: nrows as usize,
        xll,
        yll,
        cellsize,
        nodata_value: fields.get("nodata_value").copied(),
    })
}
