//! Geographic footprint of a raster as a GeoJSON feature.

use std::path::Path;

use geo::{Geometry, LineString, Polygon};
use geojson::Feature;

use crate::error::IntakeResult;
use crate::projection::SourceCrs;
use crate::raster::{self, RasterExtent};

/// Open a raster, read its native extent and reproject the enclosing
/// rectangle into WGS84 as a Feature-shaped bounding box.
pub fn compute_footprint(raster_path: &Path, source_crs: SourceCrs) -> IntakeResult<Feature> {
    let header = raster::read_header(raster_path)?;
    Ok(footprint_from_extent(&header.extent(), source_crs))
}

/// Reproject the four corners of `extent` and assemble a closed polygon
/// ring (five coordinates, first == last). Only corner points are
/// transformed; this is not a per-pixel operation.
pub fn footprint_from_extent(extent: &RasterExtent, source_crs: SourceCrs) -> Feature {
    let corners = [
        (extent.xmin, extent.ymin),
        (extent.xmax, extent.ymin),
        (extent.xmax, extent.ymax),
        (extent.xmin, extent.ymax),
        (extent.xmin, extent.ymin),
    ];
    let ring: Vec<(f64, f64)> = corners
        .iter()
        .map(|&(x, y)| source_crs.to_wgs84(x, y))
        .collect();
    let polygon = Polygon::new(LineString::from(ring), vec![]);

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::from(&Geometry::Polygon(polygon))),
        id: None,
        properties: Some(serde_json::Map::new()),
        foreign_members: None,
    }
}
