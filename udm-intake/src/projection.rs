//! Coordinate reference systems and reprojection to WGS84.
//!
//! Catalog consumers expect footprints in geographic degrees (EPSG:4326)
//! regardless of the raster's working projection, so each supported source
//! CRS provides a point transform to WGS84. The British National Grid
//! transform is the OS inverse transverse Mercator on Airy 1830 followed by
//! a 7-parameter Helmert shift (~5 m, which is plenty for a footprint).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{IntakeError, IntakeResult};

/// Projections a designated raster may be expressed in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum SourceCrs {
    /// British National Grid (OSGB36 easting/northing, metres).
    #[default]
    #[serde(rename = "EPSG:27700")]
    #[strum(to_string = "EPSG:27700", serialize = "27700")]
    BritishNationalGrid,
    /// Spherical web Mercator (metres).
    #[serde(rename = "EPSG:3857")]
    #[strum(to_string = "EPSG:3857", serialize = "3857")]
    WebMercator,
    /// Already geographic degrees; the transform is the identity.
    #[serde(rename = "EPSG:4326")]
    #[strum(to_string = "EPSG:4326", serialize = "4326")]
    Wgs84,
}

impl SourceCrs {
    pub fn from_epsg_string(s: &str) -> IntakeResult<Self> {
        s.parse()
            .map_err(|_| IntakeError::UnsupportedCrs(s.to_string()))
    }

    pub fn epsg_code(&self) -> u32 {
        match self {
            SourceCrs::BritishNationalGrid => 27700,
            SourceCrs::WebMercator => 3857,
            SourceCrs::Wgs84 => 4326,
        }
    }

    /// Transform a projected point to (longitude, latitude) degrees.
    pub fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            SourceCrs::Wgs84 => (x, y),
            SourceCrs::WebMercator => web_mercator_to_wgs84(x, y),
            SourceCrs::BritishNationalGrid => {
                let (lat, lon) = osgb36_geodetic(x, y);
                let (lat, lon) = osgb36_to_wgs84(lat, lon);
                (lon.to_degrees(), lat.to_degrees())
            }
        }
    }
}

// Airy 1830 ellipsoid and the national grid true origin.
const AIRY_A: f64 = 6_377_563.396;
const AIRY_B: f64 = 6_356_256.909;
const GRID_F0: f64 = 0.999_601_271_7;
const GRID_E0: f64 = 400_000.0;
const GRID_N0: f64 = -100_000.0;

// WGS84 ellipsoid.
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

fn web_mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Meridional arc between `lat0` and `lat` on Airy 1830 (OS series form).
fn meridional_arc(lat: f64, lat0: f64) -> f64 {
    let n = (AIRY_A - AIRY_B) / (AIRY_A + AIRY_B);
    let n2 = n * n;
    let n3 = n2 * n;
    let dlat = lat - lat0;
    let slat = lat + lat0;

    let ma = (1.0 + n + 1.25 * n2 + 1.25 * n3) * dlat;
    let mb = (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * dlat.sin() * slat.cos();
    let mc = (15.0 / 8.0 * (n2 + n3)) * (2.0 * dlat).sin() * (2.0 * slat).cos();
    let md = (35.0 / 24.0 * n3) * (3.0 * dlat).sin() * (3.0 * slat).cos();

    AIRY_B * GRID_F0 * (ma - mb + mc - md)
}

/// Inverse transverse Mercator: grid easting/northing to OSGB36 latitude and
/// longitude in radians.
fn osgb36_geodetic(easting: f64, northing: f64) -> (f64, f64) {
    let lat0 = 49.0_f64.to_radians();
    let lon0 = (-2.0_f64).to_radians();
    let e2 = 1.0 - (AIRY_B * AIRY_B) / (AIRY_A * AIRY_A);

    let mut lat = lat0;
    let mut m = 0.0;
    // Converges in a handful of iterations for any on-ellipsoid northing; the
    // cap keeps pathological inputs from spinning forever.
    for _ in 0..64 {
        lat += (northing - GRID_N0 - m) / (AIRY_A * GRID_F0);
        m = meridional_arc(lat, lat0);
        if (northing - GRID_N0 - m).abs() < 1e-5 {
            break;
        }
    }

    let sin2 = lat.sin() * lat.sin();
    let nu = AIRY_A * GRID_F0 / (1.0 - e2 * sin2).sqrt();
    let rho = AIRY_A * GRID_F0 * (1.0 - e2) / (1.0 - e2 * sin2).powf(1.5);
    let eta2 = nu / rho - 1.0;

    let tan_lat = lat.tan();
    let tan2 = tan_lat * tan_lat;
    let tan4 = tan2 * tan2;
    let sec_lat = 1.0 / lat.cos();

    let vii = tan_lat / (2.0 * rho * nu);
    let viii = tan_lat / (24.0 * rho * nu.powi(3)) * (5.0 + 3.0 * tan2 + eta2 - 9.0 * tan2 * eta2);
    let ix = tan_lat / (720.0 * rho * nu.powi(5)) * (61.0 + 90.0 * tan2 + 45.0 * tan4);
    let x = sec_lat / nu;
    let xi = sec_lat / (6.0 * nu.powi(3)) * (nu / rho + 2.0 * tan2);
    let xii = sec_lat / (120.0 * nu.powi(5)) * (5.0 + 28.0 * tan2 + 24.0 * tan4);
    let xiia = sec_lat / (5040.0 * nu.powi(7))
        * (61.0 + 662.0 * tan2 + 1320.0 * tan4 + 720.0 * tan2 * tan4);

    let de = easting - GRID_E0;
    let lat_out = lat - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
    let lon_out = lon0 + x * de - xi * de.powi(3) + xii * de.powi(5) - xiia * de.powi(7);
    (lat_out, lon_out)
}

/// Datum shift OSGB36 -> WGS84 via cartesian coordinates and the inverse of
/// the OS published Helmert parameters. Inputs and outputs in radians.
fn osgb36_to_wgs84(lat: f64, lon: f64) -> (f64, f64) {
    let e2 = 1.0 - (AIRY_B * AIRY_B) / (AIRY_A * AIRY_A);
    let nu = AIRY_A / (1.0 - e2 * lat.sin() * lat.sin()).sqrt();
    let x = nu * lat.cos() * lon.cos();
    let y = nu * lat.cos() * lon.sin();
    let z = nu * (1.0 - e2) * lat.sin();

    let tx = 446.448;
    let ty = -125.157;
    let tz = 542.060;
    let s = -20.4894e-6;
    let arcsec = PI / (180.0 * 3600.0);
    let rx = 0.1502 * arcsec;
    let ry = 0.2470 * arcsec;
    let rz = 0.8421 * arcsec;

    let xp = tx + (1.0 + s) * x - rz * y + ry * z;
    let yp = ty + rz * x + (1.0 + s) * y - rx * z;
    let zp = tz - ry * x + rx * y + (1.0 + s) * z;

    let b = WGS84_A * (1.0 - WGS84_F);
    let e2w = 1.0 - (b * b) / (WGS84_A * WGS84_A);
    let p = (xp * xp + yp * yp).sqrt();
    let mut lat_w = (zp / (p * (1.0 - e2w))).atan();
    for _ in 0..8 {
        let nu_w = WGS84_A / (1.0 - e2w * lat_w.sin() * lat_w.sin()).sqrt();
        lat_w = ((zp + e2w * nu_w * lat_w.sin()) / p).atan();
    }
    let lon_w = yp.atan2(xp);
    (lat_w, lon_w)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64, what: &str) {
        assert!(
            (actual - expected).abs() < tol,
            "{what}: got {actual}, expected {expected} (tol {tol})"
        );
    }

    #[test]
    fn crs_parses_epsg_strings() {
        assert_eq!(
            SourceCrs::from_str("EPSG:27700").unwrap(),
            SourceCrs::BritishNationalGrid
        );
        assert_eq!(
            SourceCrs::from_str("epsg:27700").unwrap(),
            SourceCrs::BritishNationalGrid
        );
        assert_eq!(SourceCrs::from_str("3857").unwrap(), SourceCrs::WebMercator);
        assert!(SourceCrs::from_str("EPSG:2154").is_err());
        assert!(matches!(
            SourceCrs::from_epsg_string("EPSG:2154"),
            Err(IntakeError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn crs_displays_as_epsg() {
        assert_eq!(SourceCrs::BritishNationalGrid.to_string(), "EPSG:27700");
        assert_eq!(SourceCrs::Wgs84.epsg_code(), 4326);
    }

    #[test]
    fn wgs84_source_is_identity() {
        let (lon, lat) = SourceCrs::Wgs84.to_wgs84(-1.5, 52.25);
        assert_eq!((lon, lat), (-1.5, 52.25));
    }

    #[test]
    fn web_mercator_inverse_is_sane() {
        // Greenwich meridian at the equator.
        let (lon, lat) = SourceCrs::WebMercator.to_wgs84(0.0, 0.0);
        assert_close(lon, 0.0, 1e-9, "lon at origin");
        assert_close(lat, 0.0, 1e-9, "lat at origin");

        // London-ish mercator coordinates.
        let (lon, lat) = SourceCrs::WebMercator.to_wgs84(-14_000.0, 6_711_000.0);
        assert_close(lon, -0.1257, 0.001, "London lon");
        assert_close(lat, 51.507, 0.01, "London lat");
    }

    #[test]
    fn national_grid_true_origin_maps_near_49n_2w() {
        // The grid true origin is 49N 2W in OSGB36; the datum shift moves it
        // by only a few hundred metres.
        let (lon, lat) = SourceCrs::BritishNationalGrid.to_wgs84(GRID_E0, GRID_N0);
        assert_close(lon, -2.0, 0.01, "origin lon");
        assert_close(lat, 49.0, 0.01, "origin lat");
    }

    #[test]
    fn national_grid_central_london() {
        // TQ 30000 80000 (530000, 180000) sits on the Thames near Westminster.
        let (lon, lat) = SourceCrs::BritishNationalGrid.to_wgs84(530_000.0, 180_000.0);
        assert_close(lon, -0.1276, 0.005, "London lon");
        assert_close(lat, 51.5034, 0.005, "London lat");
    }

    #[test]
    fn national_grid_output_is_in_degree_range() {
        for &(e, n) in &[
            (0.0, 0.0),
            (700_000.0, 1_300_000.0),
            (400_000.0, 500_000.0),
        ] {
            let (lon, lat) = SourceCrs::BritishNationalGrid.to_wgs84(e, n);
            assert!((-180.0..=180.0).contains(&lon), "lon {lon} out of range");
            assert!((-90.0..=90.0).contains(&lat), "lat {lat} out of range");
        }
    }
}
