//! Catalog metadata document assembly.
//!
//! Builds the DAFNI dcat-style metadata record as a tree of typed fields and
//! serializes it with serde, so free-text titles and descriptions cannot
//! break the document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use geojson::Feature;
use serde::Serialize;

use crate::error::{IntakeError, IntakeResult};

pub const METADATA_FILE_NAME: &str = "metadata.json";

const CONTEXT: &str = "metadata-v1";
const LICENSE_URI: &str = "https://creativecommons.org/licences/by/4.0/";
const CONTACT_NAME: &str = "DAFNI";
const CONTACT_EMAIL: &str = "support@dafni.ac.uk";
const SUBJECT: &str = "Environment";

/// The complete catalog record. Everything beyond title, description,
/// keyword and footprint is fixed boilerplate required by the catalog
/// standard.
#[derive(Debug, Serialize)]
pub struct CatalogMetadata {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "@type")]
    pub dataset_type: String,
    #[serde(rename = "dct:language")]
    pub language: String,
    #[serde(rename = "dct:title")]
    pub title: String,
    #[serde(rename = "dct:description")]
    pub description: String,
    #[serde(rename = "dcat:keyword")]
    pub keywords: Vec<String>,
    #[serde(rename = "dct:subject")]
    pub subject: String,
    #[serde(rename = "dct:license")]
    pub license: License,
    #[serde(rename = "dct:creator")]
    pub creators: Vec<Creator>,
    #[serde(rename = "dcat:contactPoint")]
    pub contact_point: ContactPoint,
    #[serde(rename = "dct:created")]
    pub created: String,
    #[serde(rename = "dct:PeriodOfTime")]
    pub period_of_time: PeriodOfTime,
    #[serde(rename = "dafni_version_note")]
    pub version_note: String,
    #[serde(rename = "dct:spatial")]
    pub spatial: Spatial,
    pub geojson: Feature,
}

#[derive(Debug, Serialize)]
pub struct License {
    #[serde(rename = "@type")]
    pub license_type: String,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "rdfs:label")]
    pub label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Creator {
    #[serde(rename = "@type")]
    pub creator_type: String,
}

#[derive(Debug, Serialize)]
pub struct ContactPoint {
    #[serde(rename = "@type")]
    pub contact_type: String,
    #[serde(rename = "vcard:fn")]
    pub name: String,
    #[serde(rename = "vcard:hasEmail")]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PeriodOfTime {
    #[serde(rename = "type")]
    pub period_type: String,
    #[serde(rename = "time:hasBeginning")]
    pub beginning: Option<String>,
    #[serde(rename = "time:hasEnd")]
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Spatial {
    #[serde(rename = "@type")]
    pub spatial_type: String,
    #[serde(rename = "rdfs:label")]
    pub label: Option<String>,
}

impl CatalogMetadata {
    /// Assemble a record; the creation timestamp is captured here.
    pub fn new(title: &str, description: &str, keyword: &str, footprint: Feature) -> Self {
        CatalogMetadata {
            context: vec![CONTEXT.to_string()],
            dataset_type: "dcat:Dataset".to_string(),
            language: "en".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            keywords: vec![keyword.to_string()],
            subject: SUBJECT.to_string(),
            license: License {
                license_type: "LicenseDocument".to_string(),
                id: LICENSE_URI.to_string(),
                label: None,
            },
            creators: vec![Creator {
                creator_type: "foaf:Organization".to_string(),
            }],
            contact_point: ContactPoint {
                contact_type: "vcard:Organization".to_string(),
                name: CONTACT_NAME.to_string(),
                email: CONTACT_EMAIL.to_string(),
            },
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            period_of_time: PeriodOfTime {
                period_type: "dct:PeriodOfTime".to_string(),
                beginning: None,
                end: None,
            },
            version_note: "created".to_string(),
            spatial: Spatial {
                spatial_type: "dct:Location".to_string(),
                label: None,
            },
            geojson: footprint,
        }
    }
}

/// Write the record to `<dir>/metadata.json`, creating the directory and
/// replacing any prior document.
pub fn write_metadata(dir: &Path, document: &CatalogMetadata) -> IntakeResult<PathBuf> {
    let write_failure = |path: &Path, source: std::io::Error| IntakeError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(|e| write_failure(dir, e))?;
    let path = dir.join(METADATA_FILE_NAME);
    let file = File::create(&path).map_err(|e| write_failure(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)
        .map_err(|e| write_failure(&path, e.into()))?;
    writer.flush().map_err(|e| write_failure(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::geo::footprint_from_extent;
    use crate::projection::SourceCrs;
    use crate::raster::RasterExtent;

    fn fixture() -> CatalogMetadata {
        let extent = RasterExtent {
            xmin: -1.0,
            ymin: 51.0,
            xmax: 0.5,
            ymax: 52.0,
        };
        CatalogMetadata::new(
            "UDM output out_cell_dph-SSP2_2050_withfz",
            "Urban development model output",
            "OpenCLIM",
            footprint_from_extent(&extent, SourceCrs::Wgs84),
        )
    }

    #[test]
    fn document_has_the_catalog_shape() {
        let value = serde_json::to_value(fixture()).unwrap();
        assert_eq!(value["@context"], serde_json::json!(["metadata-v1"]));
        assert_eq!(value["@type"], "dcat:Dataset");
        assert_eq!(value["dct:language"], "en");
        assert_eq!(value["dct:subject"], "Environment");
        assert_eq!(value["dct:license"]["@id"], LICENSE_URI);
        assert!(value["dct:license"]["rdfs:label"].is_null());
        assert_eq!(value["dct:creator"][0]["@type"], "foaf:Organization");
        assert_eq!(value["dcat:contactPoint"]["vcard:fn"], "DAFNI");
        assert_eq!(value["dcat:keyword"], serde_json::json!(["OpenCLIM"]));
        assert!(value["dct:PeriodOfTime"]["time:hasBeginning"].is_null());
        assert_eq!(value["dafni_version_note"], "created");
        assert_eq!(value["geojson"]["type"], "Feature");
    }

    #[test]
    fn created_timestamp_is_utc_iso8601_with_z() {
        let doc = fixture();
        assert!(doc.created.ends_with('Z'), "got {}", doc.created);
        assert!(doc.created.contains('T'));
    }

    #[test]
    fn writes_and_overwrites_metadata_json() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("metadata");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join(METADATA_FILE_NAME), "stale").unwrap();

        let path = write_metadata(&target, &fixture()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["dct:title"], "UDM output out_cell_dph-SSP2_2050_withfz");
        assert_eq!(
            value["geojson"]["geometry"]["coordinates"][0]
                .as_array()
                .unwrap()
                .len(),
            5
        );
    }
}
