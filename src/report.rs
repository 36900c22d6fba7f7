//! The detected-objects report.
//!
//! A single JSON document mapping `"image"` to a base64 data URI of the
//! original frame, plus one key per detected class name mapping to that
//! class's pixel coordinates as `[x, y]` pairs in row-major order. The
//! class-keyed entries together partition the label grid: every pixel
//! appears in exactly one of them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{ClassCatalog, ClassId};
use crate::error::SegsieveError;
use crate::extract::ClassMask;
use crate::grid::PixelCoord;

/// The reserved key for the embedded source image.
pub const IMAGE_KEY: &str = "image";

/// One run's detected-objects document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedObjectsReport {
    /// `data:image/jpeg;base64,...` URI of the original frame.
    pub image_data_uri: String,
    /// Class name → member coordinates in row-major scan order.
    pub objects: BTreeMap<String, Vec<PixelCoord>>,
}

impl DetectedObjectsReport {
    /// Total number of coordinates across all classes.
    pub fn total_pixels(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }
}

/// Builds the report from the grouping output and the encoded frame.
///
/// Precondition: `masks` came from a validated segmentation, so every
/// class id resolves in `catalog` (and no catalog name collides with the
/// reserved `"image"` key).
pub fn build_report(
    masks: &BTreeMap<ClassId, ClassMask>,
    catalog: &ClassCatalog,
    original_jpeg: &[u8],
) -> DetectedObjectsReport {
    let image_data_uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(original_jpeg));

    let mut objects = BTreeMap::new();
    for (class_id, mask) in masks {
        let name = catalog
            .name(*class_id)
            .unwrap_or("unknown")
            .to_string();
        objects.insert(name, mask.coords().to_vec());
    }

    DetectedObjectsReport {
        image_data_uri,
        objects,
    }
}

/// Writes a report as pretty JSON, overwriting any previous document at
/// `path`.
pub fn write_report(path: &Path, report: &DetectedObjectsReport) -> Result<(), SegsieveError> {
    let file = File::create(path).map_err(SegsieveError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(|source| SegsieveError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a report from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<DetectedObjectsReport, SegsieveError> {
    serde_json::from_str(json).map_err(SegsieveError::ReportParse)
}

/// Parses a report from raw JSON bytes.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation
/// upfront.
pub fn from_json_slice(bytes: &[u8]) -> Result<DetectedObjectsReport, SegsieveError> {
    serde_json::from_slice(bytes).map_err(SegsieveError::ReportParse)
}

/// Serializes a report to a JSON string.
pub fn to_json_string(report: &DetectedObjectsReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// The wire shape is a flat object - the image entry and the class entries
// share one namespace, so serde derives can't express it.
impl Serialize for DetectedObjectsReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.objects.len() + 1))?;
        map.serialize_entry(IMAGE_KEY, &self.image_data_uri)?;
        for (name, coords) in &self.objects {
            map.serialize_entry(name, coords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DetectedObjectsReport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = DetectedObjectsReport;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a detected-objects report object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut image_data_uri = None;
                let mut objects = BTreeMap::new();

                while let Some(key) = access.next_key::<String>()? {
                    if key == IMAGE_KEY {
                        image_data_uri = Some(access.next_value::<String>()?);
                    } else {
                        let coords = access.next_value::<Vec<PixelCoord>>()?;
                        objects.insert(key, coords);
                    }
                }

                Ok(DetectedObjectsReport {
                    image_data_uri: image_data_uri
                        .ok_or_else(|| serde::de::Error::missing_field(IMAGE_KEY))?,
                    objects,
                })
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::group_by_class;
    use crate::grid::{LabelGrid, SegmentationResult};
    use image::{Rgba, RgbaImage};

    fn sample_report() -> DetectedObjectsReport {
        let grid = LabelGrid::from_fn(2, 2, |x, _| if x == 0 { 0 } else { 7 });
        let seg = SegmentationResult::new(grid, RgbaImage::from_pixel(2, 2, Rgba([5, 5, 5, 255])));
        let masks = group_by_class(&seg);
        build_report(&masks, &ClassCatalog::pascal_voc(), b"jpeg")
    }

    #[test]
    fn test_report_keys_are_class_names() {
        let report = sample_report();
        assert_eq!(report.objects.len(), 2);
        assert!(report.objects.contains_key("background"));
        assert!(report.objects.contains_key("car"));
        assert_eq!(report.total_pixels(), 4);
    }

    #[test]
    fn test_data_uri_prefix() {
        let report = sample_report();
        assert!(report.image_data_uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample_report();
        let json = to_json_string(&report).expect("serialize report");
        let restored = from_json_str(&json).expect("parse report");
        assert_eq!(report, restored);
    }

    #[test]
    fn test_wire_shape_is_flat() {
        let report = sample_report();
        let json = to_json_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("image"));
        assert!(object.contains_key("car"));
        assert!(object["car"].as_array().unwrap()[0].is_array());
    }

    #[test]
    fn test_missing_image_key_rejected() {
        assert!(from_json_str(r#"{"car": [[0, 0]]}"#).is_err());
    }

    #[test]
    fn test_write_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detected_objects.json");

        let mut report = sample_report();
        write_report(&path, &report).unwrap();

        report.objects.remove("car");
        write_report(&path, &report).unwrap();

        let restored = from_json_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(!restored.objects.contains_key("car"));
    }
}
