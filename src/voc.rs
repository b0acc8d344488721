//! Pascal VOC XML annotation parsing.
//!
//! Annotations are deserialized with serde-xml-rs. Every object-level field
//! is optional in the serde structs so that a single incomplete object can be
//! skipped with a warning instead of failing the whole file.

use log::warn;
use serde::Deserialize;
use std::fs;

use crate::error::ConvertError;
use crate::types::{CornerBox, ObjectRecord, SourceUnit};

/// Root `<annotation>` element of a VOC XML file.
#[derive(Debug, Clone, Deserialize)]
pub struct VocAnnotation {
    /// Image file name declared by the annotation, if any.
    pub filename: Option<String>,
    pub size: Option<VocSize>,
    #[serde(rename = "object", default)]
    pub objects: Vec<VocObject>,
}

/// `<size>` element. Dimensions default to 0 when the elements are absent; a
/// zero dimension is treated as unusable by the size resolver.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VocSize {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// One `<object>` element.
#[derive(Debug, Clone, Deserialize)]
pub struct VocObject {
    pub name: Option<String>,
    pub bndbox: Option<VocBndBox>,
}

/// `<bndbox>` element with each corner optional, so a missing coordinate is
/// a per-object problem rather than a parse failure.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VocBndBox {
    pub xmin: Option<f64>,
    pub ymin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymax: Option<f64>,
}

impl VocBndBox {
    /// Extract a complete corner box, naming the first missing field.
    pub fn to_corner_box(self) -> Result<CornerBox, ConvertError> {
        Ok(CornerBox {
            xmin: self.xmin.ok_or(ConvertError::MissingBoxField("xmin"))?,
            ymin: self.ymin.ok_or(ConvertError::MissingBoxField("ymin"))?,
            xmax: self.xmax.ok_or(ConvertError::MissingBoxField("xmax"))?,
            ymax: self.ymax.ok_or(ConvertError::MissingBoxField("ymax"))?,
        })
    }
}

/// Read and parse one annotation file.
pub fn parse_annotation(unit: &SourceUnit) -> Result<VocAnnotation, ConvertError> {
    let content = fs::read_to_string(&unit.path)?;
    serde_xml_rs::from_str(&content)
        .map_err(|e| ConvertError::MalformedAnnotation(e.to_string()))
}

/// Extract the valid object records from a parsed annotation, in document
/// order. Objects missing their class name or any box coordinate are skipped
/// with a warning; one bad object never discards the rest of the unit.
pub fn extract_records(unit: &SourceUnit, annotation: &VocAnnotation) -> Vec<ObjectRecord> {
    let mut records = Vec::with_capacity(annotation.objects.len());
    for object in &annotation.objects {
        let class_name = match &object.name {
            Some(name) => name.clone(),
            None => {
                warn!(
                    "{}: skipping object with no class name",
                    unit.path.display()
                );
                continue;
            }
        };
        let bndbox = match object.bndbox {
            Some(bndbox) => bndbox,
            None => {
                warn!(
                    "{}: skipping object '{}' with no bounding box",
                    unit.path.display(),
                    class_name
                );
                continue;
            }
        };
        let bbox = match bndbox.to_corner_box() {
            Ok(bbox) => bbox,
            Err(e) => {
                warn!(
                    "{}: skipping object '{}': {}",
                    unit.path.display(),
                    class_name,
                    e
                );
                continue;
            }
        };
        records.push(ObjectRecord { class_name, bbox });
    }
    records
}
