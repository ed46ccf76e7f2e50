// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file serialization and deserialization.
//!
//! Annotation files are a JSON array of records. Exports are pretty-printed
//! with two-space indentation.

use crate::models::annotation::AnnotationRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Default file name offered when exporting annotations.
pub const ANNOTATIONS_FILE_NAME: &str = "annotations.json";

/// Default file name offered when exporting the rendered composite.
pub const COMPOSITE_FILE_NAME: &str = "annotated_image.png";

/// Parse an annotation array.
pub fn parse_annotations(text: &str) -> serde_json::Result<Vec<AnnotationRecord>> {
    serde_json::from_str(text)
}

/// Serialize annotations as pretty JSON.
pub fn annotations_to_json(annotations: &[AnnotationRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(annotations)
}

/// Read an annotation file as text.
pub fn read_json(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write exported JSON text to `path`.
pub fn write_json(path: &Path, json: &str) -> Result<()> {
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
