// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding-box record exchanged in annotation
//! files and the keys of its user-editable properties.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// A bounding box `[x0, y0, x1, y1]` in normalized coordinates (0.0 to 1.0),
/// relative to the intrinsic pixel size of the image.
///
/// A box read from a file keeps the numbers exactly as written, so an
/// integer `1` is exported as `1` until the box is moved or resized.
#[derive(Debug, Clone)]
pub struct BBox {
    coords: [f64; 4],
    written: Option<[Number; 4]>,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            coords: [x0, y0, x1, y1],
            written: None,
        }
    }

    pub fn coords(&self) -> [f64; 4] {
        self.coords
    }

    pub fn x0(&self) -> f64 {
        self.coords[0]
    }

    pub fn y0(&self) -> f64 {
        self.coords[1]
    }

    pub fn x1(&self) -> f64 {
        self.coords[2]
    }

    pub fn y1(&self) -> f64 {
        self.coords[3]
    }

    pub fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    pub fn height(&self) -> f64 {
        self.y1() - self.y0()
    }

    /// Check whether every component is within `tolerance` of `other`.
    pub fn approx_eq(&self, other: &BBox, tolerance: f64) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

/// Boxes compare by position; how the numbers were written does not matter.
impl PartialEq for BBox {
    fn eq(&self, other: &Self) -> bool {
        self.coords == other.coords
    }
}

impl Serialize for BBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.written {
            Some(numbers) => numbers.serialize(serializer),
            None => self.coords.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for BBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let numbers = <[Number; 4]>::deserialize(deserializer)?;
        let mut coords = [0.0; 4];
        for (coord, number) in coords.iter_mut().zip(numbers.iter()) {
            *coord = number.as_f64().ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("bbox coordinate {} is not a float", number))
            })?;
        }
        Ok(Self {
            coords,
            written: Some(numbers),
        })
    }
}

/// Keep an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// One annotation entry: a bounding box plus its metadata.
///
/// Only `bbox` is required. The metadata fields hold whatever JSON the file
/// had, of any type, and absent fields stay absent on export. Any field this
/// type does not know about is carried in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub bbox: BBox,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub interactivity: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationRecord {
    /// Create a record with the given box and no metadata.
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            kind: None,
            content: None,
            source: None,
            interactivity: None,
            extra: Map::new(),
        }
    }

    /// The `type` field, if it is a string.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_ref().and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_ref().and_then(Value::as_str)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().and_then(Value::as_str)
    }

    pub fn interactivity(&self) -> Option<bool> {
        self.interactivity.as_ref().and_then(Value::as_bool)
    }

    /// Write an editable property. The value must match the property's type.
    pub fn set(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), PropertyValue> {
        match (key, value) {
            (PropertyKey::Type, PropertyValue::Text(text)) => self.kind = Some(Value::String(text)),
            (PropertyKey::Content, PropertyValue::Text(text)) => {
                self.content = Some(Value::String(text))
            }
            (PropertyKey::Source, PropertyValue::Text(text)) => {
                self.source = Some(Value::String(text))
            }
            (PropertyKey::Interactivity, PropertyValue::Flag(flag)) => {
                self.interactivity = Some(Value::Bool(flag))
            }
            (_, value) => return Err(value),
        }
        Ok(())
    }
}

/// The user-editable record properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKey {
    Type,
    Content,
    Source,
    Interactivity,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 4] = [
        PropertyKey::Type,
        PropertyKey::Content,
        PropertyKey::Source,
        PropertyKey::Interactivity,
    ];

    /// JSON field name of the property.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Type => "type",
            PropertyKey::Content => "content",
            PropertyKey::Source => "source",
            PropertyKey::Interactivity => "interactivity",
        }
    }

    /// Name of the value kind the property accepts.
    pub fn expected(self) -> &'static str {
        match self {
            PropertyKey::Interactivity => "boolean",
            _ => "string",
        }
    }
}

impl FromStr for PropertyKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value written through the property editor.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(text: String) -> Self {
        PropertyValue::Text(text)
    }
}

impl From<bool> for PropertyValue {
    fn from(flag: bool) -> Self {
        PropertyValue::Flag(flag)
    }
}

/// Editable fields of the selected record, as shown in the properties panel.
///
/// Missing or `null` metadata is presented as an empty string or `false`.
/// Text fields holding another JSON type show that value's JSON text, and
/// the checkbox follows the truthiness of whatever `interactivity` holds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxProperties {
    pub index: usize,
    pub kind: String,
    pub content: String,
    pub source: String,
    pub interactivity: bool,
}

impl BoxProperties {
    pub fn from_record(index: usize, record: &AnnotationRecord) -> Self {
        Self {
            index,
            kind: display_text(record.kind.as_ref()),
            content: display_text(record.content.as_ref()),
            source: display_text(record.source.as_ref()),
            interactivity: is_truthy(record.interactivity.as_ref()),
        }
    }
}

fn display_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
