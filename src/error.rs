// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! User-facing editor errors.
//!
//! Every variant is recoverable: an operation that fails leaves the
//! annotation set exactly as it was before the call.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("please load an image first")]
    NoImage,

    #[error("please select a bounding box first")]
    NoSelection,

    #[error("invalid annotation JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("failed to serialize annotations: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    #[error("property '{key}' expects a {expected} value")]
    PropertyType { key: &'static str, expected: &'static str },

    #[error("no bounding box at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid display scale {0}")]
    InvalidScale(f64),
}

pub type Result<T> = std::result::Result<T, EditorError>;
