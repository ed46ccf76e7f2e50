// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box annotation core.
//!
//! Holds an ordered set of annotation records over a single image, converts
//! between normalized and display coordinates, applies drag and resize
//! gestures, and imports/exports the records as JSON. The egui front-end in
//! the `bbox-editor` binary drives it through [`editor::Command`]s.

pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod models;
pub mod render;
pub mod util;

pub use config::EditorConfig;
pub use editor::{Command, Editor, HitTarget, Outcome};
pub use error::EditorError;
pub use io::media::ImageHandle;
pub use models::annotation::{AnnotationRecord, BBox};
