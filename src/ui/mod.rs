// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the bbox-editor application.

pub mod canvas;
pub mod json_panel;
pub mod properties;
pub mod toolbar;
