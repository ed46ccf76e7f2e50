// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! bbox-editor - bounding box annotation editor
//!
//! A desktop front-end for moving, resizing and relabelling the bounding
//! boxes of an annotation file over its image, then exporting the edited
//! JSON or a rendered composite.
//!
//! Usage: `bbox-editor [--config FILE.yaml] [IMAGE] [ANNOTATIONS.json]`

mod app;
mod ui;

use anyhow::Result;
use app::BboxEditorApp;
use bbox_editor::render::Compositor;
use bbox_editor::{Editor, EditorConfig};
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "bbox-editor",
    about = "Move, resize and relabel the bounding boxes of an annotation file over its image",
    version
)]
struct Args {
    /// YAML configuration file (defaults to the user config directory)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Image to open on startup
    image: Option<PathBuf>,

    /// Annotation JSON to load once the image is open
    annotations: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let config = EditorConfig::load_or_default(args.config.as_deref());

    let compositor = Compositor::from_style(config.style.clone()).unwrap_or_else(|e| {
        log::error!("{:#}; using built-in label glyphs", e);
        Compositor::new(config.style.clone())
    });
    let editor = Editor::with_compositor(config, compositor);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("bbox-editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "bbox-editor",
        options,
        Box::new(move |_cc| Ok(Box::new(BboxEditorApp::new(editor, args.image, args.annotations)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
