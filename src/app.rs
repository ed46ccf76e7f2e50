// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns an [`Editor`] and translates menu, toolbar, panel and
//! canvas interactions into editor [`Command`]s. Results are surfaced in
//! the status bar and the JSON panel is regenerated whenever the records
//! change.

use crate::ui::{canvas, json_panel, properties, toolbar};
use bbox_editor::io::loader::{Loaded, PendingLoad};
use bbox_editor::io::serialization::{self, ANNOTATIONS_FILE_NAME, COMPOSITE_FILE_NAME};
use bbox_editor::io::media;
use bbox_editor::{Command, Editor};
use std::path::PathBuf;

/// Message shown in the status bar.
struct Status {
    text: String,
    is_error: bool,
}

/// Main application state.
pub struct BboxEditorApp {
    /// Annotation core
    editor: Editor,

    /// Text of the JSON panel, edited live by the user
    json_text: String,

    /// Texture of the loaded image
    image_texture: Option<egui::TextureHandle>,

    /// Texture must be rebuilt from the editor's image
    texture_stale: bool,

    /// Background load in flight
    loader: Option<PendingLoad>,

    /// Annotation file to load once the pending image arrives
    queued_annotations: Option<PathBuf>,

    status: Option<Status>,
}

impl BboxEditorApp {
    /// Create the app, optionally preloading an image and then annotations.
    pub fn new(editor: Editor, image: Option<PathBuf>, annotations: Option<PathBuf>) -> Self {
        let mut app = Self {
            editor,
            json_text: "[]".to_string(),
            image_texture: None,
            texture_stale: false,
            loader: None,
            queued_annotations: None,
            status: None,
        };

        match (image, annotations) {
            (Some(image), annotations) => {
                app.queued_annotations = annotations;
                app.loader = Some(PendingLoad::image(image));
            }
            (None, Some(annotations)) => app.loader = Some(PendingLoad::annotations(annotations)),
            (None, None) => {}
        }

        app
    }

    /// Apply a command, reporting failures in the status bar.
    fn dispatch(&mut self, command: Command) -> bool {
        match self.editor.apply(command) {
            Ok(outcome) => {
                if outcome.refreshes_json() {
                    self.refresh_json();
                }
                true
            }
            Err(e) => {
                log::warn!("{}", e);
                self.set_status(e.to_string(), true);
                false
            }
        }
    }

    /// Regenerate the JSON panel from the editor's records.
    fn refresh_json(&mut self) {
        match self.editor.export_json() {
            Ok(json) => self.json_text = json,
            Err(e) => log::error!("{}", e),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(Status {
            text: text.into(),
            is_error,
        });
    }

    /// Hand a finished background load to the editor.
    fn poll_loader(&mut self) {
        let Some(result) = self.loader.as_ref().and_then(PendingLoad::poll) else {
            return;
        };
        self.loader = None;

        match result {
            Ok(Loaded::Image { path, image }) => {
                self.set_status(
                    format!("Loaded {} ({}x{})", path.display(), image.width(), image.height()),
                    false,
                );
                self.dispatch(Command::LoadImage(image));
                self.texture_stale = true;

                if let Some(annotations) = self.queued_annotations.take() {
                    self.loader = Some(PendingLoad::annotations(annotations));
                }
            }
            Ok(Loaded::Annotations { path, text }) => {
                if self.dispatch(Command::ImportJson(text)) {
                    self.set_status(
                        format!(
                            "Loaded {} annotations from {}",
                            self.editor.annotations().len(),
                            path.display()
                        ),
                        false,
                    );
                }
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.set_status(format!("{:#}", e), true);
                self.queued_annotations = None;
            }
        }
    }

    /// Upload the editor's image as a texture after it changed.
    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_stale {
            return;
        }
        self.texture_stale = false;
        self.image_texture = self.editor.image().map(|image| {
            let size = [image.width() as usize, image.height() as usize];
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied(size, image.pixels().as_raw());
            ctx.load_texture("loaded_image", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn open_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"])
            .pick_file()
        {
            self.queued_annotations = None;
            self.loader = Some(PendingLoad::image(path));
        }
    }

    fn open_annotations(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.loader = Some(PendingLoad::annotations(path));
        }
    }

    /// Export annotations to a JSON file.
    fn export_json(&mut self) {
        let json = match self.editor.export_json() {
            Ok(json) => json,
            Err(e) => {
                self.set_status(e.to_string(), true);
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(ANNOTATIONS_FILE_NAME)
            .save_file()
        else {
            return;
        };

        match serialization::write_json(&path, &json) {
            Ok(()) => {
                log::info!("Exported annotations to {}", path.display());
                self.set_status(format!("Exported {}", path.display()), false);
            }
            Err(e) => {
                log::error!("Failed to export annotations: {:#}", e);
                self.set_status(format!("{:#}", e), true);
            }
        }
    }

    /// Export the annotated image as PNG.
    fn export_image(&mut self) {
        let composite = match self.editor.render_composite() {
            Ok(composite) => composite,
            Err(e) => {
                self.set_status(e.to_string(), true);
                return;
            }
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(COMPOSITE_FILE_NAME)
            .save_file()
        else {
            return;
        };

        match media::save_png(&composite, &path) {
            Ok(()) => {
                log::info!("Exported annotated image to {}", path.display());
                self.set_status(format!("Exported {}", path.display()), false);
            }
            Err(e) => {
                log::error!("Failed to export image: {:#}", e);
                self.set_status(format!("{:#}", e), true);
            }
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        match action {
            toolbar::ToolbarAction::AddBox => {
                self.dispatch(Command::AddBox);
            }
            toolbar::ToolbarAction::DeleteSelected => {
                self.dispatch(Command::DeleteSelected);
            }
            toolbar::ToolbarAction::ExportJson => self.export_json(),
            toolbar::ToolbarAction::ExportImage => self.export_image(),
            toolbar::ToolbarAction::None => {}
        }
    }
}

impl eframe::App for BboxEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.ensure_texture(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loader.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        self.open_image();
                        ui.close_menu();
                    }
                    if ui.button("Open Annotations...").clicked() {
                        self.open_annotations();
                        ui.close_menu();
                    }
                    if ui.button("New Annotations").clicked() {
                        self.dispatch(Command::CreateNew);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Export JSON...").clicked() {
                        self.export_json();
                        ui.close_menu();
                    }
                    if ui.button("Export Annotated Image...").clicked() {
                        self.export_image();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    self.editor.image().is_some(),
                    self.editor.selection().is_some(),
                )
            })
            .inner;
        self.handle_toolbar(toolbar_action);

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("{} boxes", self.editor.annotations().len()));
                if let Some(index) = self.editor.selection() {
                    ui.separator();
                    ui.label(format!("Selected: {}", index));
                }
                if let Some(ref status) = self.status {
                    ui.separator();
                    let color = if status.is_error {
                        egui::Color32::from_rgb(231, 76, 60)
                    } else {
                        egui::Color32::from_gray(180)
                    };
                    ui.label(egui::RichText::new(&status.text).color(color));
                }
            });
        });

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, self.editor.selected_properties()))
            .inner;
        if let properties::PropertiesAction::Set { index, key, value } = properties_action {
            self.dispatch(Command::SetProperty {
                index,
                key: key.as_str().to_string(),
                value,
            });
        }

        // JSON editor (left side)
        let draft_changed = egui::SidePanel::left("json")
            .default_width(340.0)
            .show(ctx, |ui| json_panel::show(ui, &mut self.json_text))
            .inner;
        if draft_changed {
            self.dispatch(Command::LiveEdit(self.json_text.clone()));
        }

        // Keyboard shortcuts, unless a text field has focus
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Delete)) && self.editor.selection().is_some() {
                self.dispatch(Command::DeleteSelected);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.dispatch(Command::ClearSelection);
            }
        }

        // Main canvas (center)
        let commands = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref pending) = self.loader {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(pending.message())
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    Vec::new()
                } else {
                    canvas::show(ui, &self.editor, &self.image_texture)
                }
            })
            .inner;

        for command in commands {
            self.dispatch(command);
        }
    }
}
