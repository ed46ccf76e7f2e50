// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the box and export actions.

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    AddBox,
    DeleteSelected,
    ExportJson,
    ExportImage,
}

/// Display the toolbar.
///
/// Buttons stay enabled without an image or selection so the editor can
/// report why the action is unavailable.
pub fn show(ui: &mut egui::Ui, has_image: bool, has_selection: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("➕ Add Box").clicked() {
            action = ToolbarAction::AddBox;
        }
        if ui.button("🗑 Delete Box").clicked() {
            action = ToolbarAction::DeleteSelected;
        }

        ui.separator();

        if ui.button("Export JSON").clicked() {
            action = ToolbarAction::ExportJson;
        }
        if ui.button("Export Image").clicked() {
            action = ToolbarAction::ExportImage;
        }

        ui.separator();

        let hint = match (has_image, has_selection) {
            (false, _) => "Open an image to start",
            (true, false) => "Click a box to select it, drag to move, drag a corner to resize",
            (true, true) => "Drag to move, drag a corner to resize, Delete removes, Esc deselects",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
