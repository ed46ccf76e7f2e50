// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live JSON editor.
//!
//! The text is applied to the editor on every change; drafts that do not
//! parse are simply not applied.

/// Display the JSON text editor. Returns `true` when the text changed.
pub fn show(ui: &mut egui::Ui, text: &mut String) -> bool {
    ui.heading("Annotations JSON");
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(text)
                    .code_editor()
                    .desired_width(f32::INFINITY)
                    .desired_rows(30),
            )
            .changed()
        })
        .inner
}
