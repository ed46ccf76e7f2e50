// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! This module provides the properties panel for viewing and editing the
//! metadata of the selected bounding box.

use bbox_editor::models::annotation::{BoxProperties, PropertyKey, PropertyValue};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    Set {
        index: usize,
        key: PropertyKey,
        value: PropertyValue,
    },
}

/// Display the properties of the selected box.
pub fn show(ui: &mut egui::Ui, selected: Option<BoxProperties>) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Properties");
    ui.separator();

    let Some(mut props) = selected else {
        ui.label(egui::RichText::new("Select a bounding box to edit its properties").weak());
        return action;
    };
    let index = props.index;

    egui::Grid::new("box_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Box ID:");
            ui.label(index.to_string());
            ui.end_row();

            ui.label("Type:");
            if ui.text_edit_singleline(&mut props.kind).changed() {
                action = set(index, PropertyKey::Type, props.kind.clone());
            }
            ui.end_row();

            ui.label("Content:");
            if ui
                .add(egui::TextEdit::multiline(&mut props.content).desired_rows(3))
                .changed()
            {
                action = set(index, PropertyKey::Content, props.content.clone());
            }
            ui.end_row();

            ui.label("Source:");
            if ui.text_edit_singleline(&mut props.source).changed() {
                action = set(index, PropertyKey::Source, props.source.clone());
            }
            ui.end_row();

            ui.label("");
            if ui.checkbox(&mut props.interactivity, "Interactive").changed() {
                action = set(index, PropertyKey::Interactivity, props.interactivity);
            }
            ui.end_row();
        });

    action
}

fn set(index: usize, key: PropertyKey, value: impl Into<PropertyValue>) -> PropertiesAction {
    PropertiesAction::Set {
        index,
        key,
        value: value.into(),
    }
}
