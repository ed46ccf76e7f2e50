// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the image and its bounding boxes.
//!
//! The image is scaled to fit the panel. Boxes are drawn from their
//! normalized coordinates at the current display size, and pointer input
//! over the image is turned into editor commands in display pixels. A click
//! on the margin around the image clears the selection.

use bbox_editor::util::geometry::{to_display, DisplaySize, Handle, Point};
use bbox_editor::{Command, Editor, HitTarget};

const BOX_COLOR: egui::Color32 = egui::Color32::from_rgb(231, 76, 60);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(52, 152, 219);

/// Display the canvas and return the commands produced by this frame's input.
pub fn show(
    ui: &mut egui::Ui,
    editor: &Editor,
    image_texture: &Option<egui::TextureHandle>,
) -> Vec<Command> {
    let mut commands = Vec::new();
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some(image)) = (image_texture, editor.image()) else {
            show_welcome(ui);
            return;
        };

        // Whole canvas first, so the image response allocated later sits on top
        let background = ui.interact(
            ui.max_rect(),
            ui.id().with("canvas_background"),
            egui::Sense::click(),
        );

        // Fit the image inside the panel, keeping its aspect ratio
        let available = ui.available_size();
        let img_aspect = image.width() as f32 / image.height() as f32;
        let (display_width, display_height) = if img_aspect > available.x / available.y {
            (available.x, available.x / img_aspect)
        } else {
            (available.y * img_aspect, available.y)
        };

        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min
                + egui::vec2(
                    (available.x - display_width) / 2.0,
                    (available.y - display_height) / 2.0,
                ),
            egui::vec2(display_width, display_height),
        );

        // Report a changed rendered width first so pointer input below is
        // interpreted at the new scale
        let rendered_width = display_width as f64;
        let known_width = editor.displayed_size().map_or(0.0, |size| size.width);
        if (rendered_width - known_width).abs() > 0.25 && rendered_width > 0.0 {
            commands.push(Command::Viewport { rendered_width });
            ui.ctx().request_repaint();
        }

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        handle_pointer(ui, editor, image_rect, &mut commands);

        if background.clicked() {
            if let Some(pos) = background.interact_pointer_pos() {
                commands.push(click_command(editor, image_rect, pos));
            }
        }

        let size = DisplaySize::new(display_width as f64, display_height as f64);
        draw_boxes(ui.painter(), editor, image_rect, size);
    });

    commands
}

/// Translate pointer input over the image into commands.
fn handle_pointer(
    ui: &mut egui::Ui,
    editor: &Editor,
    image_rect: egui::Rect,
    commands: &mut Vec<Command>,
) {
    let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
    let local = |pos: egui::Pos2| {
        Point::new(
            (pos.x - image_rect.min.x) as f64,
            (pos.y - image_rect.min.y) as f64,
        )
    };

    if response.drag_started() {
        if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
            let pos = local(origin);
            match editor.hit_test(pos) {
                Some(target) => commands.push(Command::PointerDown { target, pos }),
                None => commands.push(Command::ClearSelection),
            }
        }
    }

    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            commands.push(Command::PointerMove { pos: local(pos) });
        }
    }

    if response.drag_stopped() {
        commands.push(Command::PointerUp);
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            commands.push(click_command(editor, image_rect, pos));
        }
    }

    if let Some(pos) = response.hover_pos() {
        let icon = match editor.hit_test(local(pos)) {
            Some(HitTarget::Handle(_, Handle::Nw | Handle::Se)) => egui::CursorIcon::ResizeNwSe,
            Some(HitTarget::Handle(_, Handle::Ne | Handle::Sw)) => egui::CursorIcon::ResizeNeSw,
            Some(HitTarget::Box(_)) => egui::CursorIcon::Move,
            None => egui::CursorIcon::Default,
        };
        ui.ctx().set_cursor_icon(icon);
    }
}

/// Command for a click at screen position `pos`: select the box under it,
/// or clear the selection when it hits no box or lands outside the image.
fn click_command(editor: &Editor, image_rect: egui::Rect, pos: egui::Pos2) -> Command {
    if !image_rect.contains(pos) {
        return Command::ClearSelection;
    }
    let local = Point::new(
        (pos.x - image_rect.min.x) as f64,
        (pos.y - image_rect.min.y) as f64,
    );
    match editor.hit_test(local) {
        Some(target) => Command::Select(Some(target.index())),
        None => Command::ClearSelection,
    }
}

/// Draw every box with its index tag; the selected box gets corner handles.
fn draw_boxes(painter: &egui::Painter, editor: &Editor, image_rect: egui::Rect, size: DisplaySize) {
    let handle_size = editor.config().handle_size as f32;

    for (index, record) in editor.annotations().iter().enumerate() {
        let rect = to_display(&record.bbox, size);
        let screen_rect = egui::Rect::from_min_size(
            image_rect.min + egui::vec2(rect.left as f32, rect.top as f32),
            egui::vec2(rect.width as f32, rect.height as f32),
        );
        let selected = editor.selection() == Some(index);
        let color = if selected { SELECTED_COLOR } else { BOX_COLOR };

        painter.rect_filled(
            screen_rect,
            0.0,
            egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 30),
        );
        painter.rect_stroke(screen_rect, 0.0, egui::Stroke::new(2.0, color));

        // Index tag above the top-left corner
        let galley = painter.layout_no_wrap(
            index.to_string(),
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
        let tag = egui::Rect::from_min_size(
            screen_rect.min - egui::vec2(0.0, galley.size().y + 4.0),
            galley.size() + egui::vec2(8.0, 4.0),
        );
        painter.rect_filled(tag, 2.0, color);
        painter.galley(tag.min + egui::vec2(4.0, 2.0), galley, egui::Color32::WHITE);

        if selected {
            for handle in Handle::ALL {
                let corner = rect.corner(handle);
                let center = image_rect.min + egui::vec2(corner.x as f32, corner.y as f32);
                let square = egui::Rect::from_center_size(center, egui::vec2(handle_size, handle_size));
                painter.rect_filled(square, 0.0, egui::Color32::WHITE);
                painter.rect_stroke(square, 0.0, egui::Stroke::new(1.0, color));
            }
        }
    }
}

/// Show the welcome message when no image is loaded.
fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("bbox-editor")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open an image to begin editing its bounding boxes")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Image...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
