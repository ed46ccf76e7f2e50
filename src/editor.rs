// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation editor state.
//!
//! [`Editor`] owns the annotation set, the selection, the loaded image and
//! the current display scale. All mutation goes through its methods, or
//! through [`Editor::apply`] for front-ends that prefer to emit
//! [`Command`]s. It holds no UI types and is driven from a single thread.

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::io::media::ImageHandle;
use crate::io::serialization;
use crate::models::annotation::{AnnotationRecord, BoxProperties, PropertyKey, PropertyValue};
use crate::render::Compositor;
use crate::util::geometry::{
    display_scale, move_rect, resize_rect, to_display, to_normalized, DisplayRect, DisplaySize,
    Handle, Point,
};
use image::RgbaImage;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Body of the box at `index`; starts a drag.
    Box(usize),
    /// Corner handle of the box at `index`; starts a resize.
    Handle(usize, Handle),
}

impl HitTarget {
    pub fn index(self) -> usize {
        match self {
            HitTarget::Box(index) | HitTarget::Handle(index, _) => index,
        }
    }
}

/// Gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    Dragging { last: Point },
    Resizing { handle: Handle, last: Point },
}

/// Input to [`Editor::apply`].
#[derive(Debug, Clone)]
pub enum Command {
    LoadImage(ImageHandle),
    ImportJson(String),
    LiveEdit(String),
    CreateNew,
    Select(Option<usize>),
    ClearSelection,
    SetProperty {
        index: usize,
        key: String,
        value: PropertyValue,
    },
    AddBox,
    DeleteSelected,
    PointerDown { target: HitTarget, pos: Point },
    PointerMove { pos: Point },
    PointerUp,
    /// The image is now rendered `rendered_width` pixels wide.
    Viewport { rendered_width: f64 },
}

/// Effect of a successfully applied command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    SelectionChanged,
    /// Records changed; views of the JSON text are stale.
    AnnotationsChanged,
    /// Records were replaced from draft JSON text, which is already current.
    DraftApplied,
}

impl Outcome {
    /// Whether a JSON text view should be regenerated from the records.
    pub fn refreshes_json(self) -> bool {
        matches!(self, Outcome::AnnotationsChanged)
    }
}

/// Bounding box editor.
pub struct Editor {
    config: EditorConfig,
    compositor: Compositor,
    annotations: Vec<AnnotationRecord>,
    selection: Option<usize>,
    image: Option<ImageHandle>,
    scale: f64,
    interaction: Interaction,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Editor using `config`, with built-in label glyphs for exports.
    pub fn new(config: EditorConfig) -> Self {
        let compositor = Compositor::new(config.style.clone());
        Self::with_compositor(config, compositor)
    }

    pub fn with_compositor(config: EditorConfig, compositor: Compositor) -> Self {
        Self {
            config,
            compositor,
            annotations: Vec::new(),
            selection: None,
            image: None,
            scale: 1.0,
            interaction: Interaction::Idle,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn annotations(&self) -> &[AnnotationRecord] {
        &self.annotations
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn display_scale(&self) -> f64 {
        self.scale
    }

    /// Rendered image size, or `None` before an image is loaded.
    pub fn displayed_size(&self) -> Option<DisplaySize> {
        self.image
            .as_ref()
            .map(|image| DisplaySize::from_scale(image.width(), image.height(), self.scale))
    }

    /// Display rectangle of the box at `index`.
    pub fn display_rect(&self, index: usize) -> Option<DisplayRect> {
        let size = self.displayed_size()?;
        self.annotations
            .get(index)
            .map(|record| to_display(&record.bbox, size))
    }

    /// Whether a drag or resize is in progress.
    pub fn is_interacting(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    /// Replace the image. The annotation set and selection are reset and the
    /// display scale returns to 1 until the next viewport report.
    pub fn load_image(&mut self, image: ImageHandle) {
        log::info!("Image set ({}x{}), annotations reset", image.width(), image.height());
        self.image = Some(image);
        self.scale = 1.0;
        self.annotations.clear();
        self.selection = None;
        self.interaction = Interaction::Idle;
    }

    /// Record the rendered width of the image and recompute the display scale.
    pub fn set_viewport(&mut self, rendered_width: f64) -> Result<f64> {
        let image = self.image.as_ref().ok_or(EditorError::NoImage)?;
        let scale = display_scale(rendered_width, image.width());
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EditorError::InvalidScale(scale));
        }
        if scale != self.scale {
            log::debug!("Display scale {:.4} -> {:.4}", self.scale, scale);
            self.scale = scale;
        }
        Ok(scale)
    }

    /// Select the box at `index`, or clear the selection for `None` or an
    /// out-of-range index. Returns the selected box's editable fields.
    pub fn select(&mut self, index: Option<usize>) -> Option<BoxProperties> {
        match index.filter(|&i| i < self.annotations.len()) {
            Some(i) => {
                self.selection = Some(i);
                log::debug!("Selected box {}", i);
                self.selected_properties()
            }
            None => {
                self.clear_selection();
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            log::debug!("Selection cleared");
        }
    }

    /// Editable fields of the selected box.
    pub fn selected_properties(&self) -> Option<BoxProperties> {
        let index = self.selection?;
        self.annotations
            .get(index)
            .map(|record| BoxProperties::from_record(index, record))
    }

    /// Write one editable property of the box at `index`.
    ///
    /// Only `type`, `content`, `source` (strings) and `interactivity`
    /// (boolean) are accepted; anything else is rejected unchanged.
    pub fn set_property(&mut self, index: usize, key: &str, value: PropertyValue) -> Result<()> {
        let key: PropertyKey = key.parse().map_err(EditorError::UnknownProperty)?;
        let len = self.annotations.len();
        let record = self
            .annotations
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange { index, len })?;

        record.set(key, value).map_err(|_| EditorError::PropertyType {
            key: key.as_str(),
            expected: key.expected(),
        })?;
        log::debug!("Box {}: set {}", index, key);
        Ok(())
    }

    /// Append the configured default box and select it.
    pub fn add_box(&mut self) -> Result<usize> {
        if self.image.is_none() {
            return Err(EditorError::NoImage);
        }
        self.annotations.push(self.config.new_box.to_record());
        let index = self.annotations.len() - 1;
        self.select(Some(index));
        log::info!("Added box {}, total: {}", index, self.annotations.len());
        Ok(index)
    }

    /// Remove the selected box; later boxes shift down by one.
    pub fn delete_selected(&mut self) -> Result<AnnotationRecord> {
        let index = self.selection.ok_or(EditorError::NoSelection)?;
        if index >= self.annotations.len() {
            self.selection = None;
            return Err(EditorError::NoSelection);
        }
        let removed = self.annotations.remove(index);
        self.selection = None;
        self.interaction = Interaction::Idle;
        log::info!("Deleted box {}, total: {}", index, self.annotations.len());
        Ok(removed)
    }

    /// Empty the annotation set.
    pub fn create_new(&mut self) {
        self.replace_annotations(Vec::new());
        self.selection = None;
        log::info!("Started a new annotation set");
    }

    /// Replace all annotations with the parsed JSON array.
    ///
    /// On a parse error nothing changes and the error is returned.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let records = serialization::parse_annotations(text).map_err(EditorError::InvalidJson)?;
        let count = records.len();
        self.replace_annotations(records);
        self.selection = None;
        log::info!("Imported {} annotations", count);
        Ok(count)
    }

    /// Apply draft JSON text typed by the user.
    ///
    /// Unparseable drafts are ignored and `false` is returned. A successful
    /// draft keeps the selection if its index still exists.
    pub fn live_edit(&mut self, text: &str) -> bool {
        match serialization::parse_annotations(text) {
            Ok(records) => {
                self.replace_annotations(records);
                if self.selection.is_some_and(|i| i >= self.annotations.len()) {
                    self.selection = None;
                }
                true
            }
            Err(e) => {
                log::debug!("Ignoring draft JSON: {}", e);
                false
            }
        }
    }

    /// Serialize the annotation set as two-space indented JSON.
    pub fn export_json(&self) -> Result<String> {
        serialization::annotations_to_json(&self.annotations).map_err(EditorError::Serialization)
    }

    /// Render the image at native resolution with every box drawn on it.
    pub fn render_composite(&self) -> Result<RgbaImage> {
        let image = self.image.as_ref().ok_or(EditorError::NoImage)?;
        Ok(self.compositor.render(image.pixels(), &self.annotations))
    }

    /// Translate the selected box by a display-pixel delta, keeping it inside
    /// the image. Returns the new display rectangle.
    pub fn move_selected(&mut self, dx: f64, dy: f64) -> Result<DisplayRect> {
        let (index, rect, size) = self.selected_geometry()?;
        let moved = move_rect(&rect, dx, dy, size);
        self.annotations[index].bbox = to_normalized(&moved, size);
        Ok(moved)
    }

    /// Drag `handle` of the selected box by a display-pixel delta.
    pub fn resize_selected(&mut self, handle: Handle, dx: f64, dy: f64) -> Result<DisplayRect> {
        let (index, rect, size) = self.selected_geometry()?;
        let resized = resize_rect(&rect, handle, dx, dy, size, self.config.min_box_size);
        self.annotations[index].bbox = to_normalized(&resized, size);
        Ok(resized)
    }

    fn selected_geometry(&self) -> Result<(usize, DisplayRect, DisplaySize)> {
        let size = self.displayed_size().ok_or(EditorError::NoImage)?;
        let index = self.selection.ok_or(EditorError::NoSelection)?;
        let record = self.annotations.get(index).ok_or(EditorError::NoSelection)?;
        Ok((index, to_display(&record.bbox, size), size))
    }

    /// Find what lies under `pos` (display pixels).
    ///
    /// Handles of the selected box win, then boxes from the top-most (last)
    /// down.
    pub fn hit_test(&self, pos: Point) -> Option<HitTarget> {
        let reach = self.config.handle_size / 2.0;

        if let Some((index, rect)) = self
            .selection
            .and_then(|i| self.display_rect(i).map(|rect| (i, rect)))
        {
            for handle in Handle::ALL {
                let corner = rect.corner(handle);
                if (pos.x - corner.x).abs() <= reach && (pos.y - corner.y).abs() <= reach {
                    return Some(HitTarget::Handle(index, handle));
                }
            }
        }

        (0..self.annotations.len())
            .rev()
            .find(|&i| self.display_rect(i).is_some_and(|rect| rect.contains(pos)))
            .map(HitTarget::Box)
    }

    /// Begin a drag or resize of the target box at `pos`.
    pub fn pointer_down(&mut self, target: HitTarget, pos: Point) -> Result<()> {
        if self.image.is_none() {
            return Err(EditorError::NoImage);
        }
        let index = target.index();
        if index >= self.annotations.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.annotations.len(),
            });
        }

        self.select(Some(index));
        self.interaction = match target {
            HitTarget::Box(_) => Interaction::Dragging { last: pos },
            HitTarget::Handle(_, handle) => Interaction::Resizing { handle, last: pos },
        };
        match target {
            HitTarget::Box(index) => log::debug!("Dragging box {}", index),
            HitTarget::Handle(index, handle) => {
                log::debug!("Resizing box {} from its {} corner", index, handle)
            }
        }
        Ok(())
    }

    /// Apply the pointer movement since the previous position to the
    /// gesture in progress. Returns whether a box changed.
    pub fn pointer_move(&mut self, pos: Point) -> Result<bool> {
        let (last, handle) = match self.interaction {
            Interaction::Idle => return Ok(false),
            Interaction::Dragging { last } => (last, None),
            Interaction::Resizing { handle, last } => (last, Some(handle)),
        };
        if self.selection.is_none() {
            self.interaction = Interaction::Idle;
            return Ok(false);
        }

        let (dx, dy) = (pos.x - last.x, pos.y - last.y);
        match handle {
            None => {
                self.move_selected(dx, dy)?;
                self.interaction = Interaction::Dragging { last: pos };
            }
            Some(handle) => {
                self.resize_selected(handle, dx, dy)?;
                self.interaction = Interaction::Resizing { handle, last: pos };
            }
        }
        Ok(true)
    }

    /// End the gesture in progress.
    pub fn pointer_up(&mut self) {
        if self.is_interacting() {
            log::debug!("Pointer up");
        }
        self.interaction = Interaction::Idle;
    }

    /// Apply a front-end command.
    pub fn apply(&mut self, command: Command) -> Result<Outcome> {
        let outcome = match command {
            Command::LoadImage(image) => {
                self.load_image(image);
                Outcome::AnnotationsChanged
            }
            Command::ImportJson(text) => {
                self.import_json(&text)?;
                Outcome::AnnotationsChanged
            }
            Command::LiveEdit(text) => {
                if self.live_edit(&text) {
                    Outcome::DraftApplied
                } else {
                    Outcome::Unchanged
                }
            }
            Command::CreateNew => {
                self.create_new();
                Outcome::AnnotationsChanged
            }
            Command::Select(index) => {
                let before = self.selection;
                self.select(index);
                changed_selection(before, self.selection)
            }
            Command::ClearSelection => {
                let before = self.selection;
                self.clear_selection();
                changed_selection(before, self.selection)
            }
            Command::SetProperty { index, key, value } => {
                self.set_property(index, &key, value)?;
                Outcome::AnnotationsChanged
            }
            Command::AddBox => {
                self.add_box()?;
                Outcome::AnnotationsChanged
            }
            Command::DeleteSelected => {
                self.delete_selected()?;
                Outcome::AnnotationsChanged
            }
            Command::PointerDown { target, pos } => {
                let before = self.selection;
                self.pointer_down(target, pos)?;
                changed_selection(before, self.selection)
            }
            Command::PointerMove { pos } => {
                if self.pointer_move(pos)? {
                    Outcome::AnnotationsChanged
                } else {
                    Outcome::Unchanged
                }
            }
            Command::PointerUp => {
                self.pointer_up();
                Outcome::Unchanged
            }
            Command::Viewport { rendered_width } => {
                self.set_viewport(rendered_width)?;
                Outcome::Unchanged
            }
        };
        Ok(outcome)
    }

    fn replace_annotations(&mut self, records: Vec<AnnotationRecord>) {
        self.annotations = records;
        self.interaction = Interaction::Idle;
    }
}

fn changed_selection(before: Option<usize>, after: Option<usize>) -> Outcome {
    if before == after {
        Outcome::Unchanged
    } else {
        Outcome::SelectionChanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::BBox;
    use image::Rgba;
    use serde_json::Value;

    const FIVE: &str = r#"[
  {"type": "text", "bbox": [0.0, 0.0, 0.1, 0.1], "interactivity": false, "content": "a", "source": "ocr"},
  {"type": "text", "bbox": [0.1, 0.1, 0.2, 0.2], "interactivity": false, "content": "b", "source": "ocr"},
  {"type": "icon", "bbox": [0.2, 0.2, 0.3, 0.3], "interactivity": true, "content": "c", "source": "ocr"},
  {"type": "text", "bbox": [0.3, 0.3, 0.4, 0.4], "interactivity": false, "content": "d", "source": "ocr"},
  {"type": "text", "bbox": [0.4, 0.4, 0.5, 0.5], "interactivity": false, "content": "e", "source": "ocr"}
]"#;

    fn image(width: u32, height: u32) -> ImageHandle {
        ImageHandle::from_rgba(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))).unwrap()
    }

    /// 400x200 image rendered at half size (200x100 display pixels).
    fn editor_with_image() -> Editor {
        let mut editor = Editor::default();
        editor.load_image(image(400, 200));
        editor.set_viewport(200.0).unwrap();
        editor
    }

    fn contents(editor: &Editor) -> Vec<String> {
        editor
            .annotations()
            .iter()
            .map(|r| r.content().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_add_box_requires_image() {
        let mut editor = Editor::default();

        assert!(matches!(editor.add_box(), Err(EditorError::NoImage)));
        assert!(editor.annotations().is_empty());
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_add_box_appends_default_and_selects() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        let index = editor.add_box().unwrap();
        assert_eq!(index, 5);
        assert_eq!(editor.selection(), Some(5));

        let props = editor.selected_properties().unwrap();
        assert_eq!(props.kind, "text");
        assert_eq!(props.content, "New Box");
        assert_eq!(props.source, "manual");
        assert!(!props.interactivity);
        assert_eq!(editor.annotations()[5].bbox, BBox::new(0.4, 0.4, 0.6, 0.5));
    }

    #[test]
    fn test_delete_reindexes_and_clears_selection() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        editor.select(Some(2));

        let removed = editor.delete_selected().unwrap();
        assert_eq!(removed.content(), Some("c"));
        assert_eq!(contents(&editor), ["a", "b", "d", "e"]);
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_delete_without_selection_fails() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        assert!(matches!(editor.delete_selected(), Err(EditorError::NoSelection)));
        assert_eq!(editor.annotations().len(), 5);
    }

    #[test]
    fn test_select_out_of_range_clears() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        let props = editor.select(Some(1)).unwrap();
        assert_eq!(props.index, 1);
        assert_eq!(props.content, "b");

        assert!(editor.select(Some(5)).is_none());
        assert_eq!(editor.selection(), None);

        editor.select(Some(4));
        assert!(editor.select(None).is_none());
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_import_invalid_json_keeps_state() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        editor.select(Some(3));

        let result = editor.import_json("{invalid");
        assert!(matches!(result, Err(EditorError::InvalidJson(_))));
        assert_eq!(editor.annotations().len(), 5);
        assert_eq!(editor.selection(), Some(3));
    }

    #[test]
    fn test_import_clears_selection() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        editor.select(Some(0));

        editor.import_json(FIVE).unwrap();
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_live_edit_ignores_invalid_draft() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        let before = editor.annotations().to_vec();

        assert!(!editor.live_edit("{invalid"));
        assert!(!editor.live_edit(r#"[{"bbox": [0.1, 0.2"#));
        assert_eq!(editor.annotations(), &before[..]);
    }

    #[test]
    fn test_live_edit_revalidates_selection() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        editor.select(Some(1));
        assert!(editor.live_edit(r#"[{"bbox": [0, 0, 1, 1]}, {"bbox": [0, 0, 0.5, 0.5]}]"#));
        assert_eq!(editor.selection(), Some(1));

        editor.select(Some(1));
        assert!(editor.live_edit(r#"[{"bbox": [0, 0, 1, 1]}]"#));
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn test_export_roundtrip() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        let exported = editor.export_json().unwrap();
        let a: Value = serde_json::from_str(FIVE).unwrap();
        let b: Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_fields_survive_edits() {
        let mut editor = editor_with_image();
        editor
            .import_json(r#"[{"bbox": [0.1, 0.1, 0.3, 0.3], "content": "x", "confidence": 0.8, "meta": {"page": 2}}]"#)
            .unwrap();
        editor.select(Some(0));
        editor.move_selected(10.0, 10.0).unwrap();
        editor.set_property(0, "content", "y".into()).unwrap();

        let exported: Value = serde_json::from_str(&editor.export_json().unwrap()).unwrap();
        assert_eq!(exported[0]["confidence"], 0.8);
        assert_eq!(exported[0]["meta"]["page"], 2);
        assert_eq!(exported[0]["content"], "y");
        assert!(exported[0].get("type").is_none());
    }

    #[test]
    fn test_import_keeps_metadata_and_numbers_as_written() {
        let input = r#"[
  {"bbox": [0, 0, 1, 1], "type": null, "content": 42, "interactivity": "yes"},
  {"bbox": [0, 0, 1, 1], "type": "image"}
]"#;
        let mut editor = editor_with_image();
        editor.import_json(input).unwrap();

        let props = editor.select(Some(0)).unwrap();
        assert_eq!(props.kind, "");
        assert_eq!(props.content, "42");
        assert!(props.interactivity);

        let original: Value = serde_json::from_str(input).unwrap();
        let exported: Value = serde_json::from_str(&editor.export_json().unwrap()).unwrap();
        assert_eq!(exported, original);

        // Only the edited box is rewritten
        editor.select(Some(1));
        editor.move_selected(-10.0, 0.0).unwrap();
        editor.set_property(1, "content", "z".into()).unwrap();
        let exported: Value = serde_json::from_str(&editor.export_json().unwrap()).unwrap();
        assert_eq!(exported[0], original[0]);
        assert_eq!(exported[1]["bbox"], serde_json::json!([0.0, 0.0, 1.0, 1.0]));
        assert!(exported[1]["bbox"][2].is_f64());
        assert_eq!(exported[1]["content"], "z");
    }

    #[test]
    fn test_create_new_empties_set() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        editor.select(Some(2));

        editor.create_new();
        assert!(editor.annotations().is_empty());
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.export_json().unwrap(), "[]");
    }

    #[test]
    fn test_load_image_resets_annotations() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        editor.select(Some(2));

        editor.load_image(image(10, 10));
        assert!(editor.annotations().is_empty());
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.display_scale(), 1.0);
    }

    #[test]
    fn test_set_property() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();

        editor.set_property(2, "type", "button".into()).unwrap();
        editor.set_property(2, "interactivity", false.into()).unwrap();
        assert_eq!(editor.annotations()[2].kind(), Some("button"));
        assert_eq!(editor.annotations()[2].interactivity(), Some(false));

        let before = editor.annotations().to_vec();
        assert!(matches!(
            editor.set_property(2, "bbox", "oops".into()),
            Err(EditorError::UnknownProperty(key)) if key == "bbox"
        ));
        assert!(matches!(
            editor.set_property(2, "interactivity", "yes".into()),
            Err(EditorError::PropertyType { key: "interactivity", .. })
        ));
        assert!(matches!(
            editor.set_property(9, "content", "z".into()),
            Err(EditorError::IndexOutOfRange { index: 9, len: 5 })
        ));
        assert_eq!(editor.annotations(), &before[..]);
    }

    #[test]
    fn test_viewport_requires_image_and_positive_width() {
        let mut editor = Editor::default();
        assert!(matches!(editor.set_viewport(100.0), Err(EditorError::NoImage)));

        editor.load_image(image(400, 200));
        assert!(matches!(editor.set_viewport(0.0), Err(EditorError::InvalidScale(_))));
        assert!((editor.set_viewport(100.0).unwrap() - 0.25).abs() < 1e-12);

        let size = editor.displayed_size().unwrap();
        assert_eq!((size.width, size.height), (100.0, 50.0));
    }

    #[test]
    fn test_move_writes_normalized_bbox() {
        let mut editor = editor_with_image();
        editor.import_json(r#"[{"bbox": [0.1, 0.2, 0.3, 0.4]}]"#).unwrap();
        editor.select(Some(0));

        // display rect (20, 20, 40, 20) in 200x100
        let rect = editor.move_selected(30.0, 10.0).unwrap();
        assert!((rect.left - 50.0).abs() < 1e-9 && (rect.top - 30.0).abs() < 1e-9);
        assert!(editor.annotations()[0].bbox.approx_eq(&BBox::new(0.25, 0.3, 0.45, 0.5), 1e-12));

        editor.move_selected(1000.0, 1000.0).unwrap();
        assert!(editor.annotations()[0].bbox.approx_eq(&BBox::new(0.8, 0.8, 1.0, 1.0), 1e-12));
    }

    #[test]
    fn test_move_requires_selection() {
        let mut editor = editor_with_image();
        editor.import_json(FIVE).unwrap();
        let before = editor.annotations().to_vec();

        assert!(matches!(editor.move_selected(5.0, 5.0), Err(EditorError::NoSelection)));
        assert!(matches!(
            editor.resize_selected(Handle::Se, 5.0, 5.0),
            Err(EditorError::NoSelection)
        ));
        assert_eq!(editor.annotations(), &before[..]);
    }

    #[test]
    fn test_resize_respects_configured_minimum() {
        let config = EditorConfig {
            min_box_size: 20.0,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(config);
        editor.load_image(image(200, 100));
        editor.import_json(r#"[{"bbox": [0.1, 0.1, 0.5, 0.5]}]"#).unwrap();
        editor.select(Some(0));

        let rect = editor.resize_selected(Handle::Se, -100.0, -100.0).unwrap();
        assert_eq!((rect.width, rect.height), (20.0, 20.0));
    }

    #[test]
    fn test_hit_test_prefers_handles_then_topmost() {
        let mut editor = editor_with_image();
        // display rects (20,10,60,40) and (40,20,60,40) in 200x100
        editor
            .import_json(r#"[{"bbox": [0.1, 0.1, 0.4, 0.5]}, {"bbox": [0.2, 0.2, 0.5, 0.6]}]"#)
            .unwrap();

        assert_eq!(editor.hit_test(Point::new(50.0, 30.0)), Some(HitTarget::Box(1)));
        assert_eq!(editor.hit_test(Point::new(25.0, 15.0)), Some(HitTarget::Box(0)));
        assert_eq!(editor.hit_test(Point::new(150.0, 90.0)), None);

        // handles only belong to the selected box
        assert_eq!(editor.hit_test(Point::new(80.0, 50.0)), Some(HitTarget::Box(1)));
        editor.select(Some(0));
        assert_eq!(
            editor.hit_test(Point::new(81.0, 49.0)),
            Some(HitTarget::Handle(0, Handle::Se))
        );
        assert_eq!(
            editor.hit_test(Point::new(20.0, 10.0)),
            Some(HitTarget::Handle(0, Handle::Nw))
        );
    }

    #[test]
    fn test_drag_gesture_applies_incremental_deltas() {
        let mut editor = editor_with_image();
        editor.import_json(r#"[{"bbox": [0.1, 0.1, 0.3, 0.3]}]"#).unwrap();

        editor
            .pointer_down(HitTarget::Box(0), Point::new(25.0, 15.0))
            .unwrap();
        assert_eq!(editor.selection(), Some(0));
        assert!(editor.is_interacting());

        assert!(editor.pointer_move(Point::new(30.0, 20.0)).unwrap());
        assert!(editor.pointer_move(Point::new(40.0, 25.0)).unwrap());
        editor.pointer_up();
        assert!(!editor.is_interacting());

        // (20,10) moved by (15,10)
        let rect = editor.display_rect(0).unwrap();
        assert!((rect.left - 35.0).abs() < 1e-9 && (rect.top - 20.0).abs() < 1e-9);
        assert!((rect.width - 40.0).abs() < 1e-9 && (rect.height - 20.0).abs() < 1e-9);

        assert!(!editor.pointer_move(Point::new(0.0, 0.0)).unwrap());
    }

    #[test]
    fn test_resize_gesture_through_commands() {
        let mut editor = editor_with_image();
        editor.import_json(r#"[{"bbox": [0.05, 0.1, 0.3, 0.6]}]"#).unwrap();

        // display rect (10,10,50,50)
        let outcome = editor
            .apply(Command::PointerDown {
                target: HitTarget::Handle(0, Handle::Se),
                pos: Point::new(60.0, 60.0),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::SelectionChanged);

        let outcome = editor
            .apply(Command::PointerMove {
                pos: Point::new(65.0, 65.0),
            })
            .unwrap();
        assert!(outcome.refreshes_json());
        editor.apply(Command::PointerUp).unwrap();

        let rect = editor.display_rect(0).unwrap();
        assert!((rect.left - 10.0).abs() < 1e-9 && (rect.top - 10.0).abs() < 1e-9);
        assert!((rect.width - 55.0).abs() < 1e-9 && (rect.height - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_reports_errors_without_mutation() {
        let mut editor = Editor::default();
        assert!(matches!(editor.apply(Command::AddBox), Err(EditorError::NoImage)));
        assert!(matches!(
            editor.apply(Command::DeleteSelected),
            Err(EditorError::NoSelection)
        ));
        assert!(editor.annotations().is_empty());

        editor.apply(Command::LoadImage(image(100, 100))).unwrap();
        assert_eq!(
            editor.apply(Command::LiveEdit("[".to_string())).unwrap(),
            Outcome::Unchanged
        );
        assert_eq!(
            editor.apply(Command::LiveEdit("[]".to_string())).unwrap(),
            Outcome::DraftApplied
        );
        assert!(!Outcome::DraftApplied.refreshes_json());
        assert_eq!(
            editor.apply(Command::ClearSelection).unwrap(),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_render_composite_requires_image() {
        let mut editor = Editor::default();
        assert!(matches!(editor.render_composite(), Err(EditorError::NoImage)));

        editor.load_image(image(40, 30));
        editor.add_box().unwrap();
        let composite = editor.render_composite().unwrap();
        assert_eq!(composite.dimensions(), (40, 30));
    }
}
