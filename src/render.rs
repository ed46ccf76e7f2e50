// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Composite export rendering.
//!
//! Draws every annotation onto a copy of the image at its native
//! resolution: a translucent fill, a solid outline, and a tag above the
//! top-left corner holding the record's index. Tags of boxes touching the
//! top edge end up clipped off the canvas.

use crate::config::RenderStyle;
use crate::models::annotation::{AnnotationRecord, BBox};
use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size, Blend,
};
use imageproc::rect::Rect;
use std::path::Path;

/// 5x7 bitmaps for the digits 0-9, one byte per row, high bit on the left.
const DIGIT_GLYPHS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];
const GLYPH_COLUMNS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const GLYPH_PIXEL: u32 = 2;
const GLYPH_SPACING: u32 = 2;

/// Renders annotated composites with a fixed style.
pub struct Compositor {
    style: RenderStyle,
    font: Option<FontVec>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(RenderStyle::default())
    }
}

impl Compositor {
    /// Compositor drawing labels with the built-in digit glyphs.
    pub fn new(style: RenderStyle) -> Self {
        Self { style, font: None }
    }

    /// Compositor for `style`, loading its TTF label font when one is set.
    pub fn from_style(style: RenderStyle) -> Result<Self> {
        let font = match style.label_font.as_deref() {
            Some(path) => Some(load_font(path)?),
            None => None,
        };
        Ok(Self { style, font })
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draw `annotations` over a copy of `image`.
    pub fn render(&self, image: &RgbaImage, annotations: &[AnnotationRecord]) -> RgbaImage {
        let mut canvas = image.clone();

        for (index, record) in annotations.iter().enumerate() {
            let Some(rect) = self.pixel_rect(&record.bbox, canvas.width(), canvas.height()) else {
                log::warn!("Skipping box {} with unusable bbox {:?}", index, record.bbox.coords());
                continue;
            };

            // Fill blends; outline and tag are opaque.
            let mut blended = Blend(canvas);
            draw_filled_rect_mut(&mut blended, rect, Rgba(self.style.fill));
            canvas = blended.0;

            self.draw_outline(&mut canvas, rect);
            self.draw_label(&mut canvas, rect, &index.to_string());
        }

        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbaImage, rect: Rect) {
        let color = Rgba(self.style.stroke);
        let width = self.style.stroke_width as i32;

        for inset in -(width / 2)..(width - width / 2) {
            let w = rect.width() as i32 - 2 * inset;
            let h = rect.height() as i32 - 2 * inset;
            if w <= 0 || h <= 0 {
                continue;
            }
            let ring = Rect::at(rect.left().saturating_add(inset), rect.top().saturating_add(inset))
                .of_size(w as u32, h as u32);
            draw_hollow_rect_mut(canvas, ring, color);
        }
    }

    /// Pixel rectangle of a normalized box on a `width` x `height` image.
    ///
    /// Edges are clamped to the canvas widened by the outline and tag, so a
    /// box far off the image still yields drawable coordinates that land
    /// outside it.
    fn pixel_rect(&self, bbox: &BBox, width: u32, height: u32) -> Option<Rect> {
        if !bbox.coords().iter().all(|v| v.is_finite()) {
            return None;
        }

        let margin = self.style.label_height as f64 + self.style.stroke_width as f64 + 1.0;
        let (w, h) = (width as f64, height as f64);
        let clamp_x = |v: f64| (v * w).round().clamp(-margin, w + margin);
        let clamp_y = |v: f64| (v * h).round().clamp(-margin, h + margin);

        let left = clamp_x(bbox.x0().min(bbox.x1()));
        let top = clamp_y(bbox.y0().min(bbox.y1()));
        let right = clamp_x(bbox.x0().max(bbox.x1()));
        let bottom = clamp_y(bbox.y0().max(bbox.y1()));

        let rect_w = (right - left).max(1.0);
        let rect_h = (bottom - top).max(1.0);
        if rect_w > i32::MAX as f64 || rect_h > i32::MAX as f64 {
            return None;
        }

        Some(Rect::at(left as i32, top as i32).of_size(rect_w as u32, rect_h as u32))
    }

    /// Size of `text` as drawn inside a label tag.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(PxScale::from(self.style.label_font_size), font, text),
            None => builtin_text_size(text),
        }
    }

    fn draw_label(&self, canvas: &mut RgbaImage, rect: Rect, text: &str) {
        let (text_w, text_h) = self.text_size(text);
        let tag_w = text_w + 2 * self.style.label_padding;
        let tag_h = self.style.label_height.max(1);
        let tag_top = rect.top().saturating_sub(tag_h as i32);

        draw_filled_rect_mut(
            canvas,
            Rect::at(rect.left(), tag_top).of_size(tag_w.max(1), tag_h),
            Rgba(self.style.label_background),
        );

        let x = rect.left().saturating_add(self.style.label_padding as i32);
        let y = tag_top.saturating_add((tag_h as i32 - text_h as i32) / 2);
        let color = Rgba(self.style.label_text);

        match &self.font {
            Some(font) => draw_text_mut(
                canvas,
                color,
                x,
                y,
                PxScale::from(self.style.label_font_size),
                font,
                text,
            ),
            None => draw_builtin_text(canvas, color, x, y, text),
        }
    }
}

/// Render with the default style and built-in label glyphs.
pub fn render_composite(image: &RgbaImage, annotations: &[AnnotationRecord]) -> RgbaImage {
    Compositor::default().render(image, annotations)
}

fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read label font {}", path.display()))?;
    FontVec::try_from_vec(bytes)
        .with_context(|| format!("Invalid label font {}", path.display()))
}

fn builtin_text_size(text: &str) -> (u32, u32) {
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0, 0);
    }
    let advance = GLYPH_COLUMNS * GLYPH_PIXEL + GLYPH_SPACING;
    (count * advance - GLYPH_SPACING, GLYPH_ROWS * GLYPH_PIXEL)
}

fn draw_builtin_text(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
    let advance = (GLYPH_COLUMNS * GLYPH_PIXEL + GLYPH_SPACING) as i32;
    let cell = GLYPH_PIXEL as i32;

    for (n, ch) in text.chars().enumerate() {
        // Labels are indices; anything else leaves a blank cell.
        let Some(glyph) = ch.to_digit(10).map(|d| &DIGIT_GLYPHS[d as usize]) else {
            continue;
        };
        let origin_x = x + n as i32 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_COLUMNS {
                if bits & (1 << (GLYPH_COLUMNS - 1 - col)) == 0 {
                    continue;
                }
                let px = origin_x + col as i32 * cell;
                let py = y + row as i32 * cell;
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(GLYPH_PIXEL, GLYPH_PIXEL), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const RED: Rgba<u8> = Rgba([231, 76, 60, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn record(x0: f64, y0: f64, x1: f64, y1: f64) -> AnnotationRecord {
        AnnotationRecord::new(BBox::new(x0, y0, x1, y1))
    }

    #[test]
    fn test_no_annotations_is_identity() {
        let image = RgbaImage::from_pixel(16, 16, BASE);
        assert_eq!(render_composite(&image, &[]), image);
    }

    #[test]
    fn test_box_fill_outline_and_label() {
        let image = RgbaImage::from_pixel(100, 100, BASE);
        let out = render_composite(&image, &[record(0.2, 0.3, 0.6, 0.7)]);

        assert_eq!(out.dimensions(), (100, 100));

        // 2px outline straddles the left edge at x = 20
        assert_eq!(out.get_pixel(19, 50), &RED);
        assert_eq!(out.get_pixel(20, 50), &RED);
        assert_eq!(out.get_pixel(60, 50), &RED);

        // translucent interior tints the base color
        let inside = out.get_pixel(40, 50);
        assert!(inside[0] > 0 && inside[2] < 255, "interior {:?}", inside);
        assert_eq!(inside[3], 255);

        // outside untouched
        assert_eq!(out.get_pixel(5, 5), &BASE);
        assert_eq!(out.get_pixel(90, 90), &BASE);

        // tag spans x 20..40, y 10..30; digit "0" starts at (25, 13)
        assert_eq!(out.get_pixel(21, 11), &RED);
        assert_eq!(out.get_pixel(38, 11), &RED);
        assert_eq!(out.get_pixel(41, 11), &BASE);
        assert_eq!(out.get_pixel(27, 13), &WHITE);
        assert_eq!(out.get_pixel(25, 13), &RED);
    }

    #[test]
    fn test_label_width_follows_index() {
        let compositor = Compositor::default();
        assert_eq!(compositor.text_size("0"), (10, 14));
        assert_eq!(compositor.text_size("12"), (22, 14));
        assert_eq!(compositor.text_size(""), (0, 0));
    }

    #[test]
    fn test_top_edge_box_label_is_clipped() {
        let image = RgbaImage::from_pixel(50, 50, BASE);
        let out = render_composite(&image, &[record(0.0, 0.0, 0.5, 0.5)]);

        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(40, 40), &BASE);
    }

    #[test]
    fn test_out_of_range_boxes_do_not_panic() {
        let image = RgbaImage::from_pixel(20, 20, BASE);
        let records = [
            record(-1.0, -1.0, 2.0, 2.0),
            record(0.9, 0.9, 0.1, 0.1),
            record(0.5, 0.5, 0.5, 0.5),
            record(f64::NAN, 0.0, 1.0, 1.0),
            record(0.1, -3e7, 0.5, -29999999.5),
            record(1e12, 1e12, 2e12, 2e12),
            record(-1e300, 0.2, 1e300, 0.4),
            record(0.2, f64::MAX, 0.4, f64::MAX),
        ];
        let out = render_composite(&image, &records);
        assert_eq!(out.dimensions(), (20, 20));
    }

    #[test]
    fn test_far_off_boxes_leave_image_untouched() {
        let image = RgbaImage::from_pixel(20, 20, BASE);
        let records = [
            record(0.1, -3e7, 0.5, -29999999.5),
            record(1e12, 1e12, 2e12, 2e12),
            record(-5e9, 0.2, -4e9, 0.6),
        ];
        let out = render_composite(&image, &records);
        assert!(out.pixels().all(|p| *p == BASE));
    }

    #[test]
    fn test_later_boxes_draw_on_top() {
        let image = RgbaImage::from_pixel(100, 100, BASE);
        let mut style = RenderStyle::default();
        style.stroke = [0, 255, 0, 255];
        let compositor = Compositor::new(style);

        let out = compositor.render(&image, &[record(0.2, 0.2, 0.8, 0.8), record(0.2, 0.5, 0.8, 0.9)]);
        assert_eq!(out.get_pixel(50, 50), &Rgba([0, 255, 0, 255]));
    }
}
