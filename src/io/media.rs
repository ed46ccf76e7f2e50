// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading and encoding.
//!
//! This module decodes image files into RGBA rasters whose intrinsic size
//! defines the normalized coordinate space, and encodes rendered
//! composites as PNG.

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// A decoded image with its intrinsic pixel dimensions.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    pixels: RgbaImage,
}

impl ImageHandle {
    /// Wrap an RGBA raster. Fails if either dimension is zero.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            bail!("Image has no pixels ({}x{})", pixels.width(), pixels.height());
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decode an image from encoded bytes (PNG, JPEG, ...).
pub fn decode_image(bytes: &[u8]) -> Result<ImageHandle> {
    let decoded = image::load_from_memory(bytes).context("Failed to decode image")?;
    ImageHandle::from_rgba(decoded.to_rgba8())
}

/// Load and decode an image file.
pub fn load_image(path: &Path) -> Result<ImageHandle> {
    let decoded = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    ImageHandle::from_rgba(decoded.to_rgba8())
}

/// Encode a raster as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(bytes.into_inner())
}

/// Write a raster to `path` as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = encode_png(image)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
