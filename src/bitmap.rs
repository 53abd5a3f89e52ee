// SPDX-License-Identifier: GPL-3.0-only

//! In-memory RGBA bitmap with display metadata
//!
//! A [`Bitmap`] is what the picker hands to the filter engine and what the
//! engine hands back. Pixel data sits behind an `Arc<[u8]>` so clones are
//! cheap and nothing downstream can mutate the caller's pixels.

use image::RgbaImage;
use std::sync::Arc;

/// Bytes per RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Display orientation of a bitmap, matching the eight EXIF orientations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Orientation {
    /// Pixels are stored upright (EXIF 1)
    #[default]
    Up,
    /// Rotated 180 degrees (EXIF 3)
    Down,
    /// Needs 90 degrees counter-clockwise rotation to display (EXIF 8)
    Left,
    /// Needs 90 degrees clockwise rotation to display (EXIF 6)
    Right,
    /// Horizontally flipped (EXIF 2)
    UpMirrored,
    /// Vertically flipped (EXIF 4)
    DownMirrored,
    /// Transposed (EXIF 5)
    LeftMirrored,
    /// Transversed (EXIF 7)
    RightMirrored,
}

impl From<image::metadata::Orientation> for Orientation {
    fn from(value: image::metadata::Orientation) -> Self {
        use image::metadata::Orientation as Exif;
        match value {
            Exif::NoTransforms => Self::Up,
            Exif::Rotate90 => Self::Right,
            Exif::Rotate180 => Self::Down,
            Exif::Rotate270 => Self::Left,
            Exif::FlipHorizontal => Self::UpMirrored,
            Exif::FlipVertical => Self::DownMirrored,
            Exif::Rotate90FlipH => Self::LeftMirrored,
            Exif::Rotate270FlipH => Self::RightMirrored,
        }
    }
}

impl From<Orientation> for image::metadata::Orientation {
    fn from(value: Orientation) -> Self {
        use image::metadata::Orientation as Exif;
        match value {
            Orientation::Up => Exif::NoTransforms,
            Orientation::Right => Exif::Rotate90,
            Orientation::Down => Exif::Rotate180,
            Orientation::Left => Exif::Rotate270,
            Orientation::UpMirrored => Exif::FlipHorizontal,
            Orientation::DownMirrored => Exif::FlipVertical,
            Orientation::LeftMirrored => Exif::Rotate90FlipH,
            Orientation::RightMirrored => Exif::Rotate270FlipH,
        }
    }
}

/// RGBA8 pixel buffer plus scale/orientation metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows, `width * height * 4` bytes when well formed
    pub data: Arc<[u8]>,
    /// Display scale (points to pixels)
    pub scale: f32,
    pub orientation: Orientation,
}

impl Bitmap {
    /// Wrap raw RGBA bytes without validating them
    ///
    /// Malformed buffers are accepted here and rejected by the filter engine,
    /// so a bad picker result surfaces as a render failure instead of a panic.
    pub fn new(
        width: u32,
        height: u32,
        data: impl Into<Arc<[u8]>>,
        scale: f32,
        orientation: Orientation,
    ) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            scale,
            orientation,
        }
    }

    /// Build a bitmap from a decoded image
    pub fn from_rgba(image: RgbaImage, scale: f32, orientation: Orientation) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw(), scale, orientation)
    }

    /// Single-colour bitmap, handy for previews and tests
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let data: Vec<u8> = rgba.iter().copied().cycle().take(pixels * 4).collect();
        Self::new(width, height, data, 1.0, Orientation::Up)
    }

    /// Either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Buffer length matches the dimensions
    pub fn is_well_formed(&self) -> bool {
        self.expected_len() == Some(self.data.len())
    }

    fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(BYTES_PER_PIXEL)
    }

    /// Copy the pixels into an `image` buffer
    ///
    /// Returns `None` for empty or malformed bitmaps.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if self.is_empty() || !self.is_well_formed() {
            return None;
        }
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }

    /// RGBA value at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height || !self.is_well_formed() {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(idx..idx + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
