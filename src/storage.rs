// SPDX-License-Identifier: GPL-3.0-only

//! Loading and saving bitmaps as image files

use crate::bitmap::{Bitmap, Orientation};
use crate::constants::{DEFAULT_OUTPUT_EXTENSION, DEFAULT_SAVE_FOLDER};
use crate::errors::StorageError;
use crate::filters::FilterKind;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Decode an image file into a bitmap
///
/// The EXIF orientation is carried on the bitmap rather than applied to the
/// pixels. Scale is always 1.0 for files.
pub fn load_bitmap(path: &Path) -> Result<Bitmap, StorageError> {
    let load_err = |reason: String| StorageError::LoadFailed {
        path: path.to_path_buf(),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_err(e.to_string()))?;

    let mut decoder = reader.into_decoder().map_err(|e| load_err(e.to_string()))?;
    let orientation = match decoder.orientation() {
        Ok(orientation) => Orientation::from(orientation),
        Err(e) => {
            debug!(error = %e, "No orientation metadata, assuming upright");
            Orientation::Up
        }
    };

    let image = DynamicImage::from_decoder(decoder).map_err(|e| load_err(e.to_string()))?;
    let bitmap = Bitmap::from_rgba(image.to_rgba8(), 1.0, orientation);

    debug!(
        path = %path.display(),
        width = bitmap.width,
        height = bitmap.height,
        orientation = ?bitmap.orientation,
        "Loaded bitmap"
    );

    Ok(bitmap)
}

/// Encode a bitmap to `path`, format chosen by extension
///
/// The orientation is applied to the pixels first, so the file displays
/// upright without relying on metadata. JPEG output drops alpha.
pub fn save_bitmap(bitmap: &Bitmap, path: &Path) -> Result<(), StorageError> {
    let save_err = |reason: String| StorageError::SaveFailed {
        path: path.to_path_buf(),
        reason,
    };

    let rgba = bitmap.to_rgba_image().ok_or(StorageError::InvalidBitmap)?;
    let mut image = DynamicImage::ImageRgba8(rgba);
    if bitmap.orientation != Orientation::Up {
        debug!(orientation = ?bitmap.orientation, "Applying orientation before save");
        image.apply_orientation(bitmap.orientation.into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
    }

    let result = match ImageFormat::from_path(path) {
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(image.to_rgb8()).save(path),
        _ => image.save(path),
    };
    result.map_err(|e| save_err(e.to_string()))?;

    info!(path = %path.display(), "Bitmap saved");
    Ok(())
}

/// Default directory for filtered photos (~/Pictures/photo-filter)
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}

/// Timestamped file name for a filtered photo, e.g. `sepia_20250101_120000.png`
pub fn output_file_name(filter: FilterKind) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", filter.as_str(), timestamp, DEFAULT_OUTPUT_EXTENSION)
}
