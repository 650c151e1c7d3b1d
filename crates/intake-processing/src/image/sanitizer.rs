//! Image sanitizer - re-encodes pixels only
//!
//! Decoding to a pixel buffer and encoding again drops EXIF, XMP, ICC profiles,
//! text chunks and anything appended after the image data.

use anyhow::{Context, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::{Cursor, Write};
use std::path::Path;

use crate::fs::replace_with;
use crate::metadata::{color_mode_name, format_name, ImageMetadata};

pub struct ImageSanitizer;

impl ImageSanitizer {
    /// Re-encode the image at `path` in its own format and atomically replace it.
    pub fn sanitize(path: &Path) -> Result<ImageMetadata> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let reader = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .context("Failed to read image header")?;
        let format = reader
            .format()
            .or_else(|| ImageFormat::from_path(path).ok())
            .context("Unrecognized image format")?;
        let decoded = reader.decode().context("Failed to decode image")?;

        let normalized = Self::normalize(decoded, format);
        let (width, height) = normalized.dimensions();

        let mut encoded = Cursor::new(Vec::new());
        normalized
            .write_to(&mut encoded, format)
            .with_context(|| format!("Failed to encode {}", format_name(format)))?;
        let encoded = encoded.into_inner();

        replace_with(path, |file| {
            file.write_all(&encoded)?;
            Ok(())
        })?;

        Ok(ImageMetadata {
            width,
            height,
            format: format_name(format),
            color_mode: color_mode_name(normalized.color()).to_string(),
            size_bytes: Some(encoded.len() as u64),
        })
    }

    /// Convert to 8-bit RGB, or RGBA when the source has alpha and the target
    /// format can carry it.
    pub fn normalize(image: DynamicImage, format: ImageFormat) -> DynamicImage {
        let keep_alpha = image.color().has_alpha() && format != ImageFormat::Jpeg;

        match image {
            DynamicImage::ImageRgb8(_) if !keep_alpha => image,
            DynamicImage::ImageRgba8(_) if keep_alpha => image,
            other if keep_alpha => DynamicImage::ImageRgba8(other.into_rgba8()),
            other => DynamicImage::ImageRgb8(other.into_rgb8()),
        }
    }
}
