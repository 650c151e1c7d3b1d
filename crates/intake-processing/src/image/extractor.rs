//! Image extractor - metadata plus optional OCR text

use anyhow::{Context, Result};
use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use crate::metadata::{color_mode_name, format_name, ImageMetadata};

pub struct ImageExtractor;

impl ImageExtractor {
    pub fn describe(data: &[u8]) -> Result<ImageMetadata> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .context("Failed to read image header")?;
        let format = reader.format().context("Unrecognized image format")?;
        let img = reader.decode().context("Failed to decode image")?;

        let (width, height) = img.dimensions();

        Ok(ImageMetadata {
            width,
            height,
            format: format_name(format),
            color_mode: color_mode_name(img.color()).to_string(),
            size_bytes: Some(data.len() as u64),
        })
    }
}
