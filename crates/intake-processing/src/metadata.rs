//! Format metadata read while extracting

use serde::{Deserialize, Serialize};

/// Color modes an image is left in after sanitization.
pub const SAFE_COLOR_MODES: [&str; 2] = ["RGB", "RGBA"];

/// Image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Upper-case container name, e.g. `PNG` or `JPEG`
    pub format: String,
    pub color_mode: String,
    pub size_bytes: Option<u64>,
}

impl ImageMetadata {
    pub fn has_safe_color_mode(&self) -> bool {
        SAFE_COLOR_MODES.contains(&self.color_mode.as_str())
    }
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub page_count: usize,
    pub format: String,
    pub size_bytes: Option<u64>,
}

#[cfg(feature = "image")]
pub(crate) fn color_mode_name(color: image::ColorType) -> &'static str {
    use image::ColorType;

    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "L;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}

#[cfg(feature = "image")]
pub(crate) fn format_name(format: image::ImageFormat) -> String {
    format!("{:?}", format).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_color_modes() {
        let mut metadata = ImageMetadata {
            width: 10,
            height: 10,
            format: "PNG".to_string(),
            color_mode: "RGBA".to_string(),
            size_bytes: None,
        };
        assert!(metadata.has_safe_color_mode());

        metadata.color_mode = "L;16".to_string();
        assert!(!metadata.has_safe_color_mode());
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_format_and_mode_names() {
        assert_eq!(format_name(image::ImageFormat::Jpeg), "JPEG");
        assert_eq!(format_name(image::ImageFormat::Png), "PNG");
        assert_eq!(color_mode_name(image::ColorType::Rgb8), "RGB");
        assert_eq!(color_mode_name(image::ColorType::La8), "LA");
    }
}
