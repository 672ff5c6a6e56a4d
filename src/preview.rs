// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Picsort Contributors

//! Display preview rendering: a fixed-ratio resize and JPEG re-encode

use image::GenericImageView;

use crate::Result;

/// Render uploaded image bytes into preview bytes for the browser.
///
/// Images wider than `max_width` are scaled down to exactly `max_width`
/// with the height truncated from the original aspect ratio; narrower
/// images pass through at their native size. The result is always JPEG so
/// the page can embed it with a single content type.
pub fn render_preview(data: &[u8], max_width: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;

    let (width, height) = img.dimensions();
    let img = if width > max_width {
        let ratio = max_width as f64 / width as f64;
        let new_height = ((height as f64 * ratio) as u32).max(1);
        img.resize_exact(max_width, new_height, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel; flatten before encoding
    let img = image::DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 200, 30, 255]));
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_wide_image_scaled_to_max_width() {
        let data = png_bytes(1200, 300);
        let preview = render_preview(&data, 600).unwrap();

        let img = image::load_from_memory(&preview).unwrap();
        assert_eq!(img.dimensions(), (600, 150));
    }

    #[test]
    fn test_narrow_image_passes_through_unscaled() {
        let data = png_bytes(400, 500);
        let preview = render_preview(&data, 600).unwrap();

        let img = image::load_from_memory(&preview).unwrap();
        assert_eq!(img.dimensions(), (400, 500));
    }

    #[test]
    fn test_height_truncates_from_aspect_ratio() {
        // 1000x333 at max width 600 -> 600 x trunc(199.8) = 600x199
        let data = png_bytes(1000, 333);
        let preview = render_preview(&data, 600).unwrap();

        let img = image::load_from_memory(&preview).unwrap();
        assert_eq!(img.dimensions(), (600, 199));
    }

    #[test]
    fn test_output_is_jpeg() {
        let data = png_bytes(100, 100);
        let preview = render_preview(&data, 600).unwrap();
        assert_eq!(image::guess_format(&preview).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_undecodable_bytes_are_an_error() {
        assert!(render_preview(b"not an image", 600).is_err());
    }
}
