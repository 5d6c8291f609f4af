use crate::error::{DisplayError, Result};
use image::RgbImage;

/// Pixel format conversion for framebuffer output
pub struct DisplayConverter;

impl DisplayConverter {
    /// Convert packed RGB24 to little-endian RGB565
    pub fn rgb24_to_rgb565(rgb24_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        let expected_size = width as usize * height as usize * 3;
        if rgb24_data.len() != expected_size {
            return Err(DisplayError::FormatConversion {
                details: format!(
                    "Invalid RGB24 data size: expected {}, got {}",
                    expected_size,
                    rgb24_data.len()
                ),
            }
            .into());
        }

        let mut rgb565_data = Vec::with_capacity(width as usize * height as usize * 2);

        for chunk in rgb24_data.chunks_exact(3) {
            let r = chunk[0] >> 3;
            let g = chunk[1] >> 2;
            let b = chunk[2] >> 3;

            let rgb565 = ((r as u16) << 11) | ((g as u16) << 5) | (b as u16);
            rgb565_data.extend_from_slice(&rgb565.to_le_bytes());
        }

        Ok(rgb565_data)
    }

    pub fn image_to_rgb565(image: &RgbImage) -> Result<Vec<u8>> {
        Self::rgb24_to_rgb565(image.as_raw(), image.width(), image.height())
    }
}
