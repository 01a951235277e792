//! Image builders for height and color maps.

use image::{GrayImage, Luma, RgbaImage};

use super::noise_map::HeightField;
use super::regions::Rgba;

/// Build an RGBA image from a row-major color map.
///
/// Missing trailing samples stay transparent.
pub fn texture_from_color_map(colors: &[Rgba], width: usize, height: usize) -> RgbaImage {
    let mut image = RgbaImage::new(width as u32, height as u32);
    for (pixel, color) in image.pixels_mut().zip(colors) {
        pixel.0 = *color;
    }
    image
}

/// Grayscale preview: 0 is black, 1 is white
pub fn texture_from_height_map(height_field: &HeightField) -> GrayImage {
    let width = height_field.width();
    GrayImage::from_fn(width as u32, height_field.height() as u32, |x, y| {
        let value = height_field.get(x as usize, y as usize).clamp(0.0, 1.0);
        Luma([(value * 255.0).round() as u8])
    })
}
