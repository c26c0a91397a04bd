//! Drawing detections back into the uploaded image.

use std::io::Cursor;

use image::{DynamicImage, Rgb, RgbImage};

use super::Detection;
use crate::error::{Error, Result};

/// Box outline thickness in pixels.
const OUTLINE_PX: u32 = 3;

/// Per-class outline colors, cycled by class id.
const PALETTE: [[u8; 3]; 8] = [
    [230, 60, 60],
    [60, 160, 230],
    [60, 200, 100],
    [240, 180, 40],
    [180, 90, 230],
    [240, 120, 40],
    [80, 210, 200],
    [220, 80, 160],
];

/// Draw class-colored outlines for every detection into a copy of the
/// source image.
pub fn annotate(image: &DynamicImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for detection in detections {
        let color = Rgb(PALETTE[detection.class_id % PALETTE.len()]);
        draw_box(&mut canvas, detection, color);
    }
    canvas
}

/// Encode an annotated image as JPEG bytes.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Jpeg)
        .map_err(|e| Error::ImageDecode(format!("JPEG encode: {e}")))?;
    Ok(bytes.into_inner())
}

fn draw_box(canvas: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let clamp_x = |v: f32| (v.max(0.0) as u32).min(width - 1);
    let clamp_y = |v: f32| (v.max(0.0) as u32).min(height - 1);
    let (x1, y1) = (clamp_x(detection.x1), clamp_y(detection.y1));
    let (x2, y2) = (clamp_x(detection.x2), clamp_y(detection.y2));
    if x2 <= x1 || y2 <= y1 {
        return;
    }

    for t in 0..OUTLINE_PX {
        let (top, bottom) = (y1.saturating_add(t), y2.saturating_sub(t));
        let (left, right) = (x1.saturating_add(t), x2.saturating_sub(t));
        if top >= height || left >= width {
            continue;
        }

        for x in x1..=x2.min(width - 1) {
            canvas.put_pixel(x, top.min(height - 1), color);
            canvas.put_pixel(x, bottom.min(height - 1), color);
        }
        for y in y1..=y2.min(height - 1) {
            canvas.put_pixel(left.min(width - 1), y, color);
            canvas.put_pixel(right.min(width - 1), y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize) -> Detection {
        Detection {
            x1,
            y1,
            x2,
            y2,
            confidence: 0.9,
            class_id,
            label: None,
        }
    }

    #[test]
    fn annotate_draws_the_outline() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([0, 0, 0])));
        let annotated = annotate(&image, &[detection(10.0, 10.0, 50.0, 50.0, 0)]);

        assert_eq!(annotated.get_pixel(30, 10).0, PALETTE[0]);
        assert_eq!(annotated.get_pixel(10, 30).0, PALETTE[0]);
        // Interior untouched.
        assert_eq!(annotated.get_pixel(30, 30).0, [0, 0, 0]);
    }

    #[test]
    fn out_of_frame_boxes_are_clamped_not_panicking() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])));
        let annotated = annotate(&image, &[detection(-10.0, -10.0, 100.0, 100.0, 3)]);
        assert_eq!(annotated.get_pixel(0, 0).0, PALETTE[3]);
    }

    #[test]
    fn degenerate_boxes_are_skipped() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([7, 7, 7])));
        let annotated = annotate(&image, &[detection(20.0, 20.0, 20.0, 20.0, 1)]);
        // Nothing drawn anywhere.
        assert!(annotated.pixels().all(|p| p.0 == [7, 7, 7]));
    }

    #[test]
    fn jpeg_encoding_produces_a_jpeg_header() {
        let image = RgbImage::from_pixel(16, 16, Rgb([128, 64, 32]));
        let bytes = encode_jpeg(&image).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
