//! ONNX-backed object detector.

use std::path::Path;
use std::sync::Mutex;

use image::{imageops, DynamicImage, RgbImage};
use ort::session::Session;
use tracing::{debug, info};

use super::{Detection, ObjectDetector};
use crate::error::{Error, Result};

const SESSION_THREADS: usize = 4;

/// Letterbox fill value, the conventional neutral gray.
const PAD_VALUE: u8 = 114;

/// Pretrained detector behind an ONNX Runtime session.
///
/// Expects an end-to-end export: the model output is already
/// NMS-filtered rows of `x1 y1 x2 y2 confidence class`, in letterboxed
/// input coordinates.
#[derive(Debug)]
pub struct OnnxObjectDetector {
    session: Mutex<Session>,
    input_size: u32,
    confidence_threshold: f32,
    labels: Vec<String>,
}

impl OnnxObjectDetector {
    /// Load the model from disk. Call once at startup, off the async
    /// runtime.
    pub fn load(
        model_path: &Path,
        input_size: u32,
        confidence_threshold: f32,
        labels: Vec<String>,
    ) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelNotAvailable(format!(
                "detection model not found at {}",
                model_path.display()
            )));
        }

        info!("loading detection model from {}", model_path.display());
        let session = Session::builder()
            .map_err(|e| Error::Inference(format!("session builder: {e}")))?
            .with_intra_threads(SESSION_THREADS)
            .map_err(|e| Error::Inference(format!("set threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| Error::ModelNotAvailable(format!("load model: {e}")))?;
        info!("detection model ready");

        Ok(Self {
            session: Mutex::new(session),
            input_size,
            confidence_threshold,
            labels,
        })
    }

    /// Read newline-separated class labels, skipping blank lines.
    pub fn load_labels(path: &Path) -> Result<Vec<String>> {
        let text = std::fs::read_to_string(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl ObjectDetector for OnnxObjectDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let rgb = image.to_rgb8();
        let (letterboxed, scale, pad_x, pad_y) = letterbox(&rgb, self.input_size);

        // HWC u8 -> NCHW f32 in [0, 1].
        let size = self.input_size as usize;
        let mut input = vec![0.0f32; 3 * size * size];
        for (x, y, pixel) in letterboxed.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                input[c * size * size + y * size + x] = f32::from(pixel.0[c]) / 255.0;
            }
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Inference("detector session poisoned".into()))?;

        #[allow(clippy::cast_possible_wrap)]
        let shape = vec![1i64, 3, size as i64, size as i64];
        let tensor = ort::value::Tensor::from_array((shape, input))
            .map_err(|e| Error::Inference(format!("build input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::Inference(format!("detector run: {e}")))?;

        let (out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference(format!("extract detections: {e}")))?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let dims: Vec<usize> = out_shape.iter().map(|&d| d as usize).collect();
        // Accept [n, 6] or a leading batch axis [1, n, 6].
        let (rows, cols) = match dims.as_slice() {
            [n, c] => (*n, *c),
            [1, n, c] => (*n, *c),
            other => {
                return Err(Error::Inference(format!(
                    "unexpected detector output shape {other:?}"
                )))
            }
        };
        if cols < 6 {
            return Err(Error::Inference(format!(
                "detector rows carry {cols} values, expected at least 6"
            )));
        }

        let (width, height) = (rgb.width() as f32, rgb.height() as f32);
        let mut detections = Vec::new();
        for row in 0..rows {
            let row = &data[row * cols..(row + 1) * cols];
            let confidence = row[4];
            if confidence < self.confidence_threshold {
                continue;
            }

            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let class_id = row[5].max(0.0) as usize;
            let unmap_x = |v: f32| ((v - pad_x) / scale).clamp(0.0, width);
            let unmap_y = |v: f32| ((v - pad_y) / scale).clamp(0.0, height);

            detections.push(Detection {
                x1: unmap_x(row[0]),
                y1: unmap_y(row[1]),
                x2: unmap_x(row[2]),
                y2: unmap_y(row[3]),
                confidence,
                class_id,
                label: self.labels.get(class_id).cloned(),
            });
        }

        debug!(kept = detections.len(), total = rows, "detections");
        Ok(detections)
    }
}

/// Resize onto a square gray canvas, preserving aspect ratio.
/// Returns the canvas plus the scale and padding needed to map model
/// coordinates back onto the source image.
fn letterbox(image: &RgbImage, target: u32) -> (RgbImage, f32, f32, f32) {
    let (w, h) = (image.width(), image.height());
    let scale = (target as f32 / w as f32).min(target as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);

    let resized = imageops::resize(image, new_w, new_h, imageops::FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(target, target, image::Rgb([PAD_VALUE; 3]));
    let pad_x = (target - new_w) / 2;
    let pad_y = (target - new_h) / 2;
    imageops::overlay(&mut canvas, &resized, i64::from(pad_x), i64::from(pad_y));

    (canvas, scale, pad_x as f32, pad_y as f32)
}
