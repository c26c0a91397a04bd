//! Object detection pass-through for the vision service.

mod annotate;
mod model;

pub use annotate::{annotate, encode_jpeg};
pub use model::OnnxObjectDetector;

use image::DynamicImage;

use crate::error::Result;

/// One detection, in source-image pixel coordinates.
#[derive(Debug, Clone)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
    pub label: Option<String>,
}

/// The pretrained detector boundary. Box selection and NMS live inside
/// the exported model; implementations only map its output rows back
/// into source coordinates.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}
