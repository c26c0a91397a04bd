//! GreenLens Core - shared inference and post-processing
//!
//! This crate backs the two GreenLens microservices:
//!
//! - the audio service decodes uploaded WAV clips, normalizes them for a
//!   pretrained audio-event model, pools per-frame scores into a ranked
//!   class breakdown and estimates loudness in a decibel-like scale;
//! - the vision service runs an object-detection model over uploaded
//!   images and draws the detections back into the picture.
//!
//! Both models are external collaborators loaded once at startup through
//! ONNX Runtime. Everything here is synchronous; the services wrap the
//! expensive calls in `spawn_blocking`.

pub mod audio;
pub mod chart;
pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod storage;

pub use audio::{decibel_level, decode_wav, normalize, SafetyTier, Waveform, TARGET_SAMPLE_RATE};
pub use chart::render_pie_chart;
pub use classify::{
    rank_classes, AudioAnalysis, AudioAnalyzer, ClassMap, EventClassifier, OnnxEventClassifier,
    RankedClasses,
};
pub use config::{AudioServiceConfig, ServerConfig, VisionServiceConfig};
pub use detect::{annotate, encode_jpeg, Detection, ObjectDetector, OnnxObjectDetector};
pub use error::{Error, Result};
