//! Configuration types for the GreenLens services.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioServiceConfig {
    /// Path to the audio-event model (ONNX).
    #[serde(default = "default_audio_model_path")]
    pub model_path: PathBuf,

    /// Path to the class-map CSV shipped with the model.
    #[serde(default = "default_class_map_path")]
    pub class_map_path: PathBuf,

    /// Directory where uploaded clips are saved.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory where generated charts are written and served from.
    #[serde(default = "default_chart_dir")]
    pub chart_dir: PathBuf,

    #[serde(default = "ServerConfig::audio_default")]
    pub server: ServerConfig,
}

impl Default for AudioServiceConfig {
    fn default() -> Self {
        Self {
            model_path: default_audio_model_path(),
            class_map_path: default_class_map_path(),
            upload_dir: default_upload_dir(),
            chart_dir: default_chart_dir(),
            server: ServerConfig::audio_default(),
        }
    }
}

/// Vision service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionServiceConfig {
    /// Path to the object-detection model (ONNX, NMS baked in).
    #[serde(default = "default_vision_model_path")]
    pub model_path: PathBuf,

    /// Optional newline-separated class label file next to the model.
    #[serde(default = "default_labels_path")]
    pub labels_path: Option<PathBuf>,

    /// Directory where uploaded images are saved.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Minimum confidence a detection must reach to be drawn.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Square model input edge in pixels.
    #[serde(default = "default_input_size")]
    pub input_size: u32,

    #[serde(default = "ServerConfig::vision_default")]
    pub server: ServerConfig,
}

impl Default for VisionServiceConfig {
    fn default() -> Self {
        Self {
            model_path: default_vision_model_path(),
            labels_path: default_labels_path(),
            upload_dir: default_upload_dir(),
            confidence_threshold: default_confidence_threshold(),
            input_size: default_input_size(),
            server: ServerConfig::vision_default(),
        }
    }
}

/// HTTP listener configuration shared by both services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// Defaults for the audio service, honoring `PORT`.
    pub fn audio_default() -> Self {
        Self::with_default_port(5000)
    }

    /// Defaults for the vision service, honoring `PORT`.
    pub fn vision_default() -> Self {
        Self::with_default_port(5001)
    }

    fn with_default_port(default_port: u16) -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(default_port);
        Self {
            host: default_host(),
            port,
            cors_enabled: default_cors_enabled(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_cors_enabled() -> bool {
    true
}

fn default_confidence_threshold() -> f32 {
    0.4
}

fn default_input_size() -> u32 {
    640
}

fn models_dir() -> PathBuf {
    if let Ok(from_env) = std::env::var("GREENLENS_MODELS_DIR") {
        let trimmed = from_env.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenlens")
        .join("models")
}

fn data_dir() -> PathBuf {
    if let Ok(from_env) = std::env::var("GREENLENS_DATA_DIR") {
        let trimmed = from_env.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenlens")
}

fn default_audio_model_path() -> PathBuf {
    models_dir().join("yamnet.onnx")
}

fn default_class_map_path() -> PathBuf {
    models_dir().join("yamnet_class_map.csv")
}

fn default_vision_model_path() -> PathBuf {
    models_dir().join("waste_detector.onnx")
}

fn default_labels_path() -> Option<PathBuf> {
    let path = models_dir().join("waste_labels.txt");
    path.exists().then_some(path)
}

fn default_upload_dir() -> PathBuf {
    data_dir().join("uploads")
}

fn default_chart_dir() -> PathBuf {
    data_dir().join("static").join("charts")
}
