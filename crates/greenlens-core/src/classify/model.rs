//! ONNX-backed audio-event classifier.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::Session;
use tracing::{debug, info};

use super::EventClassifier;
use crate::error::{Error, Result};

/// Intra-op thread count for the classifier session.
const SESSION_THREADS: usize = 4;

/// Pretrained audio-event model behind an ONNX Runtime session.
///
/// The session sits behind a `Mutex` since `Session::run` requires
/// `&mut self`; requests are serialized at the session regardless of
/// how many permits the service hands out.
#[derive(Debug)]
pub struct OnnxEventClassifier {
    session: Mutex<Session>,
}

impl OnnxEventClassifier {
    /// Load the model from disk. CPU-intensive; call once at startup,
    /// off the async runtime.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::ModelNotAvailable(format!(
                "audio model not found at {}",
                model_path.display()
            )));
        }

        info!("loading audio-event model from {}", model_path.display());
        let session = Session::builder()
            .map_err(|e| Error::Inference(format!("session builder: {e}")))?
            .with_intra_threads(SESSION_THREADS)
            .map_err(|e| Error::Inference(format!("set threads: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| Error::ModelNotAvailable(format!("load model: {e}")))?;
        info!("audio-event model ready");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl EventClassifier for OnnxEventClassifier {
    fn scores(&self, waveform: &[f32]) -> Result<Array2<f32>> {
        if waveform.is_empty() {
            return Err(Error::Inference("empty waveform".into()));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Inference("classifier session poisoned".into()))?;

        // The model takes the whole mono waveform as a 1-D tensor and
        // frames it internally.
        #[allow(clippy::cast_possible_wrap)]
        let shape = vec![waveform.len() as i64];
        let input = ort::value::Tensor::from_array((shape, waveform.to_vec()))
            .map_err(|e| Error::Inference(format!("build input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| Error::Inference(format!("classifier run: {e}")))?;

        // First output is the per-frame score matrix; any embedding or
        // spectrogram outputs after it are ignored.
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference(format!("extract scores: {e}")))?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 2 {
            return Err(Error::Inference(format!(
                "expected a 2-D score matrix, got shape {dims:?}"
            )));
        }
        debug!(frames = dims[0], classes = dims[1], "classifier scores");

        Array2::from_shape_vec((dims[0], dims[1]), data.to_vec())
            .map_err(|e| Error::Inference(format!("score matrix layout: {e}")))
    }
}
