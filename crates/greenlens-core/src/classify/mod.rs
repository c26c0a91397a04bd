//! Audio-event classification: model seam, class map and score pooling.

mod aggregate;
mod class_map;
mod model;

pub use aggregate::{rank_classes, RankedClasses, MAX_RESULTS, SENTINEL_LABELS};
pub use class_map::ClassMap;
pub use model::OnnxEventClassifier;

use ndarray::Array2;
use tracing::debug;

use crate::audio::{self};
use crate::error::{Error, Result};

/// The pretrained audio-event model boundary.
///
/// Implementations take the normalized mono 16 kHz waveform and return
/// the per-frame class-score matrix (frames x classes).
pub trait EventClassifier: Send + Sync {
    fn scores(&self, waveform: &[f32]) -> Result<Array2<f32>>;
}

/// Outcome of analyzing one uploaded clip.
#[derive(Debug, Clone)]
pub struct AudioAnalysis {
    /// Ranked (label, percentage) pairs, at most ten, sentinels removed.
    pub results: RankedClasses,
    /// Loudness of the original clip, one decimal place.
    pub decibel: f32,
}

/// Everything the audio service needs per request, behind one injected
/// object so the model is constructed explicitly at startup rather
/// than hiding in global state.
pub struct AudioAnalyzer {
    classifier: Box<dyn EventClassifier>,
    class_map: ClassMap,
}

impl AudioAnalyzer {
    pub fn new(classifier: Box<dyn EventClassifier>, class_map: ClassMap) -> Self {
        Self {
            classifier,
            class_map,
        }
    }

    /// Full pipeline for one uploaded WAV clip. CPU-bound; callers
    /// should run it on a blocking thread.
    pub fn analyze(&self, wav_bytes: &[u8]) -> Result<AudioAnalysis> {
        let waveform = audio::decode_wav(wav_bytes)?;
        debug!(
            frames = waveform.frames(),
            channels = waveform.channels,
            sample_rate = waveform.sample_rate,
            "decoded clip ({:.2}s)",
            waveform.duration_secs()
        );

        // Loudness reflects the source signal, not the model input.
        let decibel = audio::decibel_level(&waveform.samples);

        let mono = audio::normalize(&waveform)?;
        let scores = self.classifier.scores(&mono)?;

        if scores.ncols() != self.class_map.len() {
            return Err(Error::Inference(format!(
                "model emitted {} classes but the class map has {}",
                scores.ncols(),
                self.class_map.len()
            )));
        }

        let results = rank_classes(&scores, self.class_map.names());
        debug!(classes = results.len(), decibel, "clip analyzed");

        Ok(AudioAnalysis { results, decibel })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FixedScores(Array2<f32>);

    impl EventClassifier for FixedScores {
        fn scores(&self, _waveform: &[f32]) -> Result<Array2<f32>> {
            Ok(self.0.clone())
        }
    }

    fn test_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn analyzer_with(scores: Array2<f32>, names: &[&str]) -> AudioAnalyzer {
        AudioAnalyzer::new(
            Box::new(FixedScores(scores)),
            ClassMap::from_names(names.iter().map(|s| s.to_string()).collect()),
        )
    }

    #[test]
    fn silent_clip_reports_floor_loudness_and_no_classes() {
        let wav = test_wav(&vec![0i16; 1600], 16_000);
        let scores = Array2::zeros((4, 3));
        let analyzer = analyzer_with(scores, &["Speech", "Dog", "Music"]);

        let analysis = analyzer.analyze(&wav).unwrap();
        assert!(analysis.results.is_empty());
        assert_eq!(analysis.decibel, -90.0);
    }

    #[test]
    fn ranked_results_use_class_map_names() {
        let wav = test_wav(&vec![1000i16; 1600], 16_000);
        let scores =
            Array2::from_shape_vec((2, 3), vec![0.1, 0.6, 0.3, 0.1, 0.6, 0.3]).unwrap();
        let analyzer = analyzer_with(scores, &["Speech", "Dog", "Music"]);

        let analysis = analyzer.analyze(&wav).unwrap();
        assert_eq!(analysis.results[0].0, "Dog");
        assert_eq!(analysis.results.len(), 3);
    }

    #[test]
    fn class_count_mismatch_is_an_inference_error() {
        let wav = test_wav(&vec![1000i16; 1600], 16_000);
        let scores = Array2::zeros((2, 5));
        let analyzer = analyzer_with(scores, &["Speech", "Dog"]);

        let err = analyzer.analyze(&wav).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn corrupt_bytes_propagate_a_decode_error() {
        let analyzer = analyzer_with(Array2::zeros((1, 1)), &["Speech"]);
        let err = analyzer.analyze(b"definitely not a wav").unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
    }
}
