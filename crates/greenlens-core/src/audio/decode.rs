//! WAV decoding that preserves the source amplitude scale.

use std::io::Cursor;

use crate::error::{Error, Result};

/// A decoded clip before any model-specific normalization.
///
/// `samples` are interleaved and kept at 16-bit integer amplitude
/// (floats and other bit depths are rescaled into that range) so the
/// loudness estimate sees source energy, not model input.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl Waveform {
    /// Number of sample frames (per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode WAV bytes into an interleaved [`Waveform`].
pub fn decode_wav(wav_bytes: &[u8]) -> Result<Waveform> {
    let cursor = Cursor::new(wav_bytes);
    let mut reader = hound::WavReader::new(cursor)
        .map_err(|e| Error::AudioDecode(format!("failed to parse WAV: {e}")))?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels.max(1) as usize;

    let samples = match spec.sample_format {
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample.max(1) as u32;
            // Bring wider/narrower PCM into the i16 range so the fixed
            // loudness calibration holds across bit depths.
            let scale = if bits > 1 {
                f32::from(i16::MAX) / (((1i64 << (bits - 1)) - 1) as f32)
            } else {
                f32::from(i16::MAX)
            };
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| {
                s.map(|s| {
                    let s = if s.is_finite() { s } else { 0.0 };
                    s * f32::from(i16::MAX)
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>(),
    };
    // A sample error mid-stream means the data chunk ended early or is
    // corrupt; partial audio must not decode as a shorter clip.
    let samples =
        samples.map_err(|e| Error::AudioDecode(format!("bad sample data: {e}")))?;

    if samples.is_empty() {
        return Err(Error::AudioDecode("no audio samples decoded".into()));
    }
    if sample_rate == 0 {
        return Err(Error::AudioDecode("WAV reports a zero sample rate".into()));
    }

    Ok(Waveform {
        samples,
        channels,
        sample_rate,
    })
}
