//! Waveform decoding, normalization and loudness estimation.

mod decode;
mod loudness;
mod normalize;

pub use decode::{decode_wav, Waveform};
pub use loudness::{decibel_level, rms, SafetyTier, DB_EPSILON, DB_OFFSET};
pub use normalize::{normalize, resample, TARGET_SAMPLE_RATE};
