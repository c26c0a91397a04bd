//! Waveform normalization for the audio-event model.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::decode::Waveform;
use crate::error::{Error, Result};

/// Sample rate the audio-event model expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Bring a decoded clip into the form the classifier expects:
/// mono f32 at 16 kHz, scaled into roughly [-1, 1].
///
/// Resampling is skipped entirely when the clip is already at the
/// target rate, so a 16 kHz clip passes through untouched apart from
/// the amplitude scaling and channel collapse.
pub fn normalize(waveform: &Waveform) -> Result<Vec<f32>> {
    if waveform.samples.is_empty() {
        return Err(Error::AudioDecode("empty waveform".into()));
    }

    let channels = waveform.channels.max(1);
    let frames = waveform.samples.len() / channels;
    if frames == 0 {
        return Err(Error::AudioDecode("waveform shorter than one frame".into()));
    }

    let target_frames = if waveform.sample_rate == TARGET_SAMPLE_RATE {
        frames
    } else {
        let ratio = f64::from(TARGET_SAMPLE_RATE) / f64::from(waveform.sample_rate);
        let desired = (frames as f64 * ratio).round() as usize;
        if desired == 0 {
            return Err(Error::Resample(format!(
                "clip of {frames} frames at {} Hz resamples to nothing",
                waveform.sample_rate
            )));
        }
        desired
    };

    let scale = 1.0 / f32::from(i16::MAX);
    let mut mono = vec![0.0f32; target_frames];

    for channel in 0..channels {
        let deinterleaved: Vec<f32> = waveform
            .samples
            .iter()
            .skip(channel)
            .step_by(channels)
            .copied()
            .collect();

        let resampled = if target_frames == frames {
            deinterleaved
        } else {
            resample(&deinterleaved, target_frames)
        };

        for (acc, sample) in mono.iter_mut().zip(resampled) {
            *acc += sample * scale / channels as f32;
        }
    }

    Ok(mono)
}

/// Band-limited (FFT) resampling to an exact output length.
///
/// Keeps the lowest `min(n, m)` frequency bins of the input spectrum
/// and inverts at the new length, which matches the behavior of
/// Fourier-domain resamplers for uniformly sampled signals.
pub fn resample(samples: &[f32], target_len: usize) -> Vec<f32> {
    let n = samples.len();
    let m = target_len;
    if n == 0 || m == 0 {
        return Vec::new();
    }
    if n == m {
        return samples.to_vec();
    }

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(m);

    let mut spectrum: Vec<Complex<f32>> =
        samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    forward.process(&mut spectrum);

    let keep = n.min(m);
    let nyq = keep / 2 + 1;
    let mut resized = vec![Complex::new(0.0, 0.0); m];

    resized[..nyq].copy_from_slice(&spectrum[..nyq]);
    for k in 1..(keep - nyq + 1) {
        resized[m - k] = spectrum[n - k];
    }

    // The shared Nyquist bin needs special treatment when `keep` is even:
    // fold the mirrored energy in when shrinking, split it when growing.
    if keep % 2 == 0 {
        let half = keep / 2;
        if m < n {
            resized[half] = resized[half] + spectrum[n - half];
        } else {
            resized[half] = resized[half] * 0.5;
            resized[m - half] = resized[half];
        }
    }

    inverse.process(&mut resized);

    let norm = 1.0 / n as f32;
    resized.into_iter().map(|c| c.re * norm).collect()
}
