//! Loudness estimation and the safety tiers derived from it.

/// Guards `log10` against silent clips.
pub const DB_EPSILON: f64 = 1e-9;

/// Empirical calibration offset mapping typical RMS values of 16-bit
/// PCM into a human-familiar dB range. This is not a calibrated SPL
/// measurement.
pub const DB_OFFSET: f64 = 90.0;

/// Root-mean-square amplitude over all samples.
///
/// Accumulates in f64: squared 16-bit amplitudes overflow f32 precision
/// quickly on long clips.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| {
        let s = f64::from(s);
        s * s
    }).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Decibel-like loudness figure for the original (pre-resample) clip,
/// rounded to one decimal place.
pub fn decibel_level(samples: &[f32]) -> f32 {
    let db = 20.0 * (rms(samples) + DB_EPSILON).log10() + DB_OFFSET;
    ((db * 10.0).round() / 10.0) as f32
}

/// Fixed interpretation bands for the reported decibel figure.
///
/// The thresholds are policy constants, not physics; they assume the
/// calibration in [`DB_OFFSET`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyTier {
    Danger,
    Caution,
    Safe,
}

impl SafetyTier {
    /// Tier for a decibel value. Boundaries are exclusive: 85.0 is
    /// still Caution, 70.0 is still Safe.
    pub fn for_decibel(decibel: f32) -> Self {
        if decibel > 85.0 {
            SafetyTier::Danger
        } else if decibel > 70.0 {
            SafetyTier::Caution
        } else {
            SafetyTier::Safe
        }
    }

    /// The advice lines shown to the caller for this tier. The level is
    /// always printed with one decimal, `86.0` rather than `86`.
    pub fn safety_tips(&self, decibel: f32) -> Vec<String> {
        match self {
            SafetyTier::Danger => vec![
                format!("DANGER ({decibel:.1} dB): High noise! Can cause hearing damage."),
                "Recommendation: Use hearing protection.".to_string(),
            ],
            SafetyTier::Caution => vec![
                format!("CAUTION ({decibel:.1} dB): Moderate noise."),
                "Recommendation: Take breaks in quiet areas.".to_string(),
            ],
            SafetyTier::Safe => vec![format!("SAFE ({decibel:.1} dB): Low noise level.")],
        }
    }
}
