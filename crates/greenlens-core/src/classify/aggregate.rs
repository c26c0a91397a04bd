//! Temporal pooling and ranking of per-frame class scores.

use ndarray::{Array2, Axis};

/// Ranked (label, percentage) pairs. Serialized as JSON arrays of
/// two-element arrays, matching the service response shape.
pub type RankedClasses = Vec<(String, f32)>;

/// Classifier categories never reported to callers.
pub const SENTINEL_LABELS: [&str; 2] = ["Silence", "Sound effect"];

/// At most this many classes are reported.
pub const MAX_RESULTS: usize = 10;

/// Pool per-frame scores into a ranked percentage breakdown.
///
/// Scores are averaged over frames, sorted descending (stable, so ties
/// keep class-map order), sentinels dropped, capped at [`MAX_RESULTS`]
/// and rescaled so the kept percentages sum to 100. When the kept
/// scores sum to zero or less there is no meaningful signal and the
/// result is empty rather than a fabricated breakdown.
///
/// Callers must ensure `scores.ncols() == class_names.len()`.
pub fn rank_classes(scores: &Array2<f32>, class_names: &[String]) -> RankedClasses {
    let mean_scores = match scores.mean_axis(Axis(0)) {
        Some(means) => means,
        None => return Vec::new(), // zero frames
    };

    let mut ranked: Vec<(usize, f32)> = mean_scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let top: Vec<(&str, f32)> = ranked
        .into_iter()
        .filter_map(|(idx, score)| {
            let name = class_names.get(idx)?.as_str();
            (!SENTINEL_LABELS.contains(&name)).then_some((name, score))
        })
        .take(MAX_RESULTS)
        .collect();

    let total: f32 = top.iter().map(|(_, score)| score).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    top.into_iter()
        .map(|(name, score)| (name.to_string(), score / total * 100.0))
        .collect()
}
