//! Envelope reduction: rectify, halve and decimate a sample batch.
//!
//! The visualization series is a downsampled amplitude envelope.  Each call
//! is independent: decimation restarts at index 0 of every batch.

/// Reduce `batch` for display.
///
/// Every sample becomes `abs(s) / 2.0` (values in `[0.0, 0.5]` for inputs in
/// `[-1.0, 1.0]`), and only indices `0, ratio, 2 * ratio, …` are kept.  A
/// `ratio` of `0` is treated as `1`.
///
/// ```
/// use audio_recorder::audio::reduce;
///
/// let reduced = reduce(&[0.1, -0.2, 0.3, -0.4, 0.5], 3);
/// assert_eq!(reduced.len(), 2);
/// assert!((reduced[0] - 0.05).abs() < 1e-6);
/// assert!((reduced[1] - 0.2).abs() < 1e-6);
/// ```
pub fn reduce(batch: &[f32], ratio: usize) -> Vec<f32> {
    batch
        .iter()
        .step_by(ratio.max(1))
        .map(|s| s.abs() / 2.0)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
