//! Dominant frequency estimation via autocorrelation peak-picking
//!
//! A recording is analyzed offline, one fixed-duration segment at a time:
//! 1. Compute the linear autocorrelation of the segment
//! 2. Find the peak lag (lag 0 is excluded - it always carries the total
//!    signal energy and says nothing about periodicity)
//! 3. Convert the peak lag to a frequency in Hz
//!
//! Segments without a usable peak (silence, no positive correlation,
//! non-finite result) contribute no estimate; later segments still run.

use thiserror::Error;
use tracing::trace;

/// Reference segment length used by the surrounding application.
pub const DEFAULT_SEGMENT_DURATION_SECS: f32 = 1.0;

/// Errors raised when constructing an analyzer with nonsensical parameters.
///
/// These are programmer errors, not data artifacts, so they fail fast at
/// construction. `analyze` itself never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),
    #[error("segment duration must be positive and finite, got {0}")]
    InvalidSegmentDuration(f32),
}

/// Per-segment dominant frequency estimator.
///
/// Stateless between calls: `analyze` is a pure function of its input, so
/// one analyzer can be shared freely across threads for different buffers.
#[derive(Debug)]
pub struct FrequencyAnalyzer {
    sample_rate: u32,
    segment_samples: usize,
}

impl FrequencyAnalyzer {
    /// Create an analyzer for the given capture rate and segment duration.
    ///
    /// Fails if the sample rate is zero, the duration is non-positive or
    /// non-finite, or the two combine to an empty segment.
    pub fn new(sample_rate: u32, segment_duration_secs: f32) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        if !segment_duration_secs.is_finite() || segment_duration_secs <= 0.0 {
            return Err(AnalysisError::InvalidSegmentDuration(segment_duration_secs));
        }

        let segment_samples = (sample_rate as f64 * segment_duration_secs as f64) as usize;
        if segment_samples == 0 {
            return Err(AnalysisError::InvalidSegmentDuration(segment_duration_secs));
        }

        Ok(Self {
            sample_rate,
            segment_samples,
        })
    }

    /// Sample rate this analyzer was built for, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples per analysis segment.
    pub fn segment_samples(&self) -> usize {
        self.segment_samples
    }

    /// Estimate the dominant frequency of each complete segment.
    ///
    /// Segments are consumed left to right without overlap; a trailing
    /// partial segment is discarded. Segments that fail the peak or
    /// finiteness guards are skipped, so the result can be shorter than
    /// the segment count. A buffer shorter than one segment yields an
    /// empty vector.
    pub fn analyze(&self, samples: &[f32]) -> Vec<f32> {
        let mut estimates = Vec::with_capacity(samples.len() / self.segment_samples);

        for (index, segment) in samples.chunks_exact(self.segment_samples).enumerate() {
            match self.analyze_segment(segment) {
                Some(frequency) => estimates.push(frequency),
                None => trace!(segment = index, "no dominant frequency, segment skipped"),
            }
        }

        estimates
    }

    /// Estimate the dominant frequency of a single segment.
    fn analyze_segment(&self, segment: &[f32]) -> Option<f32> {
        let autocorr = autocorrelation(segment);

        // Peak over lags >= 1; ties resolve to the earliest lag. Only a
        // strictly positive correlation counts as a peak, so silence and
        // uncorrelated noise leave peak_lag at 0 and are rejected.
        let mut peak_lag = 0usize;
        let mut peak_value = 0.0f32;
        for (lag, &value) in autocorr.iter().enumerate().skip(1) {
            if value > peak_value {
                peak_value = value;
                peak_lag = lag;
            }
        }

        if peak_lag == 0 || peak_lag >= self.segment_samples {
            return None;
        }

        let frequency = self.sample_rate as f32 / peak_lag as f32;
        frequency.is_finite().then_some(frequency)
    }
}

/// Linear autocorrelation `r[k] = sum(s[n] * s[n - k])` for lags `0..len`.
///
/// Naive O(n^2), acceptable for short offline segments.
fn autocorrelation(segment: &[f32]) -> Vec<f32> {
    let n = segment.len();
    let mut corr = vec![0.0f32; n];

    for (lag, slot) in corr.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for i in lag..n {
            sum += segment[i] * segment[i - lag];
        }
        *slot = sum;
    }

    corr
}
