//! Audio analysis for REMO
//!
//! Estimates the dominant frequency of each fixed-length segment of a
//! recorded mono PCM buffer using time-domain autocorrelation. Headless:
//! no I/O, no GUI code.

mod frequency;

pub use frequency::{AnalysisError, FrequencyAnalyzer, DEFAULT_SEGMENT_DURATION_SECS};
