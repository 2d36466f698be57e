//! Feedback layer for REMO
//!
//! Maps dominant-frequency estimates through a validated band table and
//! replays them as an ordered, timed pulse sequence. The pulses are
//! abstract (intensity + sharpness); rendering them as haptics, visuals,
//! or text is the caller's concern.

mod mapping;
mod scheduler;

pub use mapping::{Band, FeedbackPulse, FrequencyMap, MappingError};
pub use scheduler::{PulseEvent, PulseScheduler};
