//! Recording library for REMO - storage, decoding, cache, and config

mod cache;
mod config;
mod loader;
mod store;

pub use cache::{AnalysisCache, CacheError, CachedEstimates};
pub use config::Config;
pub use loader::{DecodedRecording, LoadError, RecordingLoader};
pub use store::{Recording, RecordingStore, StoreError, AUDIO_EXTENSIONS};
