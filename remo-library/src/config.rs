//! Simple configuration persistence for REMO
//!
//! Stores user preferences like the recordings directory and analysis
//! defaults in a plain key=value file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug)]
pub struct Config {
    /// Directory holding the recording store
    pub recordings_dir: Option<PathBuf>,
    /// Default analysis segment duration in seconds
    pub segment_duration_secs: f32,
    /// Default delay between feedback pulses in milliseconds
    pub pulse_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recordings_dir: None,
            segment_duration_secs: 1.0,
            pulse_interval_ms: 300,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("remo")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                match key {
                    "recordings_dir" => {
                        if !value.is_empty() {
                            config.recordings_dir = Some(PathBuf::from(value));
                        }
                    }
                    "segment_duration_secs" => {
                        if let Ok(secs) = value.parse::<f32>() {
                            if secs.is_finite() && secs > 0.0 {
                                config.segment_duration_secs = secs;
                            }
                        }
                    }
                    "pulse_interval_ms" => {
                        if let Ok(ms) = value.parse::<u64>() {
                            config.pulse_interval_ms = ms;
                        }
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# REMO Configuration".to_string());

        if let Some(ref dir) = self.recordings_dir {
            lines.push(format!("recordings_dir={}", dir.display()));
        }
        lines.push(format!(
            "segment_duration_secs={}",
            self.segment_duration_secs
        ));
        lines.push(format!("pulse_interval_ms={}", self.pulse_interval_ms));

        lines.join("\n")
    }
}
