//! Recording decoding
//!
//! Decodes a stored recording into a fully buffered mono f32 sample
//! vector using Symphonia. Analysis runs offline on the complete buffer,
//! so the whole file is decoded up front; there is no streaming path.

use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while decoding a recording
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no audio track found in file")]
    NoAudioTrack,
    #[error("recording decoded to zero samples")]
    EmptyRecording,
    #[error("decode error: {0}")]
    Decode(String),
}

/// A decoded recording, downmixed to mono.
#[derive(Debug)]
pub struct DecodedRecording {
    /// Mono samples, normalized to -1.0..1.0
    pub samples: Vec<f32>,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration_secs: f64,
}

/// Symphonia-based recording decoder.
///
/// The reference capture format is AAC in an MP4 container at 12 kHz
/// mono, but anything Symphonia can probe decodes the same way.
#[derive(Default)]
pub struct RecordingLoader;

impl RecordingLoader {
    pub fn new() -> Self {
        Self
    }

    /// Decode a recording to mono PCM.
    ///
    /// Multi-channel audio is downmixed by averaging the channels of each
    /// frame. No resampling is applied; the caller analyzes at the
    /// recording's native rate.
    pub fn load(&self, path: &Path) -> Result<DecodedRecording, LoadError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params.sample_rate.unwrap_or(12000);
        let channels = codec_params
            .channels
            .map(|c| c.count())
            .unwrap_or(1)
            .max(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(_) => break,
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);

            // Downmix interleaved frames to mono by channel average
            let interleaved = sample_buf.samples();
            if channels == 1 {
                samples.extend_from_slice(interleaved);
            } else {
                samples.extend(
                    interleaved
                        .chunks_exact(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }
        }

        if samples.is_empty() {
            return Err(LoadError::EmptyRecording);
        }

        let duration_secs = samples.len() as f64 / sample_rate as f64;
        debug!(
            path = %path.display(),
            sample_rate,
            frames = samples.len(),
            "recording decoded"
        );

        Ok(DecodedRecording {
            samples,
            sample_rate,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Write a minimal PCM16 mono WAV file.
    fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let mut f = std::fs::File::create(path).unwrap();

        f.write_all(b"RIFF").unwrap();
        f.write_all(&(36 + data_len).to_le_bytes()).unwrap();
        f.write_all(b"WAVE").unwrap();
        f.write_all(b"fmt ").unwrap();
        f.write_all(&16u32.to_le_bytes()).unwrap();
        f.write_all(&1u16.to_le_bytes()).unwrap(); // PCM
        f.write_all(&1u16.to_le_bytes()).unwrap(); // mono
        f.write_all(&sample_rate.to_le_bytes()).unwrap();
        f.write_all(&(sample_rate * 2).to_le_bytes()).unwrap();
        f.write_all(&2u16.to_le_bytes()).unwrap();
        f.write_all(&16u16.to_le_bytes()).unwrap();
        f.write_all(b"data").unwrap();
        f.write_all(&data_len.to_le_bytes()).unwrap();
        for s in samples {
            f.write_all(&s.to_le_bytes()).unwrap();
        }
    }

    #[test]
    fn test_load_mono_wav() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("memo.wav");
        let pcm: Vec<i16> = (0..1200).map(|i| if i % 2 == 0 { 8000 } else { -8000 }).collect();
        write_wav(&path, 12000, &pcm);

        let decoded = RecordingLoader::new().load(&path).unwrap();
        assert_eq!(decoded.sample_rate, 12000);
        assert_eq!(decoded.samples.len(), 1200);
        assert!((decoded.duration_secs - 0.1).abs() < 1e-9);
        assert!(decoded.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RecordingLoader::new()
            .load(Path::new("/nonexistent/memo.wav"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noise.m4a");
        std::fs::write(&path, b"definitely not an mp4 container").unwrap();

        assert!(RecordingLoader::new().load(&path).is_err());
    }
}
