//! Frequency-to-pulse band mapping
//!
//! An explicit table of half-open frequency ranges `[lower, upper)`,
//! sorted by lower bound and validated to be non-overlapping at
//! construction. Lookup is a binary search over the lower bounds, with a
//! defined default pulse for frequencies outside every band.

use thiserror::Error;

/// Errors raised when constructing an invalid band table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("band bounds must be finite and positive: [{lower}, {upper})")]
    InvalidBounds { lower: f32, upper: f32 },
    #[error("band upper bound {upper} is not above lower bound {lower}")]
    EmptyBand { lower: f32, upper: f32 },
    #[error("band starting at {lower} overlaps the previous band ending at {previous_upper}")]
    Overlap { lower: f32, previous_upper: f32 },
}

/// An abstract feedback action: one pulse with normalized parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackPulse {
    /// Pulse strength, 0.0 to 1.0
    pub intensity: f32,
    /// Pulse sharpness, 0.0 (soft) to 1.0 (crisp)
    pub sharpness: f32,
}

impl FeedbackPulse {
    pub const fn new(intensity: f32, sharpness: f32) -> Self {
        Self {
            intensity,
            sharpness,
        }
    }
}

/// One frequency range and the pulse it maps to.
///
/// The range is half-open: a frequency matches when
/// `lower_hz <= f < upper_hz`.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lower_hz: f32,
    pub upper_hz: f32,
    pub pulse: FeedbackPulse,
}

impl Band {
    pub const fn new(lower_hz: f32, upper_hz: f32, pulse: FeedbackPulse) -> Self {
        Self {
            lower_hz,
            upper_hz,
            pulse,
        }
    }
}

/// Validated, sorted band table with a default pulse for out-of-range
/// frequencies.
#[derive(Debug)]
pub struct FrequencyMap {
    bands: Vec<Band>,
    default_pulse: FeedbackPulse,
}

impl FrequencyMap {
    /// Build a map from a band list.
    ///
    /// Bands are sorted by lower bound; construction fails on non-finite
    /// or non-positive bounds, empty ranges, or overlapping ranges.
    /// Gaps between bands are allowed and resolve to the default pulse.
    pub fn new(
        mut bands: Vec<Band>,
        default_pulse: FeedbackPulse,
    ) -> Result<Self, MappingError> {
        for band in &bands {
            if !band.lower_hz.is_finite()
                || !band.upper_hz.is_finite()
                || band.lower_hz <= 0.0
                || band.upper_hz <= 0.0
            {
                return Err(MappingError::InvalidBounds {
                    lower: band.lower_hz,
                    upper: band.upper_hz,
                });
            }
            if band.upper_hz <= band.lower_hz {
                return Err(MappingError::EmptyBand {
                    lower: band.lower_hz,
                    upper: band.upper_hz,
                });
            }
        }

        bands.sort_by(|a, b| {
            a.lower_hz
                .partial_cmp(&b.lower_hz)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for pair in bands.windows(2) {
            if pair[1].lower_hz < pair[0].upper_hz {
                return Err(MappingError::Overlap {
                    lower: pair[1].lower_hz,
                    previous_upper: pair[0].upper_hz,
                });
            }
        }

        Ok(Self {
            bands,
            default_pulse,
        })
    }

    /// Octave-spaced default partition for voice recordings.
    ///
    /// Low bands pulse soft and strong, high bands crisp and light;
    /// anything outside 62.5 Hz - 4 kHz gets a faint default pulse.
    pub fn voice_default() -> Self {
        let bands = vec![
            Band::new(62.5, 125.0, FeedbackPulse::new(1.0, 0.2)),
            Band::new(125.0, 250.0, FeedbackPulse::new(0.9, 0.3)),
            Band::new(250.0, 500.0, FeedbackPulse::new(0.8, 0.4)),
            Band::new(500.0, 1000.0, FeedbackPulse::new(0.7, 0.6)),
            Band::new(1000.0, 2000.0, FeedbackPulse::new(0.6, 0.8)),
            Band::new(2000.0, 4000.0, FeedbackPulse::new(0.5, 1.0)),
        ];

        // The hand-picked table above is valid by inspection
        Self::new(bands, FeedbackPulse::new(0.3, 0.5))
            .unwrap_or(Self {
                bands: Vec::new(),
                default_pulse: FeedbackPulse::new(0.3, 0.5),
            })
    }

    /// Resolve a frequency to its pulse.
    ///
    /// Binary search over the sorted lower bounds; frequencies outside
    /// every band (including non-finite values) get the default pulse.
    pub fn resolve(&self, frequency_hz: f32) -> FeedbackPulse {
        if !frequency_hz.is_finite() {
            return self.default_pulse;
        }

        // Index of the first band whose lower bound is above the query;
        // the candidate band is the one just before it.
        let idx = self
            .bands
            .partition_point(|band| band.lower_hz <= frequency_hz);
        if idx == 0 {
            return self.default_pulse;
        }

        let band = &self.bands[idx - 1];
        if frequency_hz < band.upper_hz {
            band.pulse
        } else {
            self.default_pulse
        }
    }

    /// The pulse used for frequencies outside every band.
    pub fn default_pulse(&self) -> FeedbackPulse {
        self.default_pulse
    }

    /// Number of bands in the table.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: FeedbackPulse = FeedbackPulse::new(0.1, 0.1);

    fn two_bands() -> Vec<Band> {
        vec![
            Band::new(100.0, 200.0, FeedbackPulse::new(0.9, 0.2)),
            Band::new(200.0, 400.0, FeedbackPulse::new(0.5, 0.8)),
        ]
    }

    #[test]
    fn test_resolve_inside_bands() {
        let map = FrequencyMap::new(two_bands(), DEFAULT).unwrap();

        assert_eq!(map.resolve(150.0), FeedbackPulse::new(0.9, 0.2));
        assert_eq!(map.resolve(200.0), FeedbackPulse::new(0.5, 0.8));
        assert_eq!(map.resolve(399.9), FeedbackPulse::new(0.5, 0.8));
    }

    #[test]
    fn test_lower_bound_inclusive_upper_exclusive() {
        let map = FrequencyMap::new(two_bands(), DEFAULT).unwrap();

        assert_eq!(map.resolve(100.0), FeedbackPulse::new(0.9, 0.2));
        assert_eq!(map.resolve(400.0), DEFAULT);
    }

    #[test]
    fn test_out_of_range_gets_default() {
        let map = FrequencyMap::new(two_bands(), DEFAULT).unwrap();

        assert_eq!(map.resolve(50.0), DEFAULT);
        assert_eq!(map.resolve(5000.0), DEFAULT);
        assert_eq!(map.resolve(f32::NAN), DEFAULT);
        assert_eq!(map.resolve(f32::INFINITY), DEFAULT);
    }

    #[test]
    fn test_gap_between_bands_gets_default() {
        let bands = vec![
            Band::new(100.0, 200.0, FeedbackPulse::new(0.9, 0.2)),
            Band::new(300.0, 400.0, FeedbackPulse::new(0.5, 0.8)),
        ];
        let map = FrequencyMap::new(bands, DEFAULT).unwrap();

        assert_eq!(map.resolve(250.0), DEFAULT);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let bands = vec![
            Band::new(200.0, 400.0, FeedbackPulse::new(0.5, 0.8)),
            Band::new(100.0, 200.0, FeedbackPulse::new(0.9, 0.2)),
        ];
        let map = FrequencyMap::new(bands, DEFAULT).unwrap();

        assert_eq!(map.resolve(150.0), FeedbackPulse::new(0.9, 0.2));
        assert_eq!(map.resolve(300.0), FeedbackPulse::new(0.5, 0.8));
    }

    #[test]
    fn test_rejects_overlap() {
        let bands = vec![
            Band::new(100.0, 250.0, DEFAULT),
            Band::new(200.0, 400.0, DEFAULT),
        ];
        let err = FrequencyMap::new(bands, DEFAULT).unwrap_err();
        assert!(matches!(err, MappingError::Overlap { .. }));
    }

    #[test]
    fn test_rejects_empty_band() {
        let bands = vec![Band::new(200.0, 200.0, DEFAULT)];
        let err = FrequencyMap::new(bands, DEFAULT).unwrap_err();
        assert!(matches!(err, MappingError::EmptyBand { .. }));
    }

    #[test]
    fn test_rejects_nonsense_bounds() {
        let bands = vec![Band::new(-10.0, 100.0, DEFAULT)];
        assert!(matches!(
            FrequencyMap::new(bands, DEFAULT).unwrap_err(),
            MappingError::InvalidBounds { .. }
        ));

        let bands = vec![Band::new(10.0, f32::INFINITY, DEFAULT)];
        assert!(matches!(
            FrequencyMap::new(bands, DEFAULT).unwrap_err(),
            MappingError::InvalidBounds { .. }
        ));
    }

    #[test]
    fn test_empty_table_always_default() {
        let map = FrequencyMap::new(Vec::new(), DEFAULT).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.resolve(440.0), DEFAULT);
    }

    #[test]
    fn test_voice_default_is_valid() {
        let map = FrequencyMap::voice_default();
        assert_eq!(map.len(), 6);

        // Spot checks across the partition
        assert_eq!(map.resolve(440.0), FeedbackPulse::new(0.8, 0.4));
        assert_eq!(map.resolve(30.0), map.default_pulse());
        assert_eq!(map.resolve(8000.0), map.default_pulse());
    }
}
