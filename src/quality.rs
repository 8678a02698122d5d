//! Resampler quality tiers and construction parameters.

use crate::Error;

// -------------------------------------------------------------------------------------------------

/// The filter quality a [`Resampler`](crate::Resampler) is running with.
///
/// Higher qualities use longer interpolation kernels, which cost more CPU cycles but suppress
/// aliasing and imaging artifacts better.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::VariantNames,
    strum::EnumIter,
)]
#[repr(u8)]
pub enum Quality {
    /// Long, steep kernel with the best stopband suppression. Use for offline or high-fidelity
    /// real-time conversion of a few streams.
    Best = 0,
    /// Balanced kernel. Inaudible artifacts for most material at a moderate cost.
    #[default]
    FastestTolerable = 1,
    /// Short kernel for cheap conversion of many streams at once. Some aliasing may be audible
    /// when downsampling bright material.
    Fastest = 2,
}

impl Quality {
    /// Parse a quality tier from its name, e.g. "Best".
    pub fn from_name(name: &str) -> Result<Self, Error> {
        name.parse().map_err(|_| Error::InvalidQuality(name.to_string()))
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Best),
            1 => Ok(Self::FastestTolerable),
            2 => Ok(Self::Fastest),
            _ => Err(Error::InvalidQuality(value.to_string())),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Construction parameters of a [`Resampler`](crate::Resampler).
///
/// Parameters are applied once when creating a resampler and never change afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Filter quality level.
    pub quality: Quality,
    /// Sample rate of the expected input before resampling. Only used to describe the
    /// filter's bandwidth in debug logs: any positive value works.
    pub initial_sample_rate: f64,
    /// Upper bound of input frames per processing call, used to preallocate internal buffers.
    /// When 0, buffers get allocated on the first call and grow with larger calls.
    pub max_buffer_size: usize,
    /// Verbosity of the resampler's log output, from 0 (silent) to 3 (every call).
    pub debug_level: u8,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            quality: Quality::FastestTolerable,
            initial_sample_rate: 44100.0,
            max_buffer_size: 0,
            debug_level: 0,
        }
    }
}

impl Parameters {
    /// Highest supported debug level.
    pub const MAX_DEBUG_LEVEL: u8 = 3;

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_initial_sample_rate(mut self, sample_rate: f64) -> Self {
        self.initial_sample_rate = sample_rate;
        self
    }

    pub fn with_max_buffer_size(mut self, frames: usize) -> Self {
        self.max_buffer_size = frames;
        self
    }

    pub fn with_debug_level(mut self, level: u8) -> Self {
        self.debug_level = level;
        self
    }

    /// Validate the parameters, clamping values which can be clamped.
    pub(crate) fn validated(mut self) -> Result<Self, Error> {
        if !self.initial_sample_rate.is_finite() || self.initial_sample_rate <= 0.0 {
            return Err(Error::InvalidSampleRate(self.initial_sample_rate));
        }
        if self.debug_level > Self::MAX_DEBUG_LEVEL {
            log::warn!(
                "Resampler debug level {} is out of range, clamping it to {}",
                self.debug_level,
                Self::MAX_DEBUG_LEVEL
            );
            self.debug_level = Self::MAX_DEBUG_LEVEL;
        }
        Ok(self)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{IntoEnumIterator, VariantNames};

    #[test]
    fn parse_quality() {
        assert_eq!(Quality::from_name("Best"), Ok(Quality::Best));
        assert_eq!(
            Quality::from_name("FastestTolerable"),
            Ok(Quality::FastestTolerable)
        );
        assert_eq!(Quality::from_name("Fastest"), Ok(Quality::Fastest));
        assert_eq!(
            Quality::from_name("Ultra"),
            Err(Error::InvalidQuality("Ultra".to_string()))
        );
        for quality in Quality::iter() {
            assert_eq!(Quality::from_name(&quality.to_string()), Ok(quality));
            assert_eq!(Quality::try_from(quality as u8), Ok(quality));
        }
        assert_eq!(Quality::VARIANTS.len(), 3);
        assert!(Quality::try_from(3).is_err_and(|err| err.is_construction_error()));
    }

    #[test]
    fn parameters() {
        let defaults = Parameters::default();
        assert_eq!(defaults.quality, Quality::FastestTolerable);
        assert_eq!(defaults.initial_sample_rate, 44100.0);
        assert_eq!(defaults.max_buffer_size, 0);
        assert_eq!(defaults.debug_level, 0);

        let clamped = defaults.with_debug_level(7).validated().unwrap();
        assert_eq!(clamped.debug_level, Parameters::MAX_DEBUG_LEVEL);

        assert_eq!(
            defaults.with_initial_sample_rate(0.0).validated(),
            Err(Error::InvalidSampleRate(0.0))
        );
        assert!(defaults
            .with_initial_sample_rate(f64::NAN)
            .validated()
            .is_err());
    }
}
