use std::{error, fmt};

// -------------------------------------------------------------------------------------------------

/// Provides an enumeration of all possible errors reported by the resampler.
///
/// Errors either happen while constructing a resampler (invalid configuration) or are
/// precondition violations of a single processing call (caller misuse). Returning fewer
/// frames than requested is a normal outcome of a processing call and never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A resampler needs at least one channel.
    InvalidChannelCount(usize),
    /// The given quality name or raw value does not map to a known quality tier.
    InvalidQuality(String),
    /// The initial sample rate must be finite and positive.
    InvalidSampleRate(f64),
    /// The ratio of a processing call must be finite and positive.
    InvalidRatio(f64),
    /// Number of passed channel buffers does not match the resampler's channel count.
    ChannelCountMismatch { expected: usize, actual: usize },
    /// A passed buffer is smaller than the declared frame count requires.
    BufferTooSmall {
        buffer: &'static str,
        required: usize,
        actual: usize,
    },
    /// New input got passed after the stream was finalized. Call `reset` first.
    InputAfterFinal,
}

impl Error {
    /// Returns true for errors which prevent a resampler from being created.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidChannelCount(_) | Self::InvalidQuality(_) | Self::InvalidSampleRate(_)
        )
    }

    /// Returns true for errors caused by a misuse of a processing call.
    pub fn is_precondition_error(&self) -> bool {
        !self.is_construction_error()
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannelCount(count) => {
                write!(f, "Invalid channel count: {count} (must be > 0)")
            }
            Self::InvalidQuality(quality) => write!(f, "Unknown resampler quality: {quality}"),
            Self::InvalidSampleRate(rate) => {
                write!(f, "Invalid initial sample rate: {rate} (must be > 0)")
            }
            Self::InvalidRatio(ratio) => {
                write!(f, "Invalid resampling ratio: {ratio} (must be finite and > 0)")
            }
            Self::ChannelCountMismatch { expected, actual } => {
                write!(f, "Expected {expected} channel buffers, got {actual}")
            }
            Self::BufferTooSmall {
                buffer,
                required,
                actual,
            } => write!(
                f,
                "The {buffer} buffer is too small: needs {required} samples, has {actual}"
            ),
            Self::InputAfterFinal => {
                write!(f, "Received new input after the final processing call")
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------
