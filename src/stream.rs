//! Interleaved stream conversion between two fixed sample rates.

use crate::{Error, Parameters, Resampler};

// -------------------------------------------------------------------------------------------------

/// Source and target sample rates of a fixed rate conversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RateConversion {
    pub source_rate: u32,
    pub target_rate: u32,
    pub channel_count: usize,
}

impl RateConversion {
    pub fn new(source_rate: u32, target_rate: u32, channel_count: usize) -> Self {
        Self {
            source_rate,
            target_rate,
            channel_count,
        }
    }

    /// Output frames per input frame. Not finite when one of the rates is 0.
    pub fn ratio(&self) -> f64 {
        self.target_rate as f64 / self.source_rate as f64
    }

    /// Output samples needed to hold all frames converted from the given input samples.
    pub fn output_len_hint(&self, input_len: usize) -> usize {
        let frames = input_len / self.channel_count.max(1);
        Resampler::output_frames_hint(frames, self.ratio()) * self.channel_count
    }
}

// -------------------------------------------------------------------------------------------------

/// Converts interleaved sample streams chunk by chunk.
///
/// Every chunk of input is consumed as a whole. Output which doesn't fit into the passed output
/// buffer stays pending and is written by later calls.
pub trait StreamConverter: Send + Sync {
    /// Converts an interleaved input chunk into `output`.
    ///
    /// An empty `input` marks the end of the stream: it writes pending and tail samples, and
    /// should be repeated until [`Self::is_exhausted`] returns true.
    ///
    /// Returns the number of consumed input and written output samples.
    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(usize, usize), Error>;

    /// True once the end of the stream got passed and all of its output got written.
    fn is_exhausted(&self) -> bool;

    /// Forgets the current stream, so a new one can be converted.
    fn reset(&mut self);
}

// -------------------------------------------------------------------------------------------------

/// [`StreamConverter`] which runs a [`Resampler`] with a fixed [`RateConversion`] ratio.
pub struct FixedRatioResampler {
    conversion: RateConversion,
    resampler: Resampler,
}

impl FixedRatioResampler {
    pub fn new(conversion: RateConversion, parameters: Parameters) -> Result<Self, Error> {
        if conversion.source_rate == 0 || conversion.target_rate == 0 {
            return Err(Error::InvalidRatio(conversion.ratio()));
        }
        let parameters = parameters.with_initial_sample_rate(conversion.source_rate as f64);
        let resampler = Resampler::new(parameters, conversion.channel_count)?;
        Ok(Self {
            conversion,
            resampler,
        })
    }

    pub fn conversion(&self) -> &RateConversion {
        &self.conversion
    }
}

impl StreamConverter for FixedRatioResampler {
    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<(usize, usize), Error> {
        let channel_count = self.conversion.channel_count;
        debug_assert!(input.len() % channel_count == 0);
        debug_assert!(output.len() % channel_count == 0);

        let incount = input.len() / channel_count;
        let outspace = output.len() / channel_count;
        let written = self.resampler.resample_interleaved(
            output,
            outspace,
            input,
            incount,
            self.conversion.ratio(),
            incount == 0,
        )?;
        Ok((incount * channel_count, written * channel_count))
    }

    fn is_exhausted(&self) -> bool {
        self.resampler.is_drained()
    }

    fn reset(&mut self) {
        self.resampler.reset();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Quality;

    #[test]
    fn conversion() {
        let conversion = RateConversion::new(44100, 48000, 2);
        assert!((conversion.ratio() - 48000.0 / 44100.0).abs() < 1.0e-12);
        let halving = RateConversion::new(44100, 22050, 2);
        assert_eq!(halving.output_len_hint(441 * 2), 221 * 2);

        let parameters = Parameters::default();
        assert!(FixedRatioResampler::new(RateConversion::new(0, 48000, 2), parameters).is_err());
        assert!(
            FixedRatioResampler::new(RateConversion::new(44100, 48000, 0), parameters)
                .is_err_and(|err| err.is_construction_error())
        );
    }

    #[test]
    fn process_and_flush() {
        let conversion = RateConversion::new(48000, 32000, 2);
        let parameters = Parameters::default().with_quality(Quality::Fastest);
        let mut resampler = FixedRatioResampler::new(conversion, parameters).unwrap();
        assert_eq!(resampler.conversion(), &conversion);

        let input = vec![0.25f32; 480 * 2];
        let mut output = vec![0.0f32; 512 * 2];
        let mut total_written = 0;
        for _ in 0..10 {
            let (consumed, written) = resampler.process(&input, &mut output).unwrap();
            assert_eq!(consumed, input.len());
            assert_eq!(written % 2, 0);
            total_written += written;
        }
        // flush pending outputs
        while !resampler.is_exhausted() {
            let (consumed, written) = resampler.process(&[], &mut output).unwrap();
            assert_eq!(consumed, 0);
            total_written += written;
        }
        let expected = 4800.0 * 2.0 / 3.0 * 2.0;
        assert!(total_written as f64 >= expected);
        assert!((total_written as f64) < expected + 64.0 * 2.0);

        // new input after the flush needs a reset
        assert_eq!(
            resampler.process(&input, &mut output),
            Err(Error::InputAfterFinal)
        );
        resampler.reset();
        assert!(!resampler.is_exhausted());
        assert!(resampler.process(&input, &mut output).is_ok());
    }
}
