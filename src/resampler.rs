//! Streaming, variable ratio, multi channel sample rate converter.

use crate::{
    buffer::{interleaved_to_planar, planar_to_interleaved, ScratchBuffers},
    channel::ChannelState,
    kernel::Kernel,
    Error, Parameters,
};

// -------------------------------------------------------------------------------------------------

/// Kernel and per channel states of a resampler: the actual resampling engine.
struct Engine {
    kernel: Kernel,
    channels: Vec<ChannelState>,
    debug_level: u8,
}

impl Engine {
    fn new(kernel: Kernel, channel_count: usize, max_buffer_size: usize, debug_level: u8) -> Self {
        let channels = (0..channel_count)
            .map(|_| {
                let mut channel = ChannelState::new(&kernel);
                if max_buffer_size > 0 {
                    channel.reserve(max_buffer_size);
                }
                channel
            })
            .collect();
        Self {
            kernel,
            channels,
            debug_level,
        }
    }

    fn is_final(&self) -> bool {
        self.channels[0].is_final()
    }

    fn is_drained(&self) -> bool {
        self.channels[0].is_drained()
    }

    fn capacity(&self) -> usize {
        self.channels
            .iter()
            .map(ChannelState::capacity)
            .min()
            .unwrap_or(0)
    }

    fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Grow channel histories, if needed, before running a process call.
    fn reserve(&mut self, incount: usize) {
        let mut grown = false;
        for channel in &mut self.channels {
            grown |= channel.reserve(incount);
        }
        if grown && self.debug_level >= 2 {
            log::debug!(
                "Resampler history buffers grew to {} samples per channel",
                self.capacity()
            );
        }
    }

    /// Process validated planar buffers. Returns the number of written frames.
    fn process<I: AsRef<[f32]>, O: AsMut<[f32]>>(
        &mut self,
        output: &mut [O],
        outspace: usize,
        input: &[I],
        incount: usize,
        ratio: f64,
        is_final: bool,
    ) -> usize {
        self.reserve(incount);

        let kernel = &self.kernel;
        let channels = &mut self.channels;
        let written = Self::assert_no_alloc(|| {
            let mut written = 0;
            for ((channel, input), output) in channels.iter_mut().zip(input).zip(output) {
                let input = &input.as_ref()[..incount];
                let output = &mut output.as_mut()[..outspace];
                let channel_written = channel.process(kernel, input, output, ratio, is_final);
                // all channels advance in lockstep
                debug_assert!(written == 0 || written == channel_written);
                written = channel_written;
            }
            written
        });

        if self.debug_level >= 3 {
            log::debug!(
                "Resampled {incount} to {written} frames with ratio {ratio}{}",
                if is_final { " (final)" } else { "" }
            );
        }
        written
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------

/// A streaming sample rate converter for a fixed number of channels.
///
/// Converts chunks of audio with a ratio (output rate / input rate) which may change from call
/// to call. State is kept across calls, so a sequence of calls behaves like a single continuous
/// filter. Output is band-limited with a windowed sinc kernel, selected by the
/// [`Quality`](crate::Quality) in the resampler's [`Parameters`].
///
/// Output frame `n` is centered at the input position where the stream was when it got
/// produced, so with a ratio of 1 the output approximates the input without latency. Frames
/// which need input that did not arrive yet are held back, until more input is passed, or the
/// stream gets finalized: final calls treat all following input as silence and drain the
/// kernel's tail.
///
/// Calls on a single resampler instance must be serialized by the caller. Distinct instances
/// share no state.
///
/// ### Example
/// ```rust
/// use phonic_resampler::{Parameters, Quality, Resampler};
///
/// let parameters = Parameters::default().with_quality(Quality::Best);
/// let mut resampler = Resampler::new(parameters, 2)?;
///
/// let input = vec![vec![0.0f32; 512]; 2];
/// let mut output = vec![vec![0.0f32; 1024]; 2];
/// let written = resampler.resample(&mut output, 1024, &input, 512, 48000.0 / 44100.0, false)?;
/// assert!(written <= 1024);
/// # Ok::<(), phonic_resampler::Error>(())
/// ```
pub struct Resampler {
    parameters: Parameters,
    channel_count: usize,
    engine: Engine,
    scratch: ScratchBuffers,
}

impl Resampler {
    /// Create a new resampler for the given number of channels.
    ///
    /// Fails when the channel count is 0 or the parameters are invalid.
    pub fn new(parameters: Parameters, channel_count: usize) -> Result<Self, Error> {
        if channel_count == 0 {
            return Err(Error::InvalidChannelCount(channel_count));
        }
        let parameters = parameters.validated()?;
        let kernel = Kernel::new(parameters.quality);
        if parameters.debug_level >= 1 {
            log::info!(
                "Creating {} quality resampler for {channel_count} channel(s): {} taps, {}",
                parameters.quality,
                kernel.taps(1.0),
                format_args!(
                    "passband up to {:.0} Hz at {} Hz",
                    kernel.cutoff() * parameters.initial_sample_rate / 2.0,
                    parameters.initial_sample_rate
                )
            );
            log::debug!(
                "Resampler kernel: {:?}, cutoff {:.4}",
                kernel.spec(),
                kernel.cutoff()
            );
        }
        let max_buffer_size = parameters.max_buffer_size;
        let engine = Engine::new(
            kernel,
            channel_count,
            max_buffer_size,
            parameters.debug_level,
        );
        let scratch = ScratchBuffers::new(channel_count, max_buffer_size, max_buffer_size);
        Ok(Self {
            parameters,
            channel_count,
            engine,
            scratch,
        })
    }

    /// The parameters the resampler got created with.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Number of channels the resampler processes.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Suggested output space in frames for the given input frames and ratio.
    pub fn output_frames_hint(incount: usize, ratio: f64) -> usize {
        (incount as f64 * ratio).ceil() as usize
    }

    /// True when the stream got finalized and its filter tail was fully written.
    pub fn is_drained(&self) -> bool {
        self.engine.is_drained()
    }

    /// Resample the given planar buffers: `input` holds `incount` frames for each channel and
    /// `output` room for `outspace` frames per channel. Pass `is_final` when no more input
    /// will follow, to drain the filter's tail.
    ///
    /// Returns the number of frames written to each output channel. This may be less than
    /// `incount * ratio` even when there's enough space, especially at the start of a stream,
    /// and never is more than `outspace`.
    pub fn resample<I: AsRef<[f32]>, O: AsMut<[f32]>>(
        &mut self,
        output: &mut [O],
        outspace: usize,
        input: &[I],
        incount: usize,
        ratio: f64,
        is_final: bool,
    ) -> Result<usize, Error> {
        self.validate_call(incount, ratio)?;
        self.validate_channel_count(input.len())?;
        self.validate_channel_count(output.len())?;
        for channel in input {
            Self::validate_buffer_len("input", incount, channel.as_ref().len())?;
        }
        for channel in output.iter_mut() {
            Self::validate_buffer_len("output", outspace, channel.as_mut().len())?;
        }
        Ok(self
            .engine
            .process(output, outspace, input, incount, ratio, is_final))
    }

    /// Resample the given interleaved buffers: `input` holds `incount` frames, that's
    /// `incount * channel_count` samples, and `output` room for `outspace` frames.
    ///
    /// Shares its state with [`Self::resample`], so both may be mixed in a single stream.
    /// Returns the number of frames written to the output buffer.
    pub fn resample_interleaved(
        &mut self,
        output: &mut [f32],
        outspace: usize,
        input: &[f32],
        incount: usize,
        ratio: f64,
        is_final: bool,
    ) -> Result<usize, Error> {
        self.validate_call(incount, ratio)?;
        let channel_count = self.channel_count;
        let required_input = incount.checked_mul(channel_count).unwrap_or(usize::MAX);
        let required_output = outspace.checked_mul(channel_count).unwrap_or(usize::MAX);
        Self::validate_buffer_len("input", required_input, input.len())?;
        Self::validate_buffer_len("output", required_output, output.len())?;

        if self.scratch.reserve(incount, outspace) && self.parameters.debug_level >= 2 {
            log::debug!(
                "Resampler scratch buffers grew to {} input and {} output frames",
                self.scratch.input_frames(),
                self.scratch.output_frames()
            );
        }
        let (planar_input, planar_output) = self.scratch.split_mut();
        interleaved_to_planar(input, planar_input, incount);
        let written = self.engine.process(
            planar_output,
            outspace,
            planar_input,
            incount,
            ratio,
            is_final,
        );
        planar_to_interleaved(planar_output, output, written);
        Ok(written)
    }

    /// Reset the stream state, making the resampler ready for a new, unrelated stream.
    /// Parameters, channel count and allocated buffers are kept.
    pub fn reset(&mut self) {
        if self.parameters.debug_level >= 2 {
            log::debug!("Resetting resampler");
        }
        self.engine.reset();
    }

    fn validate_call(&self, incount: usize, ratio: f64) -> Result<(), Error> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(Error::InvalidRatio(ratio));
        }
        if incount > 0 && self.engine.is_final() {
            return Err(Error::InputAfterFinal);
        }
        Ok(())
    }

    fn validate_channel_count(&self, actual: usize) -> Result<(), Error> {
        if actual != self.channel_count {
            return Err(Error::ChannelCountMismatch {
                expected: self.channel_count,
                actual,
            });
        }
        Ok(())
    }

    fn validate_buffer_len(
        buffer: &'static str,
        required: usize,
        actual: usize,
    ) -> Result<(), Error> {
        if actual < required {
            return Err(Error::BufferTooSmall {
                buffer,
                required,
                actual,
            });
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
