//! Per channel streaming state of the resampling engine.

use crate::kernel::Kernel;

// -------------------------------------------------------------------------------------------------

/// Streaming state of a single channel.
///
/// Holds the most recent input samples which still can be reached by the kernel, and the
/// fractional read cursor of the next output frame, relative to the first history sample.
/// Samples before the first history sample and, once the stream got finalized, after the last
/// one are treated as silence.
#[derive(Debug)]
pub(crate) struct ChannelState {
    history: Vec<f32>,
    cursor: f64,
    retain: usize,
    is_final: bool,
    is_drained: bool,
}

impl ChannelState {
    /// Create a new channel state. History buffers get allocated with [`Self::reserve`].
    pub fn new(kernel: &Kernel) -> Self {
        Self {
            history: Vec::new(),
            cursor: 0.0,
            retain: kernel.max_reach().ceil() as usize + 1,
            is_final: false,
            is_drained: false,
        }
    }

    /// Reset to the state of a freshly created channel, keeping allocated buffers.
    pub fn reset(&mut self) {
        self.history.clear();
        self.cursor = 0.0;
        self.is_final = false;
        self.is_drained = false;
    }

    /// Read cursor of the next output frame, relative to the first history sample.
    #[cfg(test)]
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Number of buffered input samples.
    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Allocated history capacity in samples.
    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    /// True when the stream got finalized: no more input may be pushed until reset.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// True when the stream got finalized and its filter tail was fully emitted.
    pub fn is_drained(&self) -> bool {
        self.is_drained
    }

    /// Grow the history buffer so that a processing call with the given input frame count
    /// fits without reallocating. Returns true when the buffer got reallocated.
    ///
    /// Growth reserves enough room for a steady stream of `incount` sized calls, so buffers
    /// only grow when the call size grows or output got starved.
    pub fn reserve(&mut self, incount: usize) -> bool {
        let required = self.history.len() + incount;
        if required <= self.history.capacity() {
            return false;
        }
        let steady_state = incount + 3 * self.retain + 8;
        let target = required.max(steady_state);
        self.history.reserve_exact(target - self.history.len());
        true
    }

    /// Append `input` to the history and write as many output frames as can be fully
    /// determined into `output`. Returns the number of written output frames.
    ///
    /// The history must have been reserved for the input via [`Self::reserve`] to avoid
    /// reallocations in the audio thread.
    pub fn process(
        &mut self,
        kernel: &Kernel,
        input: &[f32],
        output: &mut [f32],
        ratio: f64,
        is_final: bool,
    ) -> usize {
        debug_assert!(ratio.is_finite() && ratio > 0.0);
        debug_assert!(input.is_empty() || !self.is_final, "input after final call");
        debug_assert!(self.history.len() + input.len() <= self.history.capacity());

        self.history.extend_from_slice(input);
        self.is_final |= is_final;

        let scale = kernel.scale(ratio);
        let reach = kernel.reach(ratio);
        let step = 1.0 / ratio;
        let available = self.history.len() as f64;

        let mut written = 0;
        if self.is_final {
            // drain: emit until the kernel no longer reaches any real input sample
            let tail_end = available - 1.0 + reach;
            if self.history.is_empty() || self.cursor >= tail_end {
                self.is_drained = true;
            } else {
                for frame in output.iter_mut() {
                    *frame = kernel.evaluate(&self.history, self.cursor, scale);
                    written += 1;
                    self.cursor += step;
                    if self.cursor >= tail_end {
                        self.is_drained = true;
                        break;
                    }
                }
            }
        } else {
            // hold back frames which would need samples we did not receive yet
            for frame in output.iter_mut() {
                if self.cursor + reach >= available {
                    break;
                }
                *frame = kernel.evaluate(&self.history, self.cursor, scale);
                written += 1;
                self.cursor += step;
            }
        }

        self.discard_consumed();
        written
    }

    /// Drop leading history samples which can't be reached by the kernel anymore.
    fn discard_consumed(&mut self) {
        let keep_from = self.cursor.floor() - self.retain as f64;
        if keep_from <= 0.0 {
            return;
        }
        let drop_count = (keep_from as usize).min(self.history.len());
        if drop_count > 0 {
            self.history.copy_within(drop_count.., 0);
            self.history.truncate(self.history.len() - drop_count);
            self.cursor -= drop_count as f64;
        }
    }
}

// -------------------------------------------------------------------------------------------------
