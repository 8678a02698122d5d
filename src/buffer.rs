//! Planar and interleaved buffer helpers and the resampler's scratch buffers.

// -------------------------------------------------------------------------------------------------

/// Copy `frames` frames of the given planar buffers into an interleaved one.
/// The number of planar buffers defines the channel layout of the interleaved buffer.
pub fn planar_to_interleaved<P: AsRef<[f32]>>(
    planar: &[P],
    interleaved: &mut [f32],
    frames: usize,
) {
    let channel_count = planar.len();
    debug_assert!(interleaved.len() >= frames * channel_count);
    match channel_count {
        0 => (),
        1 => {
            interleaved[..frames].copy_from_slice(&planar[0].as_ref()[..frames]);
        }
        2 => {
            let left = &planar[0].as_ref()[..frames];
            let right = &planar[1].as_ref()[..frames];
            for ((frame, l), r) in interleaved.chunks_exact_mut(2).zip(left).zip(right) {
                frame[0] = *l;
                frame[1] = *r;
            }
        }
        _ => {
            for (channel_index, channel_values) in planar.iter().enumerate() {
                for (frame_index, value) in channel_values.as_ref()[..frames].iter().enumerate() {
                    interleaved[frame_index * channel_count + channel_index] = *value;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Copy `frames` frames of the given interleaved buffer into planar ones.
/// The number of planar buffers defines the channel layout of the interleaved buffer.
pub fn interleaved_to_planar<P: AsMut<[f32]>>(
    interleaved: &[f32],
    planar: &mut [P],
    frames: usize,
) {
    let channel_count = planar.len();
    debug_assert!(interleaved.len() >= frames * channel_count);
    match channel_count {
        0 => (),
        1 => {
            planar[0].as_mut()[..frames].copy_from_slice(&interleaved[..frames]);
        }
        2 => {
            let (left, right) = planar.split_at_mut(1);
            let left = &mut left[0].as_mut()[..frames];
            let right = &mut right[0].as_mut()[..frames];
            for ((frame, l), r) in interleaved.chunks_exact(2).zip(left).zip(right) {
                *l = frame[0];
                *r = frame[1];
            }
        }
        _ => {
            for (channel_index, channel_values) in planar.iter_mut().enumerate() {
                for (frame_index, value) in channel_values.as_mut()[..frames].iter_mut().enumerate()
                {
                    *value = interleaved[frame_index * channel_count + channel_index];
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Planar transposition buffers for interleaved processing calls.
///
/// Buffers only grow, so a stream of equally sized calls allocates once only.
#[derive(Debug, Default)]
pub(crate) struct ScratchBuffers {
    input: Vec<Vec<f32>>,
    output: Vec<Vec<f32>>,
}

impl ScratchBuffers {
    /// Create new scratch buffers for the given channel layout with the given initial
    /// frame capacity.
    pub fn new(channel_count: usize, input_frames: usize, output_frames: usize) -> Self {
        Self {
            input: vec![vec![0.0f32; input_frames]; channel_count],
            output: vec![vec![0.0f32; output_frames]; channel_count],
        }
    }

    /// Input frames which fit into the buffers without reallocating.
    pub fn input_frames(&self) -> usize {
        self.input.first().map_or(0, Vec::len)
    }

    /// Output frames which fit into the buffers without reallocating.
    pub fn output_frames(&self) -> usize {
        self.output.first().map_or(0, Vec::len)
    }

    /// Grow the buffers to fit the given frame counts. Returns true when buffers got
    /// reallocated.
    pub fn reserve(&mut self, input_frames: usize, output_frames: usize) -> bool {
        let mut grown = false;
        if input_frames > self.input_frames() {
            for channel in &mut self.input {
                channel.resize(input_frames, 0.0);
            }
            grown = true;
        }
        if output_frames > self.output_frames() {
            for channel in &mut self.output {
                channel.resize(output_frames, 0.0);
            }
            grown = true;
        }
        grown
    }

    /// Mutable access to the planar input and output buffers.
    pub fn split_mut(&mut self) -> (&mut [Vec<f32>], &mut [Vec<f32>]) {
        (&mut self.input, &mut self.output)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_interleaved() {
        // mono
        let planar_mono: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let interleaved_mono = vec![1.0, 2.0, 3.0, 4.0];
        let mut planar_mono_copy = vec![vec![0.0f32; 4]];
        let mut interleaved_mono_copy = vec![0.0; 4];

        planar_to_interleaved(&planar_mono, &mut interleaved_mono_copy, 4);
        interleaved_to_planar(&interleaved_mono, &mut planar_mono_copy, 4);
        assert_eq!(planar_mono, planar_mono_copy);
        assert_eq!(interleaved_mono, interleaved_mono_copy);

        // stereo
        let planar_stereo: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0, 4.0], vec![4.0, 3.0, 2.0, 1.0]];
        let interleaved_stereo = vec![1.0, 4.0, 2.0, 3.0, 3.0, 2.0, 4.0, 1.0];
        let mut planar_stereo_copy = vec![vec![0.0f32; 4]; 2];
        let mut interleaved_stereo_copy = vec![0.0; 8];

        planar_to_interleaved(&planar_stereo, &mut interleaved_stereo_copy, 4);
        interleaved_to_planar(&interleaved_stereo, &mut planar_stereo_copy, 4);
        assert_eq!(planar_stereo, planar_stereo_copy);
        assert_eq!(interleaved_stereo, interleaved_stereo_copy);

        // general
        let planar_general: Vec<Vec<f32>> = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![4.0, 3.0, 2.0, 1.0],
            vec![2.0, 1.0, 4.0, 3.0],
        ];
        let interleaved_general = vec![1.0, 4.0, 2.0, 2.0, 3.0, 1.0, 3.0, 2.0, 4.0, 4.0, 1.0, 3.0];
        let mut planar_general_copy = vec![vec![0.0f32; 4]; 3];
        let mut interleaved_general_copy = vec![0.0; 12];
        planar_to_interleaved(&planar_general, &mut interleaved_general_copy, 4);
        interleaved_to_planar(&interleaved_general, &mut planar_general_copy, 4);
        assert_eq!(planar_general, planar_general_copy);
        assert_eq!(interleaved_general, interleaved_general_copy);
    }

    #[test]
    fn partial_frames() {
        // buffers may be larger than the copied frame range
        let planar: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 9.0], vec![3.0, 4.0, 9.0]];
        let mut interleaved = vec![0.0f32; 6];
        planar_to_interleaved(&planar, &mut interleaved, 2);
        assert_eq!(interleaved, vec![1.0, 3.0, 2.0, 4.0, 0.0, 0.0]);

        let mut planar_copy = vec![vec![0.0f32; 3]; 2];
        interleaved_to_planar(&interleaved, &mut planar_copy, 2);
        assert_eq!(planar_copy, vec![vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]]);
    }

    #[test]
    fn scratch_buffers_grow_only() {
        let mut scratch = ScratchBuffers::new(2, 16, 0);
        assert_eq!(scratch.input_frames(), 16);
        assert_eq!(scratch.output_frames(), 0);

        assert!(scratch.reserve(8, 32));
        assert_eq!(scratch.input_frames(), 16);
        assert_eq!(scratch.output_frames(), 32);
        assert!(!scratch.reserve(16, 32));
        assert!(scratch.reserve(64, 8));
        assert_eq!(scratch.input_frames(), 64);
        assert_eq!(scratch.output_frames(), 32);

        let (input, output) = scratch.split_mut();
        assert_eq!(input.len(), 2);
        assert_eq!(output.len(), 2);
    }
}
