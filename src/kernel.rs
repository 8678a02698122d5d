//! Band-limited windowed sinc interpolation kernels.

use std::f64::consts::PI;

use assume::assume;
use rubato::WindowFunction;

use crate::Quality;

// -------------------------------------------------------------------------------------------------

/// Kernel layout of a single quality tier.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KernelSpec {
    /// Zero crossings of the sinc on each side of the kernel's center.
    pub zero_crossings: usize,
    /// Window applied to the sinc.
    pub window: WindowFunction,
    /// Table points per zero crossing.
    pub phases: usize,
}

impl KernelSpec {
    pub fn from_quality(quality: Quality) -> Self {
        match quality {
            Quality::Best => Self {
                zero_crossings: 48,
                window: WindowFunction::BlackmanHarris2,
                phases: 2048,
            },
            Quality::FastestTolerable => Self {
                zero_crossings: 16,
                window: WindowFunction::Blackman2,
                phases: 512,
            },
            Quality::Fastest => Self {
                zero_crossings: 8,
                window: WindowFunction::Hann2,
                phases: 128,
            },
        }
    }

    /// Cutoff frequency relative to Nyquist for this kernel length and window.
    pub fn cutoff(&self) -> f64 {
        let cutoff: f64 = rubato::calculate_cutoff(2 * self.zero_crossings, self.window);
        cutoff.clamp(0.5, 0.99)
    }
}

// -------------------------------------------------------------------------------------------------

/// Evaluates the given window at `x` in range `[-1, 1]`, centered at 0.
fn window_value(window: WindowFunction, x: f64) -> f64 {
    let hann = || 0.5 + 0.5 * (PI * x).cos();
    let blackman = || 0.42 + 0.5 * (PI * x).cos() + 0.08 * (2.0 * PI * x).cos();
    let blackman_harris = || {
        0.35875
            + 0.48829 * (PI * x).cos()
            + 0.14128 * (2.0 * PI * x).cos()
            + 0.01168 * (3.0 * PI * x).cos()
    };
    match window {
        WindowFunction::Hann => hann(),
        WindowFunction::Hann2 => hann().powi(2),
        WindowFunction::Blackman => blackman(),
        WindowFunction::Blackman2 => blackman().powi(2),
        WindowFunction::BlackmanHarris => blackman_harris(),
        WindowFunction::BlackmanHarris2 => blackman_harris().powi(2),
    }
}

/// Normalized sinc: `sin(pi * t) / (pi * t)`.
fn sinc(t: f64) -> f64 {
    if t.abs() < 1.0e-9 {
        1.0
    } else {
        (PI * t).sin() / (PI * t)
    }
}

// -------------------------------------------------------------------------------------------------

/// Windowed sinc interpolation kernel, shared read-only by all channels of a resampler.
///
/// The prototype kernel `k(t) = sinc(t) * window(t / N)` gets sampled into a one-sided lookup
/// table with `phases` points per zero crossing. Values in between table points are linearly
/// interpolated. When downsampling, the kernel gets stretched by `1 / scale` to move its cutoff
/// below the output's Nyquist frequency.
pub(crate) struct Kernel {
    spec: KernelSpec,
    cutoff: f64,
    table: Vec<f32>,
}

impl Kernel {
    /// Smallest ratio the kernel gets stretched for when downsampling.
    pub const MIN_DOWNSAMPLING_RATIO: f64 = 1.0 / 16.0;

    pub fn new(quality: Quality) -> Self {
        let spec = KernelSpec::from_quality(quality);
        let cutoff = spec.cutoff();
        let zero_crossings = spec.zero_crossings as f64;
        let table_len = spec.zero_crossings * spec.phases + 1;
        let mut table = Vec::with_capacity(table_len + 1);
        for index in 0..table_len {
            let t = index as f64 / spec.phases as f64;
            let value = sinc(t) * window_value(spec.window, t / zero_crossings);
            table.push(value as f32);
        }
        // guard point for the interpolation of the very last table point
        table.push(0.0);
        Self {
            spec,
            cutoff,
            table,
        }
    }

    pub fn spec(&self) -> &KernelSpec {
        &self.spec
    }

    /// Cutoff frequency relative to Nyquist.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Kernel scale for the given ratio: the cutoff relative to the input's Nyquist frequency.
    ///
    /// The kernel stops widening below [`Self::MIN_DOWNSAMPLING_RATIO`].
    #[inline]
    pub fn scale(&self, ratio: f64) -> f64 {
        self.cutoff * ratio.clamp(Self::MIN_DOWNSAMPLING_RATIO, 1.0)
    }

    /// Half support of the kernel in input samples for the given ratio.
    #[inline]
    pub fn reach(&self, ratio: f64) -> f64 {
        self.spec.zero_crossings as f64 / self.scale(ratio)
    }

    /// Largest half support of the kernel in input samples, for any ratio.
    pub fn max_reach(&self) -> f64 {
        self.reach(Self::MIN_DOWNSAMPLING_RATIO)
    }

    /// Number of input samples the kernel spans for the given ratio.
    pub fn taps(&self, ratio: f64) -> usize {
        (2.0 * self.reach(ratio)).ceil() as usize
    }

    /// Evaluate the kernel at the fractional position `cursor` in `samples`, using the given
    /// `scale` (see [`Self::scale`]). Samples outside of the slice are treated as silence.
    pub fn evaluate(&self, samples: &[f32], cursor: f64, scale: f64) -> f32 {
        debug_assert!(scale > 0.0 && scale <= 1.0);
        if samples.is_empty() {
            return 0.0;
        }
        let reach = self.spec.zero_crossings as f64 / scale;
        let last = (cursor + reach).floor();
        if last < 0.0 {
            return 0.0;
        }
        let first = (cursor - reach).ceil().max(0.0) as usize;
        let last = (last as usize).min(samples.len() - 1);
        if first > last {
            return 0.0;
        }

        let step = scale * self.spec.phases as f64;
        let max_index = self.table.len() - 2;
        let mut sum = 0.0f32;
        for (offset, sample) in samples[first..=last].iter().enumerate() {
            let distance = ((cursor - (first + offset) as f64) * step).abs();
            let index = (distance as usize).min(max_index);
            let fraction = (distance - index as f64) as f32;
            assume!(unsafe: index + 1 < self.table.len());
            let a = self.table[index];
            let b = self.table[index + 1];
            sum += sample * (a + (b - a) * fraction);
        }
        sum * scale as f32
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn monotone_cost() {
        let best = KernelSpec::from_quality(Quality::Best);
        let tolerable = KernelSpec::from_quality(Quality::FastestTolerable);
        let fastest = KernelSpec::from_quality(Quality::Fastest);
        assert!(best.zero_crossings > tolerable.zero_crossings);
        assert!(tolerable.zero_crossings > fastest.zero_crossings);
        assert!(best.phases > tolerable.phases && tolerable.phases > fastest.phases);
        for spec in [best, tolerable, fastest] {
            let cutoff = spec.cutoff();
            assert!((0.5..=0.99).contains(&cutoff));
        }
    }

    #[test]
    fn table_shape() {
        for quality in Quality::iter() {
            let kernel = Kernel::new(quality);
            let table = &kernel.table;
            assert_eq!(table[0], 1.0);
            // zero crossings of the sinc
            let phases = kernel.spec().phases;
            for crossing in 1..kernel.spec().zero_crossings {
                assert!(table[crossing * phases].abs() < 1.0e-6);
            }
            // window fades out at the edge
            assert!(table[table.len() - 2].abs() < 1.0e-6);
        }
    }

    #[test]
    fn unity_dc_gain() {
        let ones = vec![1.0f32; 4096];
        for quality in Quality::iter() {
            let kernel = Kernel::new(quality);
            let tolerance = if quality == Quality::Best { 1.0e-3 } else { 1.0e-2 };
            for ratio in [1.0, 1.5, 0.5, 0.25] {
                let scale = kernel.scale(ratio);
                for cursor in [2000.0, 2000.25, 2000.5, 2047.9] {
                    let value = kernel.evaluate(&ones, cursor, scale);
                    assert!(
                        (value - 1.0).abs() < tolerance,
                        "{quality} ratio {ratio} at {cursor}: {value}"
                    );
                }
            }
        }
    }

    #[test]
    fn silence_outside_of_samples() {
        let kernel = Kernel::new(Quality::Fastest);
        let scale = kernel.scale(1.0);
        let samples = [1.0f32; 8];
        assert_eq!(kernel.evaluate(&[], 0.0, scale), 0.0);
        assert_eq!(kernel.evaluate(&samples, -kernel.reach(1.0) - 1.0, scale), 0.0);
        assert_eq!(kernel.evaluate(&samples, 8.0 + kernel.reach(1.0), scale), 0.0);
        // half of the kernel covers the samples at the edge
        let edge = kernel.evaluate(&samples, -0.5, scale);
        assert!(edge > 0.0 && edge < 1.0);
    }

    #[test]
    fn reach_grows_when_downsampling() {
        let kernel = Kernel::new(Quality::FastestTolerable);
        assert_eq!(kernel.reach(1.0), kernel.reach(4.0));
        assert!((kernel.reach(0.5) - 2.0 * kernel.reach(1.0)).abs() < 1.0e-9);
        assert!(kernel.taps(0.5) > kernel.taps(1.0));
        assert_eq!(kernel.reach(0.001), kernel.max_reach());
        assert!(kernel.max_reach() > kernel.reach(0.1));
    }
}
