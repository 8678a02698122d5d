#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod buffer;
mod channel;
mod error;
mod kernel;
mod quality;
mod resampler;
mod stream;

// public, flat re-exports
pub use error::Error;
pub use quality::{Parameters, Quality};
pub use resampler::Resampler;
pub use stream::{FixedRatioResampler, RateConversion, StreamConverter};

// -------------------------------------------------------------------------------------------------

#[cfg(all(test, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;
