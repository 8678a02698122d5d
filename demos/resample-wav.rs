//! An example showcasing how to convert the sample rate of a WAV file in chunks, the way a
//! real-time audio stream would get converted.

use std::{error::Error, path::PathBuf, time::Instant};

use arg::{parse_args, Args};

use phonic_resampler::{Parameters, Quality, Resampler};

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

const DEFAULT_CHUNK_SIZE: usize = 1024;

// -------------------------------------------------------------------------------------------------

/// Arguments for the resample-wav example.
#[derive(Args, Debug)]
struct Arguments {
    #[arg(short = "i", long = "input")]
    /// Path of the WAV file to convert
    input_path: Option<PathBuf>,
    #[arg(short = "o", long = "output")]
    /// Path of the converted 32-bit float WAV file
    output_path: Option<PathBuf>,
    #[arg(short = "r", long = "rate")]
    /// Target sample rate (default: 48000)
    rate: Option<u32>,
    #[arg(short = "q", long = "quality")]
    /// Resampler quality: \"Best\", \"FastestTolerable\" or \"Fastest\" (default: Best)
    quality: Option<String>,
    #[arg(short = "c", long = "chunk-size")]
    /// Number of frames to process at once (default: 1024)
    chunk_size: Option<usize>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    log_level: Option<log::Level>,
}

// -------------------------------------------------------------------------------------------------

/// Read all samples of the given WAV file as normalized interleaved f32 values.
fn read_samples(
    reader: &mut hound::WavReader<std::io::BufReader<std::fs::File>>,
) -> Result<Vec<f32>, hound::Error> {
    let spec = reader.spec();
    match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 * scale))
                .collect()
        }
    }
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args::<Arguments>();

    simple_logger::SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        .init()?;

    let (Some(input_path), Some(output_path)) = (&args.input_path, &args.output_path) else {
        return Err("Missing input or output path. Run with --help for details.".into());
    };
    let quality = match &args.quality {
        Some(name) => Quality::from_name(name)?,
        None => Quality::Best,
    };
    let chunk_size = args.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1);

    let mut reader = hound::WavReader::open(input_path)?;
    let input_spec = reader.spec();
    let channel_count = input_spec.channels as usize;
    let input = read_samples(&mut reader)?;

    let target_rate = args.rate.unwrap_or(48000);
    let ratio = target_rate as f64 / input_spec.sample_rate as f64;
    log::info!(
        "Converting '{}' from {} Hz to {} Hz ({} channels)",
        input_path.display(),
        input_spec.sample_rate,
        target_rate,
        channel_count
    );

    let parameters = Parameters::default()
        .with_quality(quality)
        .with_initial_sample_rate(input_spec.sample_rate as f64)
        .with_max_buffer_size(chunk_size)
        .with_debug_level(2);
    let mut resampler = Resampler::new(parameters, channel_count)?;

    let output_spec = hound::WavSpec {
        channels: input_spec.channels,
        sample_rate: target_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output_path, output_spec)?;

    let outspace = Resampler::output_frames_hint(chunk_size, ratio) + 1;
    let mut output = vec![0.0f32; outspace * channel_count];
    let mut written_frames = 0;
    let start_time = Instant::now();

    let mut write_output = |output: &[f32], frames: usize| -> Result<(), hound::Error> {
        for sample in &output[..frames * channel_count] {
            writer.write_sample(*sample)?;
        }
        written_frames += frames;
        Ok(())
    };

    for chunk in input.chunks(chunk_size * channel_count) {
        let incount = chunk.len() / channel_count;
        let written =
            resampler.resample_interleaved(&mut output, outspace, chunk, incount, ratio, false)?;
        write_output(&output, written)?;
    }
    while !resampler.is_drained() {
        let written =
            resampler.resample_interleaved(&mut output, outspace, &[], 0, ratio, true)?;
        write_output(&output, written)?;
    }
    writer.finalize()?;

    log::info!(
        "Wrote {} frames to '{}' in {:.2} ms",
        written_frames,
        output_path.display(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
