//! Apply a captured transform to an audio file.

use super::common::{load_transform, spinner};
use anyhow::Context;
use clap::Args;
use sonoprint_analysis::TransformApplicator;
use sonoprint_analysis::dynamics::{peak, rms};
use sonoprint_core::{AudioBuffer, INTENSITY_RANGE, linear_to_db};
use sonoprint_io::{WavSpec, read_wav_channels, write_wav_channels};
use std::path::PathBuf;

#[derive(Args)]
pub struct ApplyArgs {
    /// Transform file path or library name
    #[arg(value_name = "TRANSFORM")]
    transform: String,

    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Strength of the transform, 0 (bypass) to 2 (exaggerated).
    /// Defaults to the intensity stored in the transform
    #[arg(short, long)]
    intensity: Option<f32>,

    /// Match output loudness to the input
    #[arg(long)]
    adaptive_rms: bool,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ApplyArgs) -> anyhow::Result<()> {
    let mut descriptor = load_transform(&args.transform)?;

    let requested = args.intensity.unwrap_or(descriptor.parameters().intensity);
    let params = descriptor.parameters_mut();
    params.intensity = requested;
    params.intensity = params.clamped_intensity();
    if params.intensity != requested {
        println!(
            "Intensity {requested} clamped to {} (range {}..={})",
            params.intensity,
            INTENSITY_RANGE.start(),
            INTENSITY_RANGE.end()
        );
    }
    params.adaptive_rms_matching |= args.adaptive_rms;

    let name = &descriptor.metadata().name;
    println!(
        "Transform: {} (frame {}, hop {}, intensity {:.2}{})",
        if name.is_empty() { "unnamed" } else { name.as_str() },
        descriptor.frame_size(),
        descriptor.hop_size(),
        descriptor.parameters().intensity,
        if descriptor.parameters().adaptive_rms_matching {
            ", adaptive RMS"
        } else {
            ""
        }
    );

    println!("Reading {}...", args.input.display());
    let (channels, spec) = read_wav_channels(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let frames = channels.first().map_or(0, AudioBuffer::len);
    println!(
        "  {} channel(s), {frames} samples, {} Hz",
        channels.len(),
        spec.sample_rate
    );

    if let Some(captured) = descriptor.sample_rate()
        && captured != spec.sample_rate
    {
        tracing::warn!(
            captured,
            input = spec.sample_rate,
            "transform captured at a different sample rate; bins map to different frequencies"
        );
        println!(
            "  Warning: transform was captured at {captured} Hz, input is {} Hz",
            spec.sample_rate
        );
    }

    let applicator = TransformApplicator::new(&descriptor)?;

    let pb = spinner("Applying transform");
    let processed: Result<Vec<AudioBuffer>, _> =
        channels.iter().map(|c| applicator.process(c)).collect();
    pb.finish_and_clear();
    let processed = processed?;

    let input_all: Vec<f32> = channels.iter().flat_map(|c| c.samples().iter().copied()).collect();
    let output_all: Vec<f32> = processed
        .iter()
        .flat_map(|c| c.samples().iter().copied())
        .collect();

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&input_all)),
        linear_to_db(peak(&input_all))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output_all)),
        linear_to_db(peak(&output_all))
    );
    if args.bit_depth != 32 && peak(&output_all) > 1.0 {
        println!("  Warning: output exceeds full scale and will clip at {}-bit", args.bit_depth);
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav_channels(&args.output, &processed, out_spec)?;
    println!("Done!");

    Ok(())
}
