//! Capture a transform from a reference/altered pair of recordings.

use super::common::{mean_gain_db, slugify, spinner, strongest_changes};
use anyhow::Context;
use clap::Args;
use sonoprint_analysis::{MagnitudeAveraging, PhaseWeighting, TransformExtractor};
use sonoprint_config::{TransformFile, ensure_user_transforms_dir, paths::transform_file_name};
use sonoprint_core::{TransformCategory, TransformMetadata};
use sonoprint_io::read_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct CaptureArgs {
    /// Unprocessed reference recording (WAV)
    #[arg(value_name = "REFERENCE")]
    reference: PathBuf,

    /// The same material after processing (WAV)
    #[arg(value_name = "ALTERED")]
    altered: PathBuf,

    /// Write the transform to this TOML file
    #[arg(short, long, value_name = "OUT.toml")]
    output: Option<PathBuf>,

    /// Analysis frame size (power of two, >= 64)
    #[arg(long, default_value = "2048")]
    frame_size: usize,

    /// Hop between frames (defaults to frame size / 4)
    #[arg(long)]
    hop_size: Option<usize>,

    /// Transform name
    #[arg(short, long)]
    name: Option<String>,

    /// Transform description
    #[arg(short, long, default_value = "")]
    description: String,

    /// Transform author
    #[arg(long, default_value = "")]
    author: String,

    /// Category tag (generic, equalization, filter, dynamics, distortion,
    /// spatial, modulation, restoration, experimental)
    #[arg(long, default_value = "generic")]
    category: TransformCategory,

    /// Average magnitude ratios geometrically instead of arithmetically
    #[arg(long)]
    geometric: bool,

    /// Weight phase averaging by reference energy
    #[arg(long)]
    energy_weighted: bool,

    /// Also store the transform in the user library under its name
    #[arg(long)]
    save: bool,
}

pub fn run(args: CaptureArgs) -> anyhow::Result<()> {
    if args.output.is_none() && !args.save {
        anyhow::bail!("Nowhere to write the transform. Use --output and/or --save");
    }

    let name = args
        .name
        .clone()
        .or_else(|| {
            args.output
                .as_deref()
                .and_then(sonoprint_config::transform_name_from_path)
        })
        .unwrap_or_default();
    if args.save && slugify(&name).is_empty() {
        anyhow::bail!("--save needs a transform name. Use --name");
    }

    let hop_size = args.hop_size.unwrap_or(args.frame_size / 4);
    let extractor = TransformExtractor::new(args.frame_size, hop_size)?
        .with_magnitude_averaging(if args.geometric {
            MagnitudeAveraging::Geometric
        } else {
            MagnitudeAveraging::Arithmetic
        })
        .with_phase_weighting(if args.energy_weighted {
            PhaseWeighting::Energy
        } else {
            PhaseWeighting::Unweighted
        });

    println!("Reading {}...", args.reference.display());
    let (reference, ref_spec) = read_wav(&args.reference)
        .with_context(|| format!("failed to read {}", args.reference.display()))?;
    println!("Reading {}...", args.altered.display());
    let (altered, alt_spec) = read_wav(&args.altered)
        .with_context(|| format!("failed to read {}", args.altered.display()))?;

    if ref_spec.channels > 1 || alt_spec.channels > 1 {
        println!("  Multi-channel input mixed down to mono for capture");
    }
    println!(
        "  {} / {} samples at {} Hz",
        reference.len(),
        altered.len(),
        reference.sample_rate()
    );
    if reference.len() != altered.len() {
        println!("  Lengths differ; only the overlapping portion is analyzed");
    }

    let pb = spinner(format!(
        "Capturing (frame {}, hop {hop_size})",
        args.frame_size
    ));
    let result = extractor.extract(&reference, &altered);
    pb.finish_and_clear();

    let descriptor = result?.with_metadata(
        TransformMetadata::new(name.clone())
            .with_description(args.description)
            .with_author(args.author)
            .with_category(args.category),
    );

    let (boosts, cuts) = strongest_changes(&descriptor, 1);
    println!("\nCaptured {} bins", descriptor.band_count());
    println!("  Mean change: {:+.2} dB", mean_gain_db(&descriptor));
    if let Some(b) = boosts.first() {
        println!("  Strongest boost: {:+.2} dB at {}", b.gain_db, b.location().trim());
    }
    if let Some(c) = cuts.first() {
        println!("  Strongest cut:   {:+.2} dB at {}", c.gain_db, c.location().trim());
    }

    let file = TransformFile::from(&descriptor);

    if let Some(output) = &args.output {
        file.save(output)?;
        println!("\nWrote {}", output.display());
    }

    if args.save {
        let dir = ensure_user_transforms_dir()?;
        let path = dir.join(transform_file_name(&slugify(&name)));
        file.save(&path)?;
        println!("Saved to library as '{}' ({})", slugify(&name), path.display());
    }

    Ok(())
}
