//! Display the contents of a transform file.

use super::common::{BinChange, load_transform, mean_gain_db, strongest_changes};
use clap::Args;
use serde_json::json;

/// Display transform information.
#[derive(Args)]
pub struct InfoArgs {
    /// Transform file path or library name
    pub transform: String,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Number of strongest boosts and cuts to list
    #[arg(long, default_value = "5")]
    pub top: usize,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let descriptor = load_transform(&args.transform)?;
    let metadata = descriptor.metadata();
    let params = descriptor.parameters();
    let (boosts, cuts) = strongest_changes(&descriptor, args.top);

    if args.json {
        let changes = |list: &[BinChange]| -> Vec<serde_json::Value> {
            list.iter()
                .map(|c| {
                    json!({
                        "bin": c.bin,
                        "frequency_hz": c.frequency_hz,
                        "gain_db": c.gain_db,
                        "phase": c.phase,
                    })
                })
                .collect()
        };
        let report = json!({
            "name": metadata.name,
            "description": metadata.description,
            "author": metadata.author,
            "category": metadata.category.as_str(),
            "frame_size": descriptor.frame_size(),
            "hop_size": descriptor.hop_size(),
            "sample_rate": descriptor.sample_rate(),
            "bands": descriptor.band_count(),
            "intensity": params.intensity,
            "adaptive_rms_matching": params.adaptive_rms_matching,
            "mean_gain_db": mean_gain_db(&descriptor),
            "boosts": changes(&boosts),
            "cuts": changes(&cuts),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    println!("Name:        {}", or_dash(&metadata.name));
    println!("Description: {}", or_dash(&metadata.description));
    println!("Author:      {}", or_dash(&metadata.author));
    println!("Category:    {}", metadata.category);
    println!(
        "Framing:     frame {}, hop {} ({} bins)",
        descriptor.frame_size(),
        descriptor.hop_size(),
        descriptor.band_count()
    );
    match descriptor.sample_rate() {
        Some(sr) => println!("Sample Rate: {sr} Hz"),
        None => println!("Sample Rate: unknown"),
    }
    println!(
        "Intensity:   {:.2}{}",
        params.intensity,
        if params.adaptive_rms_matching {
            " (adaptive RMS)"
        } else {
            ""
        }
    );
    println!("Mean Change: {:+.2} dB", mean_gain_db(&descriptor));

    if !boosts.is_empty() {
        println!("\nStrongest boosts:");
        for c in &boosts {
            println!("  {}  {:+7.2} dB  {:+.3} rad", c.location(), c.gain_db, c.phase);
        }
    }
    if !cuts.is_empty() {
        println!("\nStrongest cuts:");
        for c in &cuts {
            println!("  {}  {:+7.2} dB  {:+.3} rad", c.location(), c.gain_db, c.phase);
        }
    }

    Ok(())
}
