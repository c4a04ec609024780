//! Writes a random-noise RGB image for smoke-testing `authcheck`.
//!
//! Usage:
//!   make-test-image
//!   make-test-image --output noise.png --size 512 --seed 7

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use authcheck_core::sample::noise_image;

#[derive(Parser)]
#[command(name = "make-test-image")]
#[command(about = "Generate a random RGB test image")]
struct Cli {
    /// Output path; the format follows the extension
    #[arg(short, long, default_value = "test_image.jpg")]
    output: PathBuf,

    /// Edge length in pixels
    #[arg(short, long, default_value_t = 224)]
    size: u32,

    /// Seed for a reproducible image
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ensure!(cli.size > 0, "size must be positive");

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let image = noise_image(cli.size, cli.size, &mut rng);
    image
        .save(&cli.output)
        .with_context(|| format!("Failed to save image: {}", cli.output.display()))?;

    println!("Created {}", cli.output.display());
    Ok(())
}
