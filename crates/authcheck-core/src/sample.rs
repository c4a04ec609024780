//! Synthetic input images for smoke-testing an installation.

use image::{Rgb, RgbImage};
use rand::Rng;

/// Uniform RGB noise, each channel drawn from `0..255`.
pub fn noise_image<R: Rng>(width: u32, height: u32, rng: &mut R) -> RgbImage {
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.gen_range(0..255), rng.gen_range(0..255), rng.gen_range(0..255)])
    })
}
