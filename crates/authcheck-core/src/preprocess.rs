//! Image preprocessing - turns a product photo into the model's input tensor.
//!
//! Every image → fixed tensor of shape (1, 224, 224, 3), NHWC, f32:
//! - Decode the file (format sniffed from content, not extension)
//! - Convert to 8-bit RGB (drops alpha, expands grayscale/palette)
//! - Resize to exactly 224x224 with Lanczos3 (aspect ratio is not preserved)
//! - Scale every channel value by 1/255 into [0, 1]
//! - Prepend a batch dimension of 1

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageReader};
use ndarray::Array4;

use crate::error::{AnalysisError, Result};

pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

/// Shape of the tensor fed to the model.
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, CHANNELS];

/// Decode an image file, sniffing the format from its leading bytes.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let decoded = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .and_then(|reader| reader.decode());

    decoded.map_err(|source| AnalysisError::Preprocess {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert an already-decoded image into the normalized input tensor.
pub fn image_to_tensor(image: &DynamicImage) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = if rgb.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
        rgb
    } else {
        imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Lanczos3)
    };

    let side = INPUT_SIZE as usize;
    Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| {
        f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0
    })
}

/// Decode and convert in one step.
pub fn preprocess_image(path: &Path) -> Result<Array4<f32>> {
    let image = load_image(path)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "decoded input image"
    );
    Ok(image_to_tensor(&image))
}
