//! Image preprocessing
//!
//! Decodes an uploaded image and converts it into the NCHW float tensor the
//! classifier expects.

use image::imageops::FilterType;
use image::DynamicImage;
use tract_onnx::prelude::tract_ndarray::Array4;

use crate::inference::PixelNorm;
use crate::{Result, ScanError};

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode raw image bytes, failing with [`ScanError::ImageDecode`] on
/// unreadable input.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| ScanError::ImageDecode(e.to_string()))
}

/// Resize to `size`x`size` and normalize into a `[1, 3, size, size]`
/// channels-first tensor.
pub fn preprocess_image(img: &DynamicImage, size: u32, norm: PixelNorm) -> Array4<f32> {
    let resized = img.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let size = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let v = pixel[c] as f32 / 255.0;
            let v = match norm {
                PixelNorm::Scale => v,
                PixelNorm::ImageNet => (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c],
            };
            tensor[[0, c, y as usize, x as usize]] = v;
        }
    }
    tensor
}
