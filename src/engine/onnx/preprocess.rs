//! Image preprocessing for ONNX vision models.
//!
//! Converts a request's pixels into a normalized CHW float buffer of the
//! model's square input size.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use crate::engine::request::{ClassificationRequest, CropAndScale};
use crate::vision::PixelOrientation;

/// Preprocessing parameters for a square-input vision model.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    pub input_size: u32,
    /// Per-channel mean, applied after scaling to `[0, 1]`.
    pub mean: [f32; 3],
    /// Per-channel standard deviation.
    pub std: [f32; 3],
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self {
            input_size: 224,
            mean: [0.0, 0.0, 0.0],
            std: [1.0, 1.0, 1.0],
        }
    }
}

impl ImagePreprocessor {
    pub fn new(input_size: u32) -> Self {
        Self {
            input_size: input_size.max(1),
            ..Default::default()
        }
    }

    /// Tensor shape of [`prepare`](Self::prepare)'s output (NCHW).
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        let s = self.input_size as usize;
        (1, 3, s, s)
    }

    /// Upright, fit and normalize the request's pixels.
    pub fn prepare(&self, request: &ClassificationRequest) -> Vec<f32> {
        self.prepare_pixels(
            request.pixels(),
            request.orientation(),
            request.crop_and_scale(),
        )
    }

    pub fn prepare_pixels(
        &self,
        pixels: &RgbImage,
        orientation: PixelOrientation,
        mode: CropAndScale,
    ) -> Vec<f32> {
        let upright = orientation.normalize(pixels);
        let fitted = fit(&upright, mode, self.input_size);
        self.to_chw(&fitted)
    }

    fn to_chw(&self, image: &RgbImage) -> Vec<f32> {
        let plane = (image.width() * image.height()) as usize;
        let mut data = vec![0.0f32; plane * 3];
        for (i, pixel) in image.pixels().enumerate() {
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                data[c * plane + i] = (value - self.mean[c]) / self.std[c];
            }
        }
        data
    }
}

/// Fit `image` into a `size` x `size` square.
pub fn fit(image: &RgbImage, mode: CropAndScale, size: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbImage::new(size, size);
    }

    match mode {
        CropAndScale::ScaleFill => imageops::resize(image, size, size, FilterType::Triangle),
        CropAndScale::CenterCrop => {
            let scale = size as f32 / w.min(h) as f32;
            let (sw, sh) = scaled(w, h, scale, size);
            let resized = imageops::resize(image, sw, sh, FilterType::Triangle);
            let x = (sw - size) / 2;
            let y = (sh - size) / 2;
            imageops::crop_imm(&resized, x, y, size, size).to_image()
        }
        CropAndScale::ScaleFit => {
            let scale = size as f32 / w.max(h) as f32;
            let sw = ((w as f32 * scale).round() as u32).clamp(1, size);
            let sh = ((h as f32 * scale).round() as u32).clamp(1, size);
            let resized = imageops::resize(image, sw, sh, FilterType::Triangle);
            let mut canvas = RgbImage::from_pixel(size, size, Rgb([0, 0, 0]));
            let x = ((size - sw) / 2) as i64;
            let y = ((size - sh) / 2) as i64;
            imageops::replace(&mut canvas, &resized, x, y);
            canvas
        }
    }
}

/// Scaled dimensions where the short side is exactly `size`.
fn scaled(w: u32, h: u32, scale: f32, size: u32) -> (u32, u32) {
    let sw = ((w as f32 * scale).round() as u32).max(size);
    let sh = ((h as f32 * scale).round() as u32).max(size);
    (sw, sh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::PixelOrientation;
    use std::sync::Arc;

    fn request(img: RgbImage, crop: CropAndScale) -> ClassificationRequest {
        ClassificationRequest::new("test", Arc::new(img), PixelOrientation::Up, crop)
    }

    #[test]
    fn test_every_mode_produces_square_output() {
        let img = RgbImage::from_pixel(64, 32, Rgb([10, 20, 30]));
        for mode in [CropAndScale::CenterCrop, CropAndScale::ScaleFit, CropAndScale::ScaleFill] {
            assert_eq!(fit(&img, mode, 16).dimensions(), (16, 16), "{:?}", mode);
        }
    }

    #[test]
    fn test_scale_fit_pads_with_black() {
        let img = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        let out = fit(&img, CropAndScale::ScaleFit, 20);
        assert_eq!(out.get_pixel(10, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(10, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_prepare_layout_is_chw() {
        let pre = ImagePreprocessor::new(4);
        let img = RgbImage::from_pixel(4, 4, Rgb([255, 0, 51]));
        let data = pre.prepare(&request(img, CropAndScale::ScaleFill));

        assert_eq!(data.len(), 3 * 16);
        assert!(data[..16].iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!(data[16..32].iter().all(|v| v.abs() < 1e-6));
        assert!(data[32..].iter().all(|v| (*v - 0.2).abs() < 1e-6));
    }

    #[test]
    fn test_prepare_applies_mean_and_std() {
        let pre = ImagePreprocessor {
            input_size: 2,
            mean: [0.5, 0.5, 0.5],
            std: [0.5, 0.5, 0.5],
        };
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 255]));
        let data = pre.prepare(&request(img, CropAndScale::CenterCrop));
        assert!((data[0] - 1.0).abs() < 1e-6);
        assert!((data[4] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shape_matches_input_size() {
        assert_eq!(ImagePreprocessor::new(224).shape(), (1, 3, 224, 224));
        assert_eq!(ImagePreprocessor::new(0).shape(), (1, 3, 1, 1));
    }
}
