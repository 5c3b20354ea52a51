//! Captured image type handed to the classifier.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;

use super::orientation::{ImageOrientation, PixelOrientation};

/// A photo as delivered by the capture layer.
///
/// The pixel buffer is optional because some capture sources only hand over
/// a reference to a GPU surface. Classifying such an image is a caller bug.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pixels: Option<Arc<RgbImage>>,
    orientation: ImageOrientation,
}

impl CapturedImage {
    pub fn new(pixels: RgbImage, orientation: ImageOrientation) -> Self {
        Self {
            pixels: Some(Arc::new(pixels)),
            orientation,
        }
    }

    /// An image with orientation metadata but no backing pixels.
    pub fn without_pixels(orientation: ImageOrientation) -> Self {
        Self {
            pixels: None,
            orientation,
        }
    }

    /// Decode an image file from disk.
    pub fn open(path: &Path, orientation: ImageOrientation) -> Result<Self, image::ImageError> {
        let pixels = image::open(path)?.to_rgb8();
        Ok(Self::new(pixels, orientation))
    }

    pub fn pixels(&self) -> Option<&Arc<RgbImage>> {
        self.pixels.as_ref()
    }

    pub fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    pub fn pixel_orientation(&self) -> PixelOrientation {
        PixelOrientation::from(self.orientation)
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.pixels.as_ref().map(|p| p.dimensions())
    }
}
