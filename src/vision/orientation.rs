//! Conversion between capture orientation and backend pixel orientation.
//!
//! Cameras report orientation in capture order (raw 0..=7) while the
//! inference backend expects EXIF orientation (raw 1..=8). The two enums
//! share variant names but not raw values.

use image::{imageops, RgbImage};

/// Orientation reported by the image capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageOrientation {
    #[default]
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

impl ImageOrientation {
    pub const ALL: [ImageOrientation; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpMirrored,
        Self::DownMirrored,
        Self::LeftMirrored,
        Self::RightMirrored,
    ];

    /// Decode a capture-order raw value. Returns None for unknown values.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Parse a lowercase or camelCase name (`up`, `leftMirrored`, `left-mirrored`).
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "upmirrored" => Some(Self::UpMirrored),
            "downmirrored" => Some(Self::DownMirrored),
            "leftmirrored" => Some(Self::LeftMirrored),
            "rightmirrored" => Some(Self::RightMirrored),
            _ => None,
        }
    }
}

/// EXIF pixel orientation consumed by vision backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelOrientation {
    #[default]
    Up = 1,
    UpMirrored = 2,
    Down = 3,
    DownMirrored = 4,
    LeftMirrored = 5,
    Right = 6,
    RightMirrored = 7,
    Left = 8,
}

impl From<ImageOrientation> for PixelOrientation {
    fn from(orientation: ImageOrientation) -> Self {
        match orientation {
            ImageOrientation::Up => Self::Up,
            ImageOrientation::Down => Self::Down,
            ImageOrientation::Left => Self::Left,
            ImageOrientation::Right => Self::Right,
            ImageOrientation::UpMirrored => Self::UpMirrored,
            ImageOrientation::DownMirrored => Self::DownMirrored,
            ImageOrientation::LeftMirrored => Self::LeftMirrored,
            ImageOrientation::RightMirrored => Self::RightMirrored,
        }
    }
}

/// Map a raw capture orientation to the backend orientation.
///
/// Values the capture layer may add in the future fall back to `Up`.
pub fn to_backend_orientation(raw: u8) -> PixelOrientation {
    ImageOrientation::from_raw(raw)
        .map(PixelOrientation::from)
        .unwrap_or(PixelOrientation::Up)
}

impl PixelOrientation {
    pub fn exif(self) -> u8 {
        self as u8
    }

    /// Whether width and height swap when the buffer is made upright.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Left | Self::Right | Self::LeftMirrored | Self::RightMirrored
        )
    }

    /// Produce an upright copy of `pixels` stored with this orientation.
    pub fn normalize(self, pixels: &RgbImage) -> RgbImage {
        match self {
            Self::Up => pixels.clone(),
            Self::UpMirrored => imageops::flip_horizontal(pixels),
            Self::Down => imageops::rotate180(pixels),
            Self::DownMirrored => imageops::flip_vertical(pixels),
            Self::LeftMirrored => imageops::flip_horizontal(&imageops::rotate90(pixels)),
            Self::Right => imageops::rotate90(pixels),
            Self::RightMirrored => imageops::flip_horizontal(&imageops::rotate270(pixels)),
            Self::Left => imageops::rotate270(pixels),
        }
    }
}
