/// CPU-side image data and sampling parameters

/// Minification/magnification filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Point sampling
    Nearest,
    /// Linear interpolation
    Bilinear,
}

/// Texture coordinate wrapping, per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
}

/// Pixel formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba8888,
    Rgb888,
    Rgba4444,
    Rgb565,
    Lum8,
    LumA88,
}

impl ImageFormat {
    /// Bytes per pixel in CPU memory
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ImageFormat::Rgba8888 => 4,
            ImageFormat::Rgb888 => 3,
            ImageFormat::Rgba4444 => 2,
            ImageFormat::Rgb565 => 2,
            ImageFormat::Lum8 => 1,
            ImageFormat::LumA88 => 2,
        }
    }
}

/// A CPU-side image ready for upload
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Expected byte length of `pixels` for the given dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Whether both dimensions are powers of two
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
