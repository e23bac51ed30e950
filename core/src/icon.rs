//! Save icon decoding

/// Largest icon file read from storage.
pub const MAX_ICON_BYTES: u64 = 4 * 1024 * 1024;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIcon {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major RGBA.
    pub pixels: Vec<u8>,
}

impl DecodedIcon {
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IconDecodeError {
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("decoded icon has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("decoded icon is empty")]
    Empty,
}

/// Image codec collaborator.
pub trait IconDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedIcon, IconDecodeError>;
}

/// PNG decoder producing RGBA8 pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngIconDecoder;

impl IconDecoder for PngIconDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedIcon, IconDecodeError> {
        let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(IconDecodeError::Empty);
        }

        let icon = DecodedIcon {
            width,
            height,
            pixels: rgba.into_raw(),
        };
        if icon.pixels.len() != icon.byte_len() {
            return Err(IconDecodeError::SizeMismatch {
                expected: icon.byte_len(),
                actual: icon.pixels.len(),
            });
        }
        Ok(icon)
    }
}

#[cfg(test)]
pub(crate) fn encode_test_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
