//! Image decoding and RGB normalization

use imageproc::image::error::{LimitError, LimitErrorKind};
use imageproc::image::{load_from_memory, ImageError, RgbImage};

use crate::error::{Error, Result};

/// A decoded upload, flattened to RGB8. `name` is the original filename;
/// the first upload's name drives the export format.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub pixels: RgbImage,
}

impl SourceImage {
    /// Decode one byte stream. Alpha, palette, and grayscale inputs are all
    /// flattened to RGB.
    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();

        let decoded = match load_from_memory(bytes) {
            Ok(decoded) => decoded,
            Err(source) => return Err(Error::Decode { name, source }),
        };

        let pixels = decoded.to_rgb8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::Decode {
                name,
                source: ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)),
            });
        }

        Ok(SourceImage { name, pixels })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Decode an ordered batch of `(filename, bytes)` pairs, failing on the
/// first stream that is not a recognized raster format. Order is preserved;
/// it determines grid position.
pub fn decode_all<I, S>(files: I) -> Result<Vec<SourceImage>>
where
    I: IntoIterator<Item = (S, Vec<u8>)>,
    S: Into<String>,
{
    files
        .into_iter()
        .map(|(name, bytes)| SourceImage::decode(name, &bytes))
        .collect()
}
