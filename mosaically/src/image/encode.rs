//! Mosaic encoding: JPEG, PNG, and export-target selection

use imageproc::image::codecs::jpeg::JpegEncoder;
use imageproc::image::codecs::png::{CompressionType, FilterType, PngEncoder};
use imageproc::image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::error::{Error, Result};
use crate::mosaic::{ExportArtifact, LayoutPolicy, MosaicConfig};

use super::ImageFormat;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

/// Where the canvas is headed: which codec, and what the download is called.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExportTarget {
    pub format: ImageFormat,
    pub file_name: String,
}

/// Pad-and-center mirrors the first upload's extension: `png` stays PNG,
/// anything else is JPEG-encoded but keeps its extension in the download
/// name (so `first.bmp` yields `mosaic.bmp`). An extensionless first upload
/// falls back to `mosaic.jpg`. Scale-and-crop always exports PNG.
pub(super) fn export_target(config: &MosaicConfig, first_name: &str) -> ExportTarget {
    let png = ImageFormat::Png {
        compression: config.png_compression,
    };
    let jpeg = ImageFormat::Jpeg {
        quality: config.jpeg_quality,
    };

    match config.layout {
        LayoutPolicy::ScaleCrop => ExportTarget {
            format: png,
            file_name: String::from("mosaic.png"),
        },
        LayoutPolicy::PadCenter => {
            let extension = std::path::Path::new(first_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase());

            match extension.as_deref() {
                Some("png") => ExportTarget {
                    format: png,
                    file_name: String::from("mosaic.png"),
                },
                Some(extension) => ExportTarget {
                    format: jpeg,
                    file_name: format!("mosaic.{extension}"),
                },
                None => ExportTarget {
                    format: jpeg,
                    file_name: String::from("mosaic.jpg"),
                },
            }
        }
    }
}

pub(super) fn encode_canvas(canvas: &RgbImage, target: ExportTarget) -> Result<ExportArtifact> {
    let dimensions = canvas.dimensions();
    let mut data = Vec::new();

    match target.format {
        ImageFormat::Jpeg { quality } => compress_to_jpeg(canvas, &mut data, quality)?,
        ImageFormat::Png { compression } => compress_to_png(canvas, &mut data, compression)?,
    }

    Ok(ExportArtifact {
        file_name: target.file_name,
        data,
        dimensions,
        format: target.format,
    })
}

/// Compress an image to JPEG format with the specified quality
pub fn compress_to_jpeg<W>(img: &RgbImage, writer: &mut W, quality: u8) -> Result<()>
where
    W: std::io::Write,
{
    let mut encoder = JpegEncoder::new_with_quality(writer, quality);

    encoder
        .encode_image(img)
        .map_err(|source| Error::Encode { format: "JPEG", source })
}

/// Compress an image to PNG format with the specified compression level
pub fn compress_to_png<W>(img: &RgbImage, writer: &mut W, compression: PngCompression) -> Result<()>
where
    W: std::io::Write,
{
    let compression_type = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let encoder = PngEncoder::new_with_quality(writer, compression_type, FilterType::Adaptive);

    encoder
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|source| Error::Encode { format: "PNG", source })
}
