//! Mosaic pipeline: decode, plan, compose, assemble, encode

mod compose;
mod decode;
mod encode;
mod layout;

// Re-export public API
pub use decode::{decode_all, SourceImage};
pub use encode::{compress_to_jpeg, compress_to_png, PngCompression};
pub use layout::CellSize;

use imageproc::image::RgbImage;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::Result;
use crate::mosaic::{ExportArtifact, MosaicConfig};

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ImageFormat {
    Jpeg { quality: u8 },
    Png { compression: PngCompression },
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg { .. } => "jpg",
            ImageFormat::Png { .. } => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg { .. } => "image/jpeg",
            ImageFormat::Png { .. } => "image/png",
        }
    }
}

/// Compose the supplied images into a single encoded mosaic.
///
/// The whole run is a single pass: capacity gate, cell sizing, per-image
/// tile composition, assembly, encode. It either completes or fails with
/// nothing produced. An empty batch is not an error, just `None`.
pub fn build_mosaic(
    images: Vec<SourceImage>,
    config: &MosaicConfig,
) -> Result<Option<ExportArtifact>> {
    if images.is_empty() {
        log::debug!("No images supplied, nothing to compose");
        return Ok(None);
    }

    config.grid.validate()?;
    layout::check_capacity(&config.grid, images.len())?;

    let cell = CellSize::of(&images);
    log::info!(
        "Composing {}x{} {} mosaic from {} images, cell {}x{}",
        config.grid.rows,
        config.grid.columns,
        config.layout.name(),
        images.len(),
        cell.width,
        cell.height
    );

    // The export target depends on the first upload's name, which the
    // parallel stage below consumes.
    let target = encode::export_target(config, &images[0].name);

    // Tiles come back in upload order; the indexed collect preserves it, so
    // the output is identical to a serial pass. Sources are consumed here,
    // leaving only cell-sized tiles alive for assembly.
    let tiles: Vec<RgbImage> = images
        .into_par_iter()
        .map(|src| compose::tile(src, cell, config.layout))
        .collect();

    let canvas = compose::assemble(&config.grid, cell, &tiles);
    log::debug!("Canvas assembled: {}x{}", canvas.width(), canvas.height());

    let artifact = encode::encode_canvas(&canvas, target)?;
    log::info!(
        "Encoded {} ({} bytes)",
        artifact.file_name,
        artifact.data.len()
    );

    Ok(Some(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mosaic::{GridSpec, LayoutPolicy};

    fn source(name: &str, width: u32, height: u32) -> SourceImage {
        SourceImage {
            name: name.to_string(),
            pixels: RgbImage::from_pixel(width, height, imageproc::image::Rgb([10, 20, 30])),
        }
    }

    fn config(rows: u32, columns: u32, layout: LayoutPolicy) -> MosaicConfig {
        MosaicConfig {
            grid: GridSpec { rows, columns },
            layout,
            ..MosaicConfig::default()
        }
    }

    #[test]
    fn empty_batch_is_idle_not_an_error() {
        let result = build_mosaic(Vec::new(), &MosaicConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn over_capacity_reports_the_exact_deficit() {
        let images = (0..5).map(|i| source(&format!("{i}.png"), 10, 10)).collect();
        let err = build_mosaic(images, &config(2, 2, LayoutPolicy::PadCenter)).unwrap_err();

        assert_eq!(err.deficit(), Some(1));
        assert!(matches!(err, Error::Capacity { cells: 4, images: 5, .. }));
    }

    #[test]
    fn pad_center_canvas_spans_the_whole_grid() {
        // 3 heterogeneous images on a 2x2 grid: cell is the pairwise max
        // (200x150), canvas is columns*cell by rows*cell.
        let images = vec![
            source("a.png", 100, 100),
            source("b.png", 200, 150),
            source("c.png", 50, 80),
        ];
        let artifact = build_mosaic(images, &config(2, 2, LayoutPolicy::PadCenter))
            .unwrap()
            .unwrap();

        assert_eq!(artifact.dimensions, (400, 300));
        assert_eq!(artifact.file_name, "mosaic.png");
        assert_eq!(artifact.mime_type(), "image/png");
    }

    #[test]
    fn scale_crop_always_exports_png() {
        let images = vec![source("photo.jpeg", 300, 100), source("other.jpeg", 60, 60)];
        let artifact = build_mosaic(images, &config(1, 2, LayoutPolicy::ScaleCrop))
            .unwrap()
            .unwrap();

        assert_eq!(artifact.file_name, "mosaic.png");
        assert_eq!(artifact.dimensions, (600, 100));
        assert_eq!(artifact.mime_type(), "image/png");
    }

    #[test]
    fn reruns_are_byte_identical() {
        let batch = || {
            vec![
                source("a.png", 37, 22),
                source("b.png", 64, 64),
                source("c.png", 9, 51),
            ]
        };
        let config = config(2, 2, LayoutPolicy::ScaleCrop);

        let first = build_mosaic(batch(), &config).unwrap().unwrap();
        let second = build_mosaic(batch(), &config).unwrap().unwrap();
        assert_eq!(first.data, second.data);
    }
}
