//! Crate-level error type and `Result` alias for the mosaic pipeline.
//! Every variant is terminal to the run that raised it, recoverable by
//! re-running with corrected inputs; none abort the process.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("grid {rows}x{columns} holds {cells} cells but {images} images were supplied")]
    Capacity {
        rows: u32,
        columns: u32,
        cells: u32,
        images: usize,
    },

    #[error("invalid grid {axis}: {value} (must be between 1 and 20)")]
    Grid { axis: &'static str, value: u32 },

    #[error("failed to decode `{name}`: {source}")]
    Decode {
        name: String,
        source: imageproc::image::ImageError,
    },

    #[error("failed to encode mosaic as {format}: {source}")]
    Encode {
        format: &'static str,
        source: imageproc::image::ImageError,
    },
}

impl Error {
    /// How many images the grid falls short by. `None` for anything other
    /// than a capacity failure.
    pub fn deficit(&self) -> Option<usize> {
        match self {
            Error::Capacity { cells, images, .. } => Some(images - *cells as usize),
            _ => None,
        }
    }
}
