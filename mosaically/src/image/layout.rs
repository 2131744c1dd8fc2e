//! Grid planning: the capacity gate and uniform cell sizing

use crate::error::{Error, Result};
use crate::mosaic::GridSpec;

use super::decode::SourceImage;

/// Uniform cell dimensions for a batch. Each axis is governed independently
/// by the single largest image on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub fn of(images: &[SourceImage]) -> Self {
        let width = images.iter().map(|img| img.pixels.width()).max().unwrap_or(0);
        let height = images
            .iter()
            .map(|img| img.pixels.height())
            .max()
            .unwrap_or(0);

        CellSize { width, height }
    }
}

/// Reject the batch before any pixel work when the grid cannot hold it.
pub(super) fn check_capacity(grid: &GridSpec, images: usize) -> Result<()> {
    let cells = grid.cells();
    if images > cells as usize {
        return Err(Error::Capacity {
            rows: grid.rows,
            columns: grid.columns,
            cells,
            images,
        });
    }
    Ok(())
}
