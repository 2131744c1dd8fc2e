use std::{fs, path::PathBuf};

use crate::error::{Error, Result};
use crate::image::{ImageFormat, PngCompression};

/// Largest accepted grid dimension on either axis. Keeps a typo'd request
/// from allocating a pathological canvas.
pub const MAX_GRID_DIM: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub columns: u32,
}

impl GridSpec {
    pub fn new(rows: u32, columns: u32) -> Result<Self> {
        let grid = GridSpec { rows, columns };
        grid.validate()?;
        Ok(grid)
    }

    /// Bounds are checked here rather than by construction alone because
    /// configs deserialized from disk never went through `new`.
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in [("rows", self.rows), ("columns", self.columns)] {
            if value == 0 || value > MAX_GRID_DIM {
                return Err(Error::Grid { axis, value });
            }
        }
        Ok(())
    }

    pub fn cells(&self) -> u32 {
        self.rows * self.columns
    }

    /// Grid position of the image at `index`: left-to-right, then
    /// top-to-bottom, in upload order.
    pub fn position(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index / self.columns, index % self.columns)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec { rows: 2, columns: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayoutPolicy {
    /// Paste each image unscaled onto a white cell, centered.
    PadCenter,
    /// Scale each image to cover its cell, center-cropping the overflow.
    ScaleCrop,
}

impl LayoutPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutPolicy::PadCenter => "pad-center",
            LayoutPolicy::ScaleCrop => "scale-crop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MosaicConfig {
    pub grid: GridSpec,
    pub layout: LayoutPolicy,
    // JPEG quality: 0-100
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            layout: LayoutPolicy::PadCenter,
            jpeg_quality: 85,
            png_compression: PngCompression::Default,
        }
    }
}

impl MosaicConfig {
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path()?;

        fs::read_to_string(&config_path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn save(&self) -> Option<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).ok()?;
        }

        serde_json::to_string_pretty(self)
            .ok()
            .and_then(|json| fs::write(&config_path, json).ok())
    }

    fn config_path() -> Option<PathBuf> {
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("mosaically").join("config.json"))
    }
}

/// The finished mosaic, encoded and named, ready to hand to whatever shell
/// invoked the pipeline.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub data: Vec<u8>,
    pub dimensions: (u32, u32),
    pub format: ImageFormat,
}

impl ExportArtifact {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_bounds() {
        assert!(GridSpec::new(1, 1).is_ok());
        assert!(GridSpec::new(20, 20).is_ok());
        assert!(matches!(
            GridSpec::new(0, 4),
            Err(Error::Grid { axis: "rows", value: 0 })
        ));
        assert!(matches!(
            GridSpec::new(2, 21),
            Err(Error::Grid { axis: "columns", value: 21 })
        ));
    }

    #[test]
    fn position_is_row_major() {
        let grid = GridSpec { rows: 2, columns: 4 };
        assert_eq!(grid.position(0), (0, 0));
        assert_eq!(grid.position(3), (0, 3));
        assert_eq!(grid.position(4), (1, 0));
        assert_eq!(grid.position(7), (1, 3));
    }

    #[test]
    fn defaults_match_the_upload_form() {
        let config = MosaicConfig::default();
        assert_eq!(config.grid, GridSpec { rows: 2, columns: 4 });
        assert_eq!(config.layout, LayoutPolicy::PadCenter);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = MosaicConfig {
            grid: GridSpec { rows: 3, columns: 5 },
            layout: LayoutPolicy::ScaleCrop,
            jpeg_quality: 70,
            png_compression: PngCompression::Best,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: MosaicConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
