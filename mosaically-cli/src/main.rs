use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use mosaically::{build_mosaic, GridSpec, LayoutPolicy, MosaicConfig, PngCompression, SourceImage};

#[derive(Parser)]
#[command(name = "mosaically")]
#[command(about = "Combine a set of images into a single grid mosaic", long_about = None)]
#[command(version)]
struct Args {
    /// Input images, or directories to scan for images. Argument order sets
    /// the grid order.
    #[arg(value_name = "IMAGES")]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Grid rows, 1-20 (default 2)
    #[arg(short, long, value_name = "N")]
    rows: Option<u32>,

    /// Grid columns, 1-20 (default 4)
    #[arg(short, long, value_name = "N")]
    columns: Option<u32>,

    /// Cell layout policy
    #[arg(short, long, value_enum)]
    layout: Option<LayoutArg>,

    /// JPEG quality (0-100)
    #[arg(long, value_name = "QUALITY")]
    quality: Option<u8>,

    /// PNG compression level
    #[arg(long, value_enum)]
    png_compression: Option<PngCompressionArg>,

    /// Save these settings as the defaults for future runs
    #[arg(long, default_value_t)]
    save_config: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// Letterbox each image on a white cell, unscaled
    Pad,
    /// Scale each image to fill its cell, cropping the overflow
    Crop,
}

impl From<LayoutArg> for LayoutPolicy {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Pad => LayoutPolicy::PadCenter,
            LayoutArg::Crop => LayoutPolicy::ScaleCrop,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // Build config: saved preferences seed anything not given on the
    // command line
    let config = build_config(&args)?;

    if args.save_config {
        match config.save() {
            Some(()) => log::info!("Saved settings as defaults"),
            None => log::warn!("Could not save settings"),
        }
    }

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        log::info!("No images given, nothing to do. Pass image files or directories.");
        return Ok(());
    }

    if !args.quiet {
        log::info!("Found {} images", files.len());
    }

    // Decode in argument order; order determines grid position
    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        sources.push(SourceImage::decode(name, &bytes)?);
    }

    let artifact = match build_mosaic(sources, &config)? {
        Some(artifact) => artifact,
        None => return Ok(()),
    };

    // Create output directory if it doesn't exist
    if !args.output_dir.exists() {
        std::fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;
    }

    let output_path = args.output_dir.join(&artifact.file_name);
    std::fs::write(&output_path, &artifact.data).context("Failed to write output file")?;

    if !args.quiet {
        let (width, height) = artifact.dimensions;
        log::info!("Done: {} ({width}x{height})", output_path.display());
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<MosaicConfig> {
    // Validate quality
    if let Some(quality) = args.quality {
        if quality > 100 {
            anyhow::bail!("Quality must be between 0 and 100");
        }
    }

    let saved = MosaicConfig::load().unwrap_or_default();

    // Grid bounds are enforced by the core; surface its message directly
    let grid = GridSpec::new(
        args.rows.unwrap_or(saved.grid.rows),
        args.columns.unwrap_or(saved.grid.columns),
    )?;

    Ok(MosaicConfig {
        grid,
        layout: args.layout.map(Into::into).unwrap_or(saved.layout),
        jpeg_quality: args.quality.unwrap_or(saved.jpeg_quality),
        png_compression: args
            .png_compression
            .map(Into::into)
            .unwrap_or(saved.png_compression),
    })
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

/// Explicit files keep their argument order; a directory expands to its
/// image files sorted by path, for a stable order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_image_file(path))
                .collect();
            found.sort();

            if found.is_empty() {
                log::warn!("No images found under {}", input.display());
            }
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            anyhow::bail!("Input does not exist: {}", input.display());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_filter() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("b.JPG")));
        assert!(is_image_file(Path::new("c.tiff")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn directories_expand_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();

        let files = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.jpg", "b.png"]);
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("z.png");
        let second = dir.path().join("a.png");
        std::fs::write(&first, b"x").unwrap();
        std::fs::write(&second, b"x").unwrap();

        let files = collect_inputs(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(files, [first, second]);
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(collect_inputs(&[PathBuf::from("/no/such/file.png")]).is_err());
    }
}
