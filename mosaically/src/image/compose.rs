//! Cell composition: the two layout policies, and canvas assembly

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use imageproc::image::{imageops, Rgb, RgbImage};

use crate::mosaic::{GridSpec, LayoutPolicy};

use super::decode::SourceImage;
use super::layout::CellSize;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Transform one source image into a tile of exactly `cell` dimensions.
/// Consumes the source so decoded buffers die as soon as their tile exists.
pub(super) fn tile(src: SourceImage, cell: CellSize, policy: LayoutPolicy) -> RgbImage {
    match policy {
        LayoutPolicy::PadCenter => pad_center(src.pixels, cell),
        LayoutPolicy::ScaleCrop => scale_crop(src.pixels, cell),
    }
}

/// Paste the image unscaled onto a white cell, integer-centered. Floor
/// halving biases any odd remainder of white space toward the bottom-right,
/// i.e. the image itself sits toward the top-left.
fn pad_center(img: RgbImage, cell: CellSize) -> RgbImage {
    let (width, height) = img.dimensions();

    // The cell is the batch-wide max, so this image always fits. The
    // largest image on both axes needs no padding at all.
    if (width, height) == (cell.width, cell.height) {
        return img;
    }

    let x_offset = (cell.width - width) / 2;
    let y_offset = (cell.height - height) / 2;

    let mut tile = RgbImage::from_pixel(cell.width, cell.height, BACKGROUND);
    imageops::overlay(&mut tile, &img, x_offset.into(), y_offset.into());
    tile
}

/// Cover-scale geometry: the resize dimensions and crop origin that fill
/// `cell` with no border. Pure arithmetic, kept separate from pixel work.
///
/// The scale is the larger of the two per-axis ratios, so both axes reach
/// at least the cell size; the surplus axis is what gets cropped. Rounding
/// the scaled size can land a pixel short on the governing axis, so both
/// are clamped up to the cell.
pub(super) fn scale_crop_geometry(src: (u32, u32), cell: CellSize) -> ((u32, u32), (u32, u32)) {
    let (width, height) = src;

    let scale = f64::max(
        f64::from(cell.width) / f64::from(width),
        f64::from(cell.height) / f64::from(height),
    );

    let resized_width = ((f64::from(width) * scale).round() as u32).max(cell.width);
    let resized_height = ((f64::from(height) * scale).round() as u32).max(cell.height);

    // Floor halving: the odd leftover pixel is trimmed from the trailing
    // edge, mirroring the pad-center convention.
    let crop_x = (resized_width - cell.width) / 2;
    let crop_y = (resized_height - cell.height) / 2;

    ((resized_width, resized_height), (crop_x, crop_y))
}

/// Scale the image to cover the cell, then center-crop the overflow down to
/// exactly `cell`.
fn scale_crop(img: RgbImage, cell: CellSize) -> RgbImage {
    let ((resized_width, resized_height), (crop_x, crop_y)) =
        scale_crop_geometry(img.dimensions(), cell);

    let resized = if (resized_width, resized_height) == img.dimensions() {
        img
    } else {
        resize(img, resized_width, resized_height)
    };

    if resized.dimensions() == (cell.width, cell.height) {
        return resized;
    }

    imageops::crop_imm(&resized, crop_x, crop_y, cell.width, cell.height).to_image()
}

fn resize(img: RgbImage, new_width: u32, new_height: u32) -> RgbImage {
    let (width, height) = img.dimensions();

    // Choose algorithm based on scaling direction
    let algorithm = if new_width < width {
        // Downscaling: Lanczos3 preserves detail
        fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3)
    } else {
        // Upscaling: CatmullRom gives smoother results
        fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom)
    };

    let src_image =
        FrImage::from_vec_u8(width, height, img.into_raw(), fr::PixelType::U8x3).unwrap();

    let mut dst_buffer = vec![0u8; new_width as usize * new_height as usize * 3];
    let mut dst_image =
        FrImage::from_slice_u8(new_width, new_height, &mut dst_buffer, fr::PixelType::U8x3)
            .unwrap();

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            Some(&fr::ResizeOptions::new().resize_alg(algorithm)),
        )
        .unwrap();

    RgbImage::from_raw(new_width, new_height, dst_buffer).unwrap()
}

/// Paste tiles onto a white canvas, left-to-right then top-to-bottom in
/// upload order. Cells past the last tile stay white; paste is an opaque
/// overwrite, no blending.
pub(super) fn assemble(grid: &GridSpec, cell: CellSize, tiles: &[RgbImage]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(
        grid.columns * cell.width,
        grid.rows * cell.height,
        BACKGROUND,
    );

    for (index, tile) in tiles.iter().enumerate() {
        let (row, column) = grid.position(index);
        let x = i64::from(column * cell.width);
        let y = i64::from(row * cell.height);
        imageops::overlay(&mut canvas, tile, x, y);
    }

    canvas
}
