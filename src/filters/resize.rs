use anyhow::{Context, Result};
use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x3;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbImage;

/// Downscale a frame to the working resolution.
///
/// Scales at (or within rounding noise of) 1.0 return the input unchanged.
/// Uses box convolution, which averages the source area covered by each
/// destination pixel and so avoids aliasing when shrinking.
pub fn shrink(frame: &RgbImage, scale: f32) -> Result<RgbImage> {
    if scale >= 0.999 {
        return Ok(frame.clone());
    }
    let (w, h) = frame.dimensions();
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);
    area_to(frame, nw, nh)
}

/// Resize back to `target` dimensions with nearest-neighbor sampling,
/// which keeps hard block edges instead of smoothing them away.
pub fn restore(frame: &RgbImage, target: (u32, u32)) -> Result<RgbImage> {
    resize_to(frame, target.0, target.1, ResizeAlg::Nearest)
}

/// Area-averaging resize to arbitrary dimensions.
pub fn area_to(frame: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    resize_to(frame, width, height, ResizeAlg::Convolution(FilterType::Box))
}

fn resize_to(frame: &RgbImage, width: u32, height: u32, alg: ResizeAlg) -> Result<RgbImage> {
    let (w, h) = frame.dimensions();
    if (w, h) == (width, height) {
        return Ok(frame.clone());
    }

    let src = TypedImageRef::<U8x3>::from_buffer(w, h, frame.as_raw())
        .context("Source frame buffer does not match its dimensions")?;

    let mut dst_buf = vec![0u8; width as usize * height as usize * 3];
    let mut dst = TypedImage::<U8x3>::from_buffer(width, height, &mut dst_buf)
        .context("Failed to build destination image")?;

    let opts = ResizeOptions::new().resize_alg(alg);
    let mut resizer = Resizer::new();
    resizer
        .resize_typed::<U8x3>(&src, &mut dst, &opts)
        .context("Resize failed")?;

    RgbImage::from_raw(width, height, dst_buf).context("Resized buffer has the wrong length")
}
