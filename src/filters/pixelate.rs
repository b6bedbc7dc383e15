use super::{quantize, resize, FrameFilter};
use crate::params::FilterParams;
use anyhow::Result;
use image::RgbImage;

/// Retro pixelation: collapse square blocks to their average color, then
/// band each channel down to a small per-channel palette.
pub struct Pixelate;

impl FrameFilter for Pixelate {
    fn name(&self) -> &'static str {
        "pixelate"
    }

    fn apply(&self, frame: &RgbImage, params: &FilterParams) -> Result<RgbImage> {
        let small = resize::shrink(frame, params.scale())?;
        let (w, h) = small.dimensions();

        // Averaging down to one pixel per block and blowing back up with
        // nearest-neighbor is what produces the visible squares. A block
        // size larger than the working frame leaves a single 1x1 cell.
        let block = params.block_size().max(1);
        let tiny_w = (w / block).max(1);
        let tiny_h = (h / block).max(1);
        let tiny = resize::area_to(&small, tiny_w, tiny_h)?;
        let mut blocky = resize::restore(&tiny, (w, h))?;

        quantize::posterize(&mut blocky, params.palette_levels());

        if blocky.dimensions() != frame.dimensions() {
            return resize::restore(&blocky, frame.dimensions());
        }
        Ok(blocky)
    }

    fn hud_line(&self, params: &FilterParams) -> Option<String> {
        Some(format!(
            "block_size={}  palette_levels={}",
            params.block_size(),
            params.palette_levels()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn solid_frame_becomes_uniform_quantized_blocks() {
        // 100x100 solid (200,200,200), block 10, two palette levels:
        // step = 128, floor(200/128)*128 = 128 on every channel.
        let frame = RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]));
        let params = FilterParams::new("pixelate", 1.0, 10, 2, 80, 8);
        let out = Pixelate.apply(&frame, &params).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert!(out.pixels().all(|p| p.0 == [128, 128, 128]));
    }

    #[test]
    fn output_dimensions_match_input_across_parameter_combinations() {
        let frame = RgbImage::new(97, 61);
        for scale in [0.25, 0.6, 1.0] {
            for block in [1, 4, 32] {
                for levels in [2, 10, 32] {
                    let params = FilterParams::new("pixelate", scale, block, levels, 80, 8);
                    let out = Pixelate.apply(&frame, &params).unwrap();
                    assert_eq!(out.dimensions(), frame.dimensions());
                }
            }
        }
    }

    #[test]
    fn oversized_block_collapses_to_a_single_color() {
        let frame = RgbImage::from_fn(8, 8, |x, _| Rgb([(x * 30) as u8, 0, 0]));
        let params = FilterParams::new("pixelate", 1.0, 32, 32, 80, 8);
        let out = Pixelate.apply(&frame, &params).unwrap();
        let first = out.get_pixel(0, 0);
        assert!(out.pixels().all(|p| p == first));
    }
}
