use super::{quantize, resize, FrameFilter};
use crate::params::FilterParams;
use anyhow::Result;
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Cel-shaded stylization: flatten colors with an edge-preserving smooth,
/// band them into a few levels, and ink the strong edges black.
pub struct Toon;

// Fixed 7x7 neighborhood tuned for the working resolution.
const SMOOTH_RADIUS: i32 = 3;
const SIGMA_COLOR: f32 = 60.0;
const SIGMA_SPACE: f32 = 60.0;

impl FrameFilter for Toon {
    fn name(&self) -> &'static str {
        "toon"
    }

    fn apply(&self, frame: &RgbImage, params: &FilterParams) -> Result<RgbImage> {
        let small = resize::shrink(frame, params.scale())?;

        let smooth = bilateral_smooth(&small);

        let gray = gaussian3(&luminance(&smooth));
        let low = params.edge_strength() as i32;
        let high = (low * 2).min(255);
        let edges = dilate2x2(&edge_mask(&gray, low, high));

        let mut toon = smooth;
        quantize::posterize(&mut toon, params.color_levels());

        // Invert the mask and AND it in: edge pixels go to black, everything
        // else keeps its quantized color.
        for (pixel, &edge) in toon.pixels_mut().zip(edges.as_raw()) {
            let keep = !edge;
            pixel.0[0] &= keep;
            pixel.0[1] &= keep;
            pixel.0[2] &= keep;
        }

        if toon.dimensions() != frame.dimensions() {
            return resize::restore(&toon, frame.dimensions());
        }
        Ok(toon)
    }

    fn hud_line(&self, params: &FilterParams) -> Option<String> {
        Some(format!(
            "edge_strength={}  color_levels={}",
            params.edge_strength(),
            params.color_levels()
        ))
    }
}

/// Bilateral-style smoothing: flat regions average out while strong color
/// boundaries stay put, which is what gives toon shading its flat patches.
fn bilateral_smooth(frame: &RgbImage) -> RgbImage {
    let (w, h) = frame.dimensions();
    let span = (2 * SMOOTH_RADIUS + 1) as usize;

    let mut spatial = vec![0f32; span * span];
    for dy in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
        for dx in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
            let d2 = (dx * dx + dy * dy) as f32;
            let idx = (dy + SMOOTH_RADIUS) as usize * span + (dx + SMOOTH_RADIUS) as usize;
            spatial[idx] = (-d2 / (2.0 * SIGMA_SPACE * SIGMA_SPACE)).exp();
        }
    }

    // Color weight indexed by the summed absolute channel difference.
    let mut color_weight = [0f32; 256 * 3];
    for (d, weight) in color_weight.iter_mut().enumerate() {
        let d = d as f32;
        *weight = (-(d * d) / (2.0 * SIGMA_COLOR * SIGMA_COLOR)).exp();
    }

    let mut out = RgbImage::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let center = frame.get_pixel(x as u32, y as u32).0;
            let mut acc = [0f32; 3];
            let mut weight_sum = 0f32;

            for dy in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
                for dx in -SMOOTH_RADIUS..=SMOOTH_RADIUS {
                    let nx = (x + dx).clamp(0, w as i32 - 1) as u32;
                    let ny = (y + dy).clamp(0, h as i32 - 1) as u32;
                    let neighbor = frame.get_pixel(nx, ny).0;

                    let dist = center[0].abs_diff(neighbor[0]) as usize
                        + center[1].abs_diff(neighbor[1]) as usize
                        + center[2].abs_diff(neighbor[2]) as usize;
                    let idx =
                        (dy + SMOOTH_RADIUS) as usize * span + (dx + SMOOTH_RADIUS) as usize;
                    let weight = spatial[idx] * color_weight[dist];

                    weight_sum += weight;
                    acc[0] += weight * neighbor[0] as f32;
                    acc[1] += weight * neighbor[1] as f32;
                    acc[2] += weight * neighbor[2] as f32;
                }
            }

            // The center pixel always contributes weight 1.0, so the sum is
            // never zero.
            out.put_pixel(
                x as u32,
                y as u32,
                Rgb([
                    (acc[0] / weight_sum).round() as u8,
                    (acc[1] / weight_sum).round() as u8,
                    (acc[2] / weight_sum).round() as u8,
                ]),
            );
        }
    }
    out
}

/// BT.601 luminance.
fn luminance(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let p = frame.get_pixel(x, y).0;
        let y601 = (299 * p[0] as u32 + 587 * p[1] as u32 + 114 * p[2] as u32) / 1000;
        Luma([y601 as u8])
    })
}

/// 3x3 binomial blur to knock sensor noise out of the edge detector input.
fn gaussian3(gray: &GrayImage) -> GrayImage {
    const KERNEL: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let mut acc = 0u32;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let nx = (x as i32 + dx).clamp(0, w as i32 - 1) as u32;
                let ny = (y as i32 + dy).clamp(0, h as i32 - 1) as u32;
                acc += KERNEL[(dy + 1) as usize][(dx + 1) as usize]
                    * gray.get_pixel(nx, ny).0[0] as u32;
            }
        }
        Luma([(acc / 16) as u8])
    })
}

/// Binary edge mask from Sobel gradient magnitude with dual thresholds:
/// pixels at or above `high` seed the mask, pixels at or above `low`
/// survive only when 8-connected to a seed.
fn edge_mask(gray: &GrayImage, low: i32, high: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let at = |x: i32, y: i32| {
        let cx = x.clamp(0, w as i32 - 1) as u32;
        let cy = y.clamp(0, h as i32 - 1) as u32;
        gray.get_pixel(cx, cy).0[0] as i32
    };

    let mut magnitude = vec![0u8; (w * h) as usize];
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let gx = at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x - 1, y)
                - at(x - 1, y + 1);
            let gy = at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1)
                - at(x - 1, y - 1)
                - 2 * at(x, y - 1)
                - at(x + 1, y - 1);
            // L1 magnitude, saturated to the 8-bit intensity range.
            magnitude[(y as u32 * w + x as u32) as usize] = (gx.abs() + gy.abs()).min(255) as u8;
        }
    }

    let mut edges = GrayImage::new(w, h);
    let mut pending: Vec<(u32, u32)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if magnitude[(y * w + x) as usize] as i32 >= high {
                edges.put_pixel(x, y, Luma([255]));
                pending.push((x, y));
            }
        }
    }

    // Grow seeds into adjacent weak pixels.
    while let Some((x, y)) = pending.pop() {
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if edges.get_pixel(nx, ny).0[0] == 0
                    && magnitude[(ny * w + nx) as usize] as i32 >= low
                {
                    edges.put_pixel(nx, ny, Luma([255]));
                    pending.push((nx, ny));
                }
            }
        }
    }

    edges
}

/// One dilation pass with a 2x2 structuring element to thicken outlines.
fn dilate2x2(edges: &GrayImage) -> GrayImage {
    let (w, h) = edges.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let hit = [(0, 0), (1, 0), (0, 1), (1, 1)].iter().any(|&(dx, dy)| {
            let nx = x + dx;
            let ny = y + dy;
            nx < w && ny < h && edges.get_pixel(nx, ny).0[0] != 0
        });
        Luma([if hit { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_frame_has_empty_edge_mask_and_equals_quantized_base() {
        let frame = RgbImage::from_pixel(40, 30, Rgb([200, 120, 60]));
        let params = FilterParams::new("toon", 1.0, 4, 10, 80, 8);
        let out = Toon.apply(&frame, &params).unwrap();

        // No edges anywhere, so the output is exactly the quantized smooth
        // base. Smoothing a uniform frame is a no-op.
        let mut expected = frame.clone();
        quantize::posterize(&mut expected, 8);
        assert_eq!(out, expected);
    }

    #[test]
    fn output_dimensions_match_input_across_parameter_combinations() {
        let frame = RgbImage::new(53, 41);
        for scale in [0.25, 0.6, 1.0] {
            for edge in [10u8, 80, 200] {
                for levels in [2, 8, 16] {
                    let params = FilterParams::new("toon", scale, 4, 10, edge, levels);
                    let out = Toon.apply(&frame, &params).unwrap();
                    assert_eq!(out.dimensions(), frame.dimensions());
                }
            }
        }
    }

    #[test]
    fn hard_contrast_boundary_produces_black_outline() {
        // Left half black, right half white: the seam must be inked.
        let frame = RgbImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let params = FilterParams::new("toon", 1.0, 4, 10, 40, 8);
        let out = Toon.apply(&frame, &params).unwrap();
        let seam_black = (0..32).all(|y| out.get_pixel(16, y).0 == [0, 0, 0]);
        assert!(seam_black);
    }

    #[test]
    fn high_threshold_saturates_instead_of_overflowing() {
        let gray = GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        // low = 200 doubles past 255; the mask must still be computable.
        let mask = edge_mask(&gray, 200, (200 * 2).min(255));
        assert!(mask.pixels().any(|p| p.0[0] == 255));
    }

    #[test]
    fn dilation_thickens_a_single_edge_pixel() {
        let mut edges = GrayImage::new(4, 4);
        edges.put_pixel(2, 2, Luma([255]));
        let grown = dilate2x2(&edges);
        assert_eq!(grown.get_pixel(2, 2).0[0], 255);
        assert_eq!(grown.get_pixel(1, 2).0[0], 255);
        assert_eq!(grown.get_pixel(2, 1).0[0], 255);
        assert_eq!(grown.get_pixel(1, 1).0[0], 255);
    }
}
