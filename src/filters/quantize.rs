use image::RgbImage;

/// Band every channel to `floor(v / step) * step` with `step = 256 / levels`.
///
/// Plain integer arithmetic on purpose: the banding boundaries must not
/// drift the way a float implementation could. Channels are quantized
/// independently, which limits each channel to `levels` values rather than
/// reducing the image to a true fixed palette.
pub fn posterize(frame: &mut RgbImage, levels: u32) {
    let step = step_for(levels);
    if step <= 1 {
        return;
    }
    for pixel in frame.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = *channel / step * step;
        }
    }
}

fn step_for(levels: u32) -> u8 {
    let levels = levels.clamp(2, 256);
    (256 / levels) as u8
}
