use super::{resize, FrameFilter};
use crate::params::FilterParams;
use anyhow::Result;
use image::RgbImage;

/// Identity filter. Still exercises the working-resolution round trip so it
/// serves as a latency baseline and as the registry fallback.
pub struct Passthrough;

impl FrameFilter for Passthrough {
    fn name(&self) -> &'static str {
        "none"
    }

    fn apply(&self, frame: &RgbImage, params: &FilterParams) -> Result<RgbImage> {
        let small = resize::shrink(frame, params.scale())?;
        if small.dimensions() != frame.dimensions() {
            return resize::restore(&small, frame.dimensions());
        }
        Ok(small)
    }
}
