mod screen;

pub use screen::ScreenCapture;

use anyhow::Result;
use image::RgbImage;

/// Trait for screen frame sources
pub trait FrameSource {
    /// Non-blocking poll for the most recent frame. `None` means nothing
    /// new is ready yet; callers should pause briefly and retry.
    fn poll_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);

    /// Release the underlying capture device.
    fn stop(&mut self) {}
}
