mod font;
mod window;

pub use window::WindowDisplay;

use anyhow::Result;
use image::RgbImage;

/// Discrete control events produced by the display's input surface.
///
/// Deltas carry the adjustment direction; the parameter state clamps them
/// into range.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Quit,
    SelectFilter(&'static str),
    AdjustScale(f32),
    AdjustBlockSize(i32),
    AdjustPaletteLevels(i32),
    AdjustEdgeStrength(i32),
    AdjustColorLevels(i32),
}

/// Trait for display sinks
pub trait DisplaySink {
    /// Render a filtered frame with HUD lines drawn at fixed positions.
    fn present(&mut self, frame: &RgbImage, hud: &[String]) -> Result<()>;

    /// Drain the discrete control events received since the last call.
    fn poll_controls(&mut self) -> Vec<ControlEvent>;

    /// False once the surface has been closed by the user.
    fn is_open(&self) -> bool {
        true
    }
}
