use super::FrameSource;
use anyhow::{Context, Result};
use image::RgbImage;
use scrap::{Capturer, Display};
use std::io::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureSetupError {
    #[error("no display with index {requested} ({available} available)")]
    DisplayNotFound { requested: usize, available: usize },
}

/// Screen grabber built on `scrap`.
///
/// `frame()` on the capturer is non-blocking and reports `WouldBlock` while
/// the compositor has nothing new, which maps directly onto the source
/// contract's "no frame ready".
pub struct ScreenCapture {
    capturer: Option<Capturer>,
    width: u32,
    height: u32,
}

impl ScreenCapture {
    pub fn new(display_index: usize) -> Result<Self> {
        tracing::info!("Initializing capture for display {}", display_index);

        let mut displays = Display::all().context("Failed to enumerate displays")?;
        let available = displays.len();
        if display_index >= available {
            return Err(CaptureSetupError::DisplayNotFound {
                requested: display_index,
                available,
            }
            .into());
        }
        let display = displays.remove(display_index);

        let capturer = Capturer::new(display).context("Failed to start screen capture")?;
        let width = capturer.width() as u32;
        let height = capturer.height() as u32;

        tracing::info!("Screen capture initialized at {}x{}", width, height);

        Ok(Self {
            capturer: Some(capturer),
            width,
            height,
        })
    }
}

impl FrameSource for ScreenCapture {
    fn poll_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(capturer) = self.capturer.as_mut() else {
            return Ok(None);
        };

        match capturer.frame() {
            Ok(frame) => Ok(Some(bgra_to_rgb(&frame, self.width, self.height))),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e).context("Failed to capture frame"),
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stop(&mut self) {
        if self.capturer.take().is_some() {
            tracing::info!("Screen capture stopped");
        }
    }
}

/// Normalize a raw BGRA capture buffer to the pipeline's 3-channel frame.
///
/// Capture rows can be padded, so the stride is derived from the buffer
/// length rather than assumed to be `width * 4`.
fn bgra_to_rgb(data: &[u8], width: u32, height: u32) -> RgbImage {
    let stride = data.len() / height as usize;
    RgbImage::from_fn(width, height, |x, y| {
        let i = y as usize * stride + x as usize * 4;
        image::Rgb([data[i + 2], data[i + 1], data[i]])
    })
}
