use super::font::draw_text;
use super::{ControlEvent, DisplaySink};
use anyhow::{anyhow, Result};
use image::RgbImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::time::Duration;

const HUD_COLOR: u32 = 0x00FF_FFFF;
const HUD_X: usize = 8;
const HUD_Y: usize = 8;
const HUD_LINE_HEIGHT: usize = 10;

/// Window sink: presents filtered frames and polls the keyboard for the
/// discrete control events.
pub struct WindowDisplay {
    window: Window,
    buffer: Vec<u32>,
}

impl WindowDisplay {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        tracing::info!("Opening display window at {}x{}", width, height);

        let mut window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("Failed to create display window: {}", e))?;

        // Doubles as the small per-iteration input poll timeout: update
        // blocks briefly instead of spinning.
        window.limit_update_rate(Some(Duration::from_millis(4)));

        Ok(Self {
            window,
            buffer: Vec::new(),
        })
    }
}

impl DisplaySink for WindowDisplay {
    fn present(&mut self, frame: &RgbImage, hud: &[String]) -> Result<()> {
        let (width, height) = frame.dimensions();
        let (width, height) = (width as usize, height as usize);

        // Pack RGB bytes into the window's 0RGB words.
        self.buffer.resize(width * height, 0);
        for (dst, px) in self.buffer.iter_mut().zip(frame.pixels()) {
            *dst = (px.0[0] as u32) << 16 | (px.0[1] as u32) << 8 | px.0[2] as u32;
        }

        for (line_no, line) in hud.iter().enumerate() {
            let y = HUD_Y + line_no * HUD_LINE_HEIGHT;
            draw_text(&mut self.buffer, width, height, HUD_X, y, line, HUD_COLOR);
        }

        self.window
            .update_with_buffer(&self.buffer, width, height)
            .map_err(|e| anyhow!("Failed to present frame: {}", e))
    }

    fn poll_controls(&mut self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() || self.window.is_key_pressed(Key::Escape, KeyRepeat::No) {
            events.push(ControlEvent::Quit);
            return events;
        }

        let bindings: [(Key, ControlEvent); 13] = [
            (Key::Key1, ControlEvent::SelectFilter("none")),
            (Key::Key2, ControlEvent::SelectFilter("pixelate")),
            (Key::Key3, ControlEvent::SelectFilter("toon")),
            (Key::Equal, ControlEvent::AdjustScale(0.05)),
            (Key::Minus, ControlEvent::AdjustScale(-0.05)),
            (Key::LeftBracket, ControlEvent::AdjustBlockSize(-1)),
            (Key::RightBracket, ControlEvent::AdjustBlockSize(1)),
            (Key::Semicolon, ControlEvent::AdjustPaletteLevels(-1)),
            (Key::Apostrophe, ControlEvent::AdjustPaletteLevels(1)),
            (Key::Comma, ControlEvent::AdjustEdgeStrength(-5)),
            (Key::Period, ControlEvent::AdjustEdgeStrength(5)),
            (Key::K, ControlEvent::AdjustColorLevels(-1)),
            (Key::L, ControlEvent::AdjustColorLevels(1)),
        ];

        for (key, event) in bindings {
            // One event per press; holding a key does not accumulate.
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                events.push(event);
            }
        }
        events
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }
}
