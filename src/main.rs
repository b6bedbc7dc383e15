mod capture;
mod display;
mod filters;
mod metrics;
mod params;

use anyhow::{Context, Result};
use capture::{FrameSource, ScreenCapture};
use clap::Parser;
use display::{ControlEvent, DisplaySink, WindowDisplay};
use filters::FilterRegistry;
use metrics::FpsCounter;
use params::FilterParams;
use std::thread;
use std::time::{Duration, Instant};

const WINDOW_TITLE: &str =
    "screentoon (ESC quit | 1 none 2 pixelate 3 toon | =/- scale | [ ] block | ; ' palette | , . edge | k l colors)";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Display (monitor) index to capture
    #[arg(short, long, default_value_t = 0)]
    monitor: usize,

    /// Target capture rate in frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Working-resolution scale used while filtering
    #[arg(long, default_value_t = 0.6)]
    scale: f32,

    /// Initial filter (none, pixelate, toon)
    #[arg(long, default_value = "toon")]
    filter: String,

    /// Pixelation block size in working-resolution pixels
    #[arg(long, default_value_t = 4)]
    block_size: u32,

    /// Per-channel palette levels for the pixelate filter
    #[arg(long, default_value_t = 10)]
    palette_levels: u32,

    /// Toon low edge threshold (the high threshold is twice this)
    #[arg(long, default_value_t = 80)]
    edge_strength: u8,

    /// Per-channel color levels for the toon filter
    #[arg(long, default_value_t = 8)]
    color_levels: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("screentoon starting");
    tracing::info!("Monitor: {}", args.monitor);
    tracing::info!("Target FPS: {}", args.fps);
    tracing::info!("Initial filter: {}", args.filter);

    // Initialize capture; an unavailable display is fatal before the loop.
    let mut capture =
        ScreenCapture::new(args.monitor).context("Failed to initialize screen capture")?;
    let (width, height) = capture.resolution();

    // Initialize display
    let mut display =
        WindowDisplay::new(WINDOW_TITLE, width, height).context("Failed to create display window")?;

    let registry = FilterRegistry::with_builtins();
    let mut params = FilterParams::new(
        &args.filter,
        args.scale,
        args.block_size,
        args.palette_levels,
        args.edge_strength,
        args.color_levels,
    );

    // Main loop
    let result = run_pipeline(&mut capture, &mut display, &registry, &mut params, args.fps);

    // Release the capture device on every exit path; the window is dropped
    // right after.
    capture.stop();
    result
}

fn run_pipeline<C, D>(
    capture: &mut C,
    display: &mut D,
    registry: &FilterRegistry,
    params: &mut FilterParams,
    target_fps: u32,
) -> Result<()>
where
    C: FrameSource,
    D: DisplaySink,
{
    let frame_duration = Duration::from_secs_f32(1.0 / target_fps.max(1) as f32);
    let idle_pause = Duration::from_millis(1);
    let mut fps = FpsCounter::new(Duration::from_secs(1));
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_filter_time = Duration::ZERO;
    let mut total_render_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop");

    'frames: while display.is_open() {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let frame = capture.poll_frame().context("Failed to poll frame source")?;
        total_capture_time += capture_start.elapsed();
        let Some(frame) = frame else {
            // Nothing ready yet; a short cooperative pause instead of a
            // busy spin.
            thread::sleep(idle_pause);
            continue;
        };

        // Stylize
        let filter = registry.resolve(params.filter_id());
        let filter_start = Instant::now();
        let styled = filter
            .apply(&frame, params)
            .context("Failed to apply filter")?;
        total_filter_time += filter_start.elapsed();

        // HUD
        fps.tick();
        let mut hud = vec![format!(
            "filter={}  scale={:.2}  fps={:.1}",
            filter.name(),
            params.scale(),
            fps.fps()
        )];
        if let Some(line) = filter.hud_line(params) {
            hud.push(line);
        }

        // Render
        let render_start = Instant::now();
        display
            .present(&styled, &hud)
            .context("Failed to present frame")?;
        total_render_time += render_start.elapsed();

        frame_count += 1;

        // Log stats every 120 frames
        if frame_count % 120 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_filter_ms = total_filter_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_render_ms = total_render_time.as_secs_f64() * 1000.0 / frame_count as f64;
            tracing::info!(
                "Frame {}: capture={:.1}ms, filter={:.1}ms, render={:.1}ms, fps={:.1}",
                frame_count,
                avg_capture_ms,
                avg_filter_ms,
                avg_render_ms,
                fps.fps()
            );
        }

        // Parameter mutation happens strictly between render and the next
        // capture, so no filter invocation ever observes a change mid-frame.
        for event in display.poll_controls() {
            match event {
                ControlEvent::Quit => break 'frames,
                ControlEvent::SelectFilter(id) => params.select_filter(id),
                ControlEvent::AdjustScale(delta) => params.adjust_scale(delta),
                ControlEvent::AdjustBlockSize(delta) => params.adjust_block_size(delta),
                ControlEvent::AdjustPaletteLevels(delta) => params.adjust_palette_levels(delta),
                ControlEvent::AdjustEdgeStrength(delta) => params.adjust_edge_strength(delta),
                ControlEvent::AdjustColorLevels(delta) => params.adjust_color_levels(delta),
            }
        }

        // Frame rate limiting
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    tracing::info!("Pipeline loop finished after {} frames", frame_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    struct FakeSource {
        width: u32,
        height: u32,
        polls: u32,
        stopped: bool,
    }

    impl FrameSource for FakeSource {
        fn poll_frame(&mut self) -> Result<Option<RgbImage>> {
            self.polls += 1;
            // Every other poll has no frame ready, exercising the idle path.
            if self.polls % 2 == 0 {
                return Ok(None);
            }
            Ok(Some(RgbImage::from_pixel(
                self.width,
                self.height,
                Rgb([200, 200, 200]),
            )))
        }

        fn resolution(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    struct FakeSink {
        presented: Vec<(u32, u32)>,
        hud_lines: Vec<usize>,
        quit_after: usize,
    }

    impl DisplaySink for FakeSink {
        fn present(&mut self, frame: &RgbImage, hud: &[String]) -> Result<()> {
            self.presented.push(frame.dimensions());
            self.hud_lines.push(hud.len());
            Ok(())
        }

        fn poll_controls(&mut self) -> Vec<ControlEvent> {
            match self.presented.len() {
                1 => vec![
                    ControlEvent::SelectFilter("pixelate"),
                    ControlEvent::AdjustScale(0.05),
                ],
                n if n >= self.quit_after => vec![ControlEvent::Quit],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn driver_presents_frames_and_applies_events_between_iterations() {
        let mut source = FakeSource {
            width: 64,
            height: 48,
            polls: 0,
            stopped: false,
        };
        let mut sink = FakeSink {
            presented: Vec::new(),
            hud_lines: Vec::new(),
            quit_after: 3,
        };
        let registry = FilterRegistry::with_builtins();
        let mut params = FilterParams::default();

        run_pipeline(&mut source, &mut sink, &registry, &mut params, 1000).unwrap();
        source.stop();

        assert_eq!(sink.presented.len(), 3);
        assert!(sink.presented.iter().all(|&dims| dims == (64, 48)));
        // First frame ran the default toon filter (two HUD lines); later
        // frames ran the newly selected pixelate filter.
        assert_eq!(sink.hud_lines[0], 2);
        assert_eq!(params.filter_id(), "pixelate");
        assert!((params.scale() - 0.65).abs() < 1e-6);
        assert!(source.stopped);
    }

    #[test]
    fn driver_survives_an_unknown_filter_selection() {
        struct BogusSink {
            presented: usize,
        }
        impl DisplaySink for BogusSink {
            fn present(&mut self, _frame: &RgbImage, _hud: &[String]) -> Result<()> {
                self.presented += 1;
                Ok(())
            }
            fn poll_controls(&mut self) -> Vec<ControlEvent> {
                if self.presented == 1 {
                    vec![ControlEvent::SelectFilter("bogus")]
                } else {
                    vec![ControlEvent::Quit]
                }
            }
        }

        let mut source = FakeSource {
            width: 16,
            height: 16,
            polls: 0,
            stopped: false,
        };
        let mut sink = BogusSink { presented: 0 };
        let registry = FilterRegistry::with_builtins();
        let mut params = FilterParams::default();

        run_pipeline(&mut source, &mut sink, &registry, &mut params, 1000).unwrap();
        assert!(sink.presented >= 2);
        assert_eq!(params.filter_id(), "bogus");
    }
}
