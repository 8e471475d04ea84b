//! The window host: the event loop that drives a [`Lifecycle`].

use std::time::{Duration, Instant};

use sdl2::event::{Event, WindowEvent};

use crate::{abs::App, error::Error};

/// Callbacks invoked by [`run`], always from the thread that owns the GL context.
///
/// Order: `on_load` once, then any interleaving of `on_resize` and `on_render`, then `on_unload`
/// once.
pub trait Lifecycle {
    /// Creates GPU resources. An error aborts the run before any frame is drawn.
    fn on_load(&mut self) -> Result<(), Error>;

    /// The drawable area changed to `width` x `height` pixels.
    fn on_resize(&mut self, width: u32, height: u32);

    /// Draws one frame. `elapsed` is the time since the previous frame started.
    fn on_render(&mut self, elapsed: Duration);

    /// Releases GPU resources.
    fn on_unload(&mut self);
}

/// Spaces frames out to a target frequency.
#[derive(Debug)]
pub struct FramePacer {
    period: Option<Duration>,
    last_frame: Instant,
}

impl FramePacer {
    /// A `frequency` of `0` disables pacing.
    pub fn new(frequency: u32, now: Instant) -> Self {
        Self {
            period: (frequency > 0).then(|| Duration::from_secs_f64(1.0 / frequency as f64)),
            last_frame: now,
        }
    }

    /// Marks the start of a frame and returns the time since the previous one.
    pub fn begin_frame(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        elapsed
    }

    /// How long to wait before the next frame may start.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.period {
            Some(period) => period.saturating_sub(now.saturating_duration_since(self.last_frame)),
            None => Duration::ZERO,
        }
    }
}

/// Pixel size to hand to [`Lifecycle::on_resize`] for `event`, if it resized the window.
///
/// `SizeChanged` carries window coordinates; `drawable` is the drawable size in pixels, which is
/// what the viewport needs. Every resize therefore reports pixels.
pub fn resized_to(event: &Event, drawable: (u32, u32)) -> Option<(u32, u32)> {
    match event {
        Event::Window {
            win_event: WindowEvent::SizeChanged(..),
            ..
        } => Some(drawable),
        _ => None,
    }
}

/// Runs `target` until the window is closed.
pub fn run<L: Lifecycle>(app: &mut App, target: &mut L, render_frequency: u32) -> Result<(), Error> {
    target.on_load()?;

    let (width, height) = app.drawable_size();
    target.on_resize(width, height);

    let mut pacer = FramePacer::new(render_frequency, Instant::now());

    'running: loop {
        for event in app.event_pump.poll_iter() {
            if let Event::Quit { .. } = event {
                break 'running;
            }
            if let Some((width, height)) = resized_to(&event, app.window.drawable_size()) {
                target.on_resize(width, height);
            }
        }

        let elapsed = pacer.begin_frame(Instant::now());
        target.on_render(elapsed);
        app.swap();

        let wait = pacer.remaining(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }

    target.on_unload();
    Ok(())
}
