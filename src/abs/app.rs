//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use crate::{
    abs::debug::{self, DebugSink},
    error::Error,
    settings::WindowSettings,
};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
    debug_sink: Option<Arc<DebugSink>>,
}

impl App {
    /// Opens a window with a core-profile context of the configured version.
    ///
    /// With `debug_output` set the context is created with the debug flag and driver messages
    /// are routed to the log.
    pub fn new(settings: &WindowSettings, debug_output: bool) -> Result<Self, Error> {
        let sdl = sdl2::init().map_err(Error::Window)?;
        let video_subsystem = sdl.video().map_err(Error::Window)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        let (major, minor) = settings.gl_version;
        gl_attr.set_context_version(major, minor);
        gl_attr.set_depth_size(24);
        gl_attr.set_double_buffer(true);
        if debug_output {
            gl_attr.set_context_flags().debug().set();
        }

        let mut window = video_subsystem
            .window(&settings.title, settings.width, settings.height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| Error::Window(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(Error::Window)?;
        window.gl_make_current(&gl_context).map_err(Error::Window)?;
        window.raise();

        let interval = if settings.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("could not set swap interval: {e}");
        }

        let mut gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };

        let debug_sink = if debug_output {
            let sink = Arc::new(DebugSink::default());
            debug::install(&mut gl, Arc::clone(&sink)).then_some(sink)
        } else {
            None
        };

        let event_pump = sdl.event_pump().map_err(Error::Window)?;
        let gl = Arc::new(gl);

        log::info!(
            "opened {}x{} window with OpenGL {}.{} core",
            settings.width,
            settings.height,
            major,
            minor
        );

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
            debug_sink,
        })
    }

    /// Size of the drawable area in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Presents the back buffer.
    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    /// Debug sink receiving driver messages, if debug output is active.
    pub fn debug_sink(&self) -> Option<&Arc<DebugSink>> {
        self.debug_sink.as_ref()
    }
}
