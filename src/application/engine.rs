use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::video::backends::{self, Visitor};
use crate::video::frame::{ClearParams, Frame};
use crate::window::events::Event;
use crate::window::Window;

use super::settings::{EngineParams, Settings};
use super::Application;

/// `Engine` is the root object of the application. It owns the window and the video
/// backend bound to its context, and drives the main loop.
pub struct Engine {
    // Declared before `window`, so the backend goes away while the context still exists.
    video: Box<dyn Visitor>,
    window: Window,
    params: EngineParams,
    frames: u64,
    shutdown: bool,
}

impl Engine {
    /// Setup engine with specified settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let window = if settings.headless {
            Window::headless(&settings.window)
        } else {
            Window::new(&settings.window)?
        };

        let dimensions = window.dimensions();
        let mut video = if settings.headless {
            backends::new_headless(dimensions)
        } else {
            backends::new()?
        };

        unsafe {
            video.set_viewport(dimensions)?;
        }

        info!(
            "Engine is ready with a {}x{} {}window.",
            dimensions.x,
            dimensions.y,
            if settings.headless { "headless " } else { "" }
        );

        Ok(Engine {
            video,
            window,
            params: settings.engine,
            frames: 0,
            shutdown: false,
        })
    }

    /// Run the main loop of `Engine`, this will block the working thread until the window
    /// closes, `shutdown` is called or the frame limit is reached.
    ///
    /// `Application::on_exit` is called whenever `on_setup` succeeded, even if a frame
    /// failed. The first error is returned.
    pub fn run<T: Application>(mut self) -> Result<()> {
        let mut application = T::on_setup(&mut self)?;

        let result = self.main_loop(&mut application);
        let exit = application.on_exit(&mut self);

        info!("Engine stopped after {} frames.", self.frames);
        result.and(exit)
    }

    fn main_loop<T: Application>(&mut self, application: &mut T) -> Result<()> {
        while self.is_alive() {
            application.on_update(self)?;
            self.window.swap_buffers()?;
            self.frames += 1;

            for v in self.window.poll_events() {
                if let Event::Resized(dimensions) = v {
                    debug!("Resized to {}x{}.", dimensions.x, dimensions.y);
                    unsafe {
                        self.video.set_viewport(dimensions)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn is_alive(&self) -> bool {
        if self.shutdown || self.window.should_close() {
            return false;
        }

        match self.params.max_frames {
            Some(max) => self.frames < max,
            None => true,
        }
    }

    /// Returns the video backend bound to the context of the window.
    #[inline]
    pub fn video(&mut self) -> &mut dyn Visitor {
        self.video.as_mut()
    }

    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    #[inline]
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Number of frames finished so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds elapsed since the window was created.
    #[inline]
    pub fn time(&self) -> f64 {
        self.window.time()
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.window.dimensions()
    }

    /// Stops the main loop at the end of this frame.
    #[inline]
    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }

    /// What every frame clears, according to the engine parameters.
    pub fn clear_params(&self) -> ClearParams {
        ClearParams {
            color: Some(self.params.clear_color),
            depth: if self.params.depth_test {
                Some(1.0)
            } else {
                None
            },
        }
    }

    /// Starts an empty frame that clears and depth tests according to the engine
    /// parameters.
    pub fn frame<'a>(&self) -> Frame<'a> {
        Frame::new(self.clear_params()).with_depth_test(self.params.depth_test)
    }
}
