//! Represents an OpenGL context and the window or environment around it.
//!
//! The renderer only needs a drawable context, a close signal, a way to present frames and a
//! clock. `Window` provides exactly that on top of a native window (`glutin`) or, for tests
//! and batch runs, on top of a headless stand-in.

pub mod errors;
pub mod events;

mod backends;

pub mod prelude {
    pub use super::events::Event;
    pub use super::{Window, WindowParams};
}

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector2;

use self::backends::Visitor;
use self::errors::*;
use self::events::Event;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
    /// Releasing the escape key closes the window.
    pub close_on_escape: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "Window".to_owned(),
            size: Vector2::new(800, 600),
            multisample: 0,
            vsync: true,
            close_on_escape: true,
        }
    }
}

pub struct Window {
    visitor: Box<dyn Visitor>,
    events: Vec<Event>,
    closed: bool,
    headless: bool,
    timestamp: Instant,
}

impl Window {
    /// Creates a native window and makes its OpenGL context current on this thread.
    pub fn new(params: &WindowParams) -> Result<Self> {
        let visitor = backends::new(params)?;
        Ok(Window::from_visitor(visitor, false))
    }

    /// Creates a window that has no surface at all.
    pub fn headless(params: &WindowParams) -> Self {
        Window::from_visitor(backends::new_headless(params), true)
    }

    fn from_visitor(visitor: Box<dyn Visitor>, headless: bool) -> Self {
        Window {
            visitor,
            events: Vec::new(),
            closed: false,
            headless,
            timestamp: Instant::now(),
        }
    }

    #[inline]
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Returns true once the window has been asked to close.
    #[inline]
    pub fn should_close(&self) -> bool {
        self.closed
    }

    /// Requests the window to close.
    #[inline]
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Queues an event that the next `poll_events` delivers.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Processes the pending events of the window and returns them.
    pub fn poll_events(&mut self) -> Vec<Event> {
        let mut events = ::std::mem::replace(&mut self.events, Vec::new());
        self.visitor.poll_events(&mut events);

        for v in &events {
            match *v {
                Event::Closed => self.closed = true,
                Event::Resized(dimensions) => self.visitor.resize(dimensions),
                _ => {}
            }
        }

        events
    }

    /// Swaps the buffers in case of double or triple buffering.
    #[inline]
    pub fn swap_buffers(&self) -> Result<()> {
        self.visitor.swap_buffers()
    }

    /// Seconds elapsed since the window was created.
    #[inline]
    pub fn time(&self) -> f64 {
        let duration = self.timestamp.elapsed();
        duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) * 1e-9
    }

    /// Returns the size in pixels of the framebuffer.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.visitor.dimensions()
    }

    #[inline]
    pub fn show(&self) {
        self.visitor.show();
    }

    #[inline]
    pub fn hide(&self) {
        self.visitor.hide();
    }

    /// Returns true if the context of this window is the current one in this thread.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.visitor.is_current()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn headless() {
        let params = WindowParams::default();
        let mut window = Window::headless(&params);
        assert_eq!(window.dimensions(), Vector2::new(800, 600));
        assert!(window.poll_events().is_empty());
        assert!(!window.should_close());

        window.push_event(Event::Resized(Vector2::new(320, 240)));
        assert_eq!(window.poll_events().len(), 1);
        assert_eq!(window.dimensions(), Vector2::new(320, 240));

        window.push_event(Event::Closed);
        window.poll_events();
        assert!(window.should_close());
        assert!(window.time() >= 0.0);
    }
}
