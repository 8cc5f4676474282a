//! A reusable application skeleton.
//!
//! ## Application
//!
//! Every demo follows the same shape: create a window, create shader programs and
//! geometry, loop until the window closes, destroy everything. The `Application` trait
//! captures the three varying parts as callbacks, and `Engine` owns everything else.
//!
//! ## Engine
//!
//! `Engine` is where we actually run the main loop and fire the `Application` instance.
//! It binds the window and the video backend in a central place.

pub mod settings;
pub use self::settings::{EngineParams, Settings};

mod engine;
pub use self::engine::Engine;

use crate::errors::*;

/// `Application` is a user-friendly facade to building application, which defines a number
/// of event functions that get executed in a pre-determined order.
pub trait Application: Sized {
    /// `Application::on_setup` is called once, after the context has been created. GPU
    /// resources are usually created here.
    fn on_setup(engine: &mut Engine) -> Result<Self>;

    /// `Application::on_update` is called every frame. Its the main workhorse
    /// function for frame updates.
    fn on_update(&mut self, engine: &mut Engine) -> Result<()>;

    /// `Application::on_exit` is called once when the main loop stops, while the context
    /// is still alive. GPU resources should be released here.
    fn on_exit(&mut self, _: &mut Engine) -> Result<()> {
        Ok(())
    }
}
