use crate::math::prelude::Vector2;

/// The enumerations of window events the renderer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The window has been asked to close.
    Closed,
    /// The size of the framebuffer has changed.
    Resized(Vector2<u32>),
    /// The window gained focus of user input.
    GainFocus,
    /// The window lost focus of user input.
    LostFocus,
}
