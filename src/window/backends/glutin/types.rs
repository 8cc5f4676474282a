use glutin::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::math::prelude::Vector2;

use super::super::super::events::Event;

pub fn from_window_event(source: &WindowEvent, close_on_escape: bool) -> Option<Event> {
    match *source {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(Event::Closed),

        WindowEvent::Focused(v) => {
            if v {
                Some(Event::GainFocus)
            } else {
                Some(Event::LostFocus)
            }
        }

        WindowEvent::Resized(size) => Some(Event::Resized(Vector2::new(size.width, size.height))),

        WindowEvent::ScaleFactorChanged {
            ref new_inner_size, ..
        } => Some(Event::Resized(Vector2::new(
            new_inner_size.width,
            new_inner_size.height,
        ))),

        WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state: ElementState::Released,
                    virtual_keycode: Some(VirtualKeyCode::Escape),
                    ..
                },
            ..
        } if close_on_escape => Some(Event::Closed),

        _ => None,
    }
}
