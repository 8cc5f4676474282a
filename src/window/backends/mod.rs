mod glutin;
mod headless;

use crate::math::prelude::Vector2;

use super::errors::*;
use super::events::Event;
use super::WindowParams;

pub trait Visitor {
    fn show(&self);
    fn hide(&self);
    fn dimensions(&self) -> Vector2<u32>;
    fn resize(&self, dimensions: Vector2<u32>);
    fn poll_events(&mut self, events: &mut Vec<Event>);
    fn is_current(&self) -> bool;
    fn swap_buffers(&self) -> Result<()>;
}

/// Creates a native window with an OpenGL context, makes the context current and loads
/// the OpenGL functions from it.
pub fn new(params: &WindowParams) -> Result<Box<dyn Visitor>> {
    let visitor = self::glutin::GlutinVisitor::new(params)?;
    Ok(Box::new(visitor))
}

pub fn new_headless(params: &WindowParams) -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new(params.size))
}
