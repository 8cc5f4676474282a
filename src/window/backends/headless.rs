use std::cell::Cell;

use crate::math::prelude::Vector2;

use super::super::errors::*;
use super::super::events::Event;
use super::Visitor;

/// A window without a surface. It never produces events on its own.
pub struct HeadlessVisitor {
    dimensions: Cell<Vector2<u32>>,
}

impl HeadlessVisitor {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        HeadlessVisitor {
            dimensions: Cell::new(dimensions),
        }
    }
}

impl Visitor for HeadlessVisitor {
    #[inline]
    fn show(&self) {}

    #[inline]
    fn hide(&self) {}

    #[inline]
    fn dimensions(&self) -> Vector2<u32> {
        self.dimensions.get()
    }

    #[inline]
    fn resize(&self, dimensions: Vector2<u32>) {
        self.dimensions.set(dimensions);
    }

    #[inline]
    fn poll_events(&mut self, _: &mut Vec<Event>) {}

    #[inline]
    fn is_current(&self) -> bool {
        true
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        Ok(())
    }
}
