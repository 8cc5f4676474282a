//! The OpenGL backend. The function pointers must have been loaded into the current
//! context (see `window`) before `GLVisitor::new` is called.

pub mod capabilities;
pub mod types;
pub mod visitor;
