//! # What is This?
//!
//! Lantern is a small rendering layer that sits directly on top of OpenGL. It takes care
//! of the parts every little renderer ends up rewriting: compiling, linking and validating
//! shader programs, describing interleaved vertex records to the GPU, uploading textures and
//! sequencing draw calls frame after frame.
//!
//! ## Shader Programs
//!
//! A `ShaderProgram` goes through a strict lifecycle: stages are compiled one by one,
//! attached, and linked into an executable program. Compile and link failures carry the
//! driver's diagnostic text verbatim. Stages are released as soon as the link status is
//! known, and uniform locations are resolved lazily and cached.
//!
//! ## Geometry
//!
//! A `GeometryBinding` owns a vertex buffer, an optional index buffer and a validated
//! `VertexLayout` that maps an interleaved vertex record onto attribute slots. Layout
//! arithmetic is checked before any GPU object is allocated.
//!
//! ## Backends
//!
//! All GPU work goes through a `Visitor`. The OpenGL visitor talks to a real context created
//! by the window system, while the headless visitor keeps everything in memory, counts
//! every resource it hands out and rasterizes triangles in software, which makes the whole
//! pipeline testable without a display.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

#[macro_use]
pub mod errors;

pub mod application;
pub mod math;
pub mod video;
pub mod window;

pub mod prelude {
    pub use crate::application::{Application, Engine, EngineParams, Settings};
    pub use crate::math::prelude::*;
    pub use crate::video::prelude::*;
    pub use crate::window::prelude::*;
}
