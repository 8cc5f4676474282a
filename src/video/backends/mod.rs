//! The backend of renderer, which should be responsible for only one thing:
//! talking to the GPU with low-level OpenGL-like operations.
//!
//! Objects are identified by the opaque ids the backend hands out. A backend never
//! validates lifecycles; that is the job of `ShaderProgram`, `GeometryBinding` and
//! `Texture`, which call into it in the right order.

pub mod headless;

use crate::math::prelude::{Color, Vector2};

use super::errors::*;
use super::geometry::{BufferHint, Primitive, VertexLayout};
use super::shader::{StageKind, UniformVariable};
use super::texture::{ImageData, TextureParams};

pub type StageId = u32;
pub type ProgramId = u32;
pub type BufferId = u32;
pub type VertexArrayId = u32;
pub type TextureId = u32;

/// The binding point of a buffer object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferTarget {
    Vertex,
    Index,
}

pub trait Visitor {
    unsafe fn create_stage(&mut self, kind: StageKind) -> Result<StageId>;

    /// Compiles the stage and returns its compile status.
    unsafe fn compile_stage(&mut self, id: StageId, source: &str) -> Result<bool>;

    unsafe fn stage_info_log(&mut self, id: StageId) -> Result<String>;

    unsafe fn delete_stage(&mut self, id: StageId) -> Result<()>;

    unsafe fn create_program(&mut self) -> Result<ProgramId>;

    unsafe fn attach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()>;

    unsafe fn detach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()>;

    /// Links the program and returns its link status.
    unsafe fn link_program(&mut self, program: ProgramId) -> Result<bool>;

    unsafe fn program_info_log(&mut self, program: ProgramId) -> Result<String>;

    unsafe fn delete_program(&mut self, program: ProgramId) -> Result<()>;

    /// Returns `None` if the uniform is not an active uniform of the program.
    unsafe fn uniform_location(&mut self, program: ProgramId, name: &str) -> Result<Option<i32>>;

    /// Returns `None` if the attribute is not an active attribute of the program.
    unsafe fn attribute_location(&mut self, program: ProgramId, name: &str)
        -> Result<Option<u32>>;

    /// Makes the program current. Does nothing if it is already the current one.
    unsafe fn use_program(&mut self, program: ProgramId) -> Result<()>;

    /// Sets a uniform variable of the current program.
    unsafe fn set_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()>;

    unsafe fn create_buffer(
        &mut self,
        target: BufferTarget,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<BufferId>;

    unsafe fn update_buffer(
        &mut self,
        target: BufferTarget,
        id: BufferId,
        offset: usize,
        data: &[u8],
    ) -> Result<()>;

    unsafe fn delete_buffer(&mut self, id: BufferId) -> Result<()>;

    /// Creates a vertex array that records `layout` against `vbo` (and `ibo`). The
    /// vertex array that was current before this call is current again afterwards.
    unsafe fn create_vertex_array(
        &mut self,
        vbo: BufferId,
        ibo: Option<BufferId>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayId>;

    unsafe fn bind_vertex_array(&mut self, id: VertexArrayId) -> Result<()>;

    unsafe fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<()>;

    /// Creates a 2D texture from decoded pixels. The texture bindings that were current
    /// before this call are current again afterwards.
    unsafe fn create_texture(&mut self, params: TextureParams, image: &ImageData)
        -> Result<TextureId>;

    unsafe fn bind_texture(&mut self, unit: usize, id: TextureId) -> Result<()>;

    unsafe fn delete_texture(&mut self, id: TextureId) -> Result<()>;

    /// Draws `count` sequential vertices starting at `first`.
    unsafe fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()>;

    /// Draws `count` 32-bit indices of the current index buffer, starting at the byte
    /// `offset`.
    unsafe fn draw_elements(&mut self, primitive: Primitive, count: u32, offset: usize)
        -> Result<()>;

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()>;

    unsafe fn set_depth_test(&mut self, enable: bool) -> Result<()>;

    unsafe fn set_viewport(&mut self, dimensions: Vector2<u32>) -> Result<()>;

    /// Blocks until all execution is complete. Such effects include all changes to render state, all
    /// changes to connection state, and all changes to the frame buffer contents.
    unsafe fn flush(&mut self) -> Result<()>;
}

pub mod gl;

/// Creates the OpenGL backend. The functions must have been loaded into the current
/// context by the window system beforehand.
pub fn new() -> Result<Box<dyn Visitor>> {
    let visitor = unsafe { self::gl::visitor::GLVisitor::new()? };
    Ok(Box::new(visitor))
}

pub fn new_headless(dimensions: Vector2<u32>) -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::with_dimensions(dimensions))
}
