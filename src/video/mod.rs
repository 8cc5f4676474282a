//! The core of the renderer: shader programs, geometry bindings, textures and the
//! per-frame draw sequencing that ties them together.
//!
//! Every GPU object is owned by a plain value (`ShaderProgram`, `GeometryBinding`,
//! `Texture`) that records the opaque id handed out by the backend `Visitor`. Those values
//! never talk to OpenGL directly, which keeps the lifecycle rules in one place and lets
//! the headless backend stand in for a real device.
//!
//! All the GPU state (current program, current vertex array, texture units) is a single
//! global slot on the context. Operations always re-bind what they need right before they
//! use it instead of assuming an earlier binding survived.

pub mod errors;

pub mod backends;
pub mod frame;
pub mod geometry;
pub mod shader;
pub mod texture;

/// Maximum number of attributes in a vertex layout.
pub const MAX_VERTEX_ATTRIBUTES: usize = 16;
/// Maximum number of texture units a single draw call could bind.
pub const MAX_TEXTURE_UNITS: usize = 16;

pub mod prelude {
    pub use super::backends::headless::HeadlessVisitor;
    pub use super::backends::Visitor;
    pub use super::frame::{ClearParams, DrawCall, Frame, FrameDriver, FrameStats};
    pub use super::geometry::{
        AttributeDescriptor, BufferHint, DrawMode, GeometryBinding, GeometryParams, Primitive,
        VertexFormat, VertexLayout, VertexLayoutBuilder,
    };
    pub use super::shader::{
        ProgramState, ShaderProgram, ShaderSources, ShaderStage, StageKind, UniformLocation,
        UniformVariable,
    };
    pub use super::texture::{
        ImageData, Texture, TextureFilter, TextureFormat, TextureParams, TextureWrap,
    };
}
