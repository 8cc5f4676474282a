use gl;
use gl::types::*;

use super::super::super::geometry::{BufferHint, Primitive, VertexFormat};
use super::super::super::shader::StageKind;
use super::super::super::texture::{TextureFilter, TextureFormat, TextureWrap};
use super::capabilities::{Capabilities, Version};

impl From<StageKind> for GLenum {
    fn from(kind: StageKind) -> Self {
        match kind {
            StageKind::Vertex => gl::VERTEX_SHADER,
            StageKind::Geometry => gl::GEOMETRY_SHADER,
            StageKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl From<BufferHint> for GLenum {
    fn from(hint: BufferHint) -> Self {
        match hint {
            BufferHint::Immutable => gl::STATIC_DRAW,
            BufferHint::Dynamic => gl::DYNAMIC_DRAW,
        }
    }
}

impl From<VertexFormat> for GLenum {
    fn from(format: VertexFormat) -> Self {
        match format {
            VertexFormat::Byte => gl::BYTE,
            VertexFormat::UByte => gl::UNSIGNED_BYTE,
            VertexFormat::Short => gl::SHORT,
            VertexFormat::UShort => gl::UNSIGNED_SHORT,
            VertexFormat::Float => gl::FLOAT,
        }
    }
}

impl From<Primitive> for GLenum {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Points => gl::POINTS,
            Primitive::Lines => gl::LINES,
            Primitive::LineStrip => gl::LINE_STRIP,
            Primitive::Triangles => gl::TRIANGLES,
            Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
        }
    }
}

impl From<TextureWrap> for GLenum {
    fn from(wrap: TextureWrap) -> Self {
        match wrap {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::Mirror => gl::MIRRORED_REPEAT,
            TextureWrap::Clamp => gl::CLAMP_TO_EDGE,
        }
    }
}

/// Returns the `(min, mag)` filters of a texture.
pub fn texture_filter(filter: TextureFilter, mipmap: bool) -> (GLenum, GLenum) {
    match (filter, mipmap) {
        (TextureFilter::Nearest, false) => (gl::NEAREST, gl::NEAREST),
        (TextureFilter::Nearest, true) => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        (TextureFilter::Linear, false) => (gl::LINEAR, gl::LINEAR),
        (TextureFilter::Linear, true) => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
    }
}

/// Returns the `(internal format, format, pixel type)` triple of a texture format.
pub fn texture_format(format: TextureFormat, caps: &Capabilities) -> (GLenum, GLenum, GLenum) {
    let sized = match caps.version {
        Version::GL(_, _) => true,
        Version::ES(major, _) => major >= 3,
    };

    if sized {
        match format {
            TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            TextureFormat::RG8 => (gl::RG8, gl::RG, gl::UNSIGNED_BYTE),
            TextureFormat::RGB8 => (gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
            TextureFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        }
    } else {
        match format {
            TextureFormat::R8 => (gl::RED, gl::RED, gl::UNSIGNED_BYTE),
            TextureFormat::RG8 => (gl::RG, gl::RG, gl::UNSIGNED_BYTE),
            TextureFormat::RGB8 => (gl::RGB, gl::RGB, gl::UNSIGNED_BYTE),
            TextureFormat::RGBA8 => (gl::RGBA, gl::RGBA, gl::UNSIGNED_BYTE),
        }
    }
}
