use gl;
use gl::types::*;
use std::cmp;
use std::ffi;

use super::super::super::errors::*;
use super::super::super::geometry::VertexLayout;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`, e.g. `"4.6.0 NVIDIA 390.77"`
    /// or `"OpenGL ES 3.2 Mesa 20.0.8"`.
    pub fn from_str(desc: &str) -> Result<Version> {
        let malformed = || Error::Backend(format!("[GL] Version {:?} is malformed.", desc));

        let (es, rest) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            // "OpenGL ES-CM 1.1" and friends.
            (true, desc[10..].splitn(2, ' ').nth(1).ok_or_else(malformed)?)
        } else {
            (false, desc)
        };

        let number = rest.split(' ').next().ok_or_else(malformed)?;
        let mut iter = number.split('.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context, otherwise you will get
    /// an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        Version::from_str(&parse_str(gl::VERSION)?)
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    /// Returns a version or release number. Vendor-specific information may follow the version
    /// number.
    pub version: Version,

    /// The company responsible for this GL implementation.
    pub vendor: String,

    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,

    /// Maximum number of textures that can be bound to a program.
    ///
    /// `glActiveTexture` must be between `GL_TEXTURE0` and `GL_TEXTURE0` + this value - 1.
    pub max_combined_texture_image_units: u32,

    /// Maximum number of generic vertex attributes.
    pub max_vertex_attribs: u32,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        Ok(Capabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            max_combined_texture_image_units: parse_integer(
                gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS,
                2,
            ),
            max_vertex_attribs: parse_integer(gl::MAX_VERTEX_ATTRIBS, 8),
        })
    }

    /// Whether the context could compile geometry shaders.
    pub fn has_geometry_shader(&self) -> bool {
        self.version >= Version::GL(3, 2) || self.version >= Version::ES(3, 2)
    }

    /// Checks that the context supports everything the renderer relies on: shader
    /// objects with `layout` qualifiers, vertex array objects and sized texture formats.
    pub fn check(&self) -> Result<()> {
        if self.version < Version::GL(3, 3) && self.version < Version::ES(3, 0) {
            return Err(Error::Requirement(format!(
                "GLSL 330 or GLSL ES 300 (found {:?})",
                self.version
            )));
        }

        Ok(())
    }

    /// Checks that every attribute slot of `layout` is below `GL_MAX_VERTEX_ATTRIBS`.
    pub fn check_layout(&self, layout: &VertexLayout) -> Result<()> {
        for v in layout.attributes() {
            if v.slot >= self.max_vertex_attribs {
                return Err(Error::Requirement(format!(
                    "vertex attribute slot {} (max {})",
                    v.slot, self.max_vertex_attribs
                )));
            }
        }

        Ok(())
    }
}

#[inline]
unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", id)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("[GL] String of {} is unformaled.", id)))
}

#[inline]
unsafe fn parse_integer(id: GLenum, fallback: GLint) -> u32 {
    let mut val = fallback;
    gl::GetIntegerv(id, &mut val);
    val as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        assert_eq!(
            Version::from_str("4.6.0 NVIDIA 390.77").unwrap(),
            Version::GL(4, 6)
        );
        assert_eq!(
            Version::from_str("OpenGL ES 3.2 Mesa 20.0.8").unwrap(),
            Version::ES(3, 2)
        );
        assert_eq!(
            Version::from_str("OpenGL ES-CM 1.1").unwrap(),
            Version::ES(1, 1)
        );
        assert!(Version::from_str("").is_err());
        assert!(Version::from_str("OpenGL").is_err());
    }

    #[test]
    fn compare() {
        assert!(Version::GL(3, 3) > Version::GL(3, 2));
        assert!(Version::GL(4, 0) > Version::GL(3, 3));
        assert!(!(Version::GL(3, 3) >= Version::ES(3, 0)));
        assert!(!(Version::GL(3, 3) < Version::ES(3, 0)));
    }

    #[test]
    fn layout_slots() {
        use crate::video::geometry::VertexFormat;

        let capabilities = Capabilities {
            version: Version::GL(3, 3),
            vendor: String::new(),
            renderer: String::new(),
            max_combined_texture_image_units: 16,
            max_vertex_attribs: 4,
        };

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(3, VertexFormat::Float, 2)
            .finish()
            .unwrap();
        assert!(capabilities.check_layout(&layout).is_ok());

        let layout = VertexLayout::build()
            .with(4, VertexFormat::Float, 3)
            .finish()
            .unwrap();
        match capabilities.check_layout(&layout) {
            Err(Error::Requirement(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
