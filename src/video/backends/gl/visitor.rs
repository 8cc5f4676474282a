use std::ffi::CString;
use std::os::raw::c_void;

use gl;
use gl::types::*;

use crate::math::prelude::{Color, Vector2};

use super::super::super::errors::*;
use super::super::super::geometry::{BufferHint, Primitive, VertexLayout};
use super::super::super::shader::{StageKind, UniformVariable};
use super::super::super::texture::{ImageData, TextureParams};
use super::super::super::MAX_TEXTURE_UNITS;
use super::super::{
    BufferId, BufferTarget, ProgramId, StageId, TextureId, VertexArrayId, Visitor,
};
use super::capabilities::Capabilities;
use super::types;

struct GLMutableState {
    depth_test: bool,
    viewport: Vector2<u32>,
    binded_program: Option<GLuint>,
    binded_vao: Option<GLuint>,
    binded_texture_index: usize,
    binded_textures: [Option<GLuint>; MAX_TEXTURE_UNITS],
}

pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
}

impl GLVisitor {
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.check()?;

        let state = GLMutableState {
            depth_test: false,
            viewport: Vector2::new(0, 0),
            binded_program: None,
            binded_vao: None,
            binded_texture_index: 0,
            binded_textures: [None; MAX_TEXTURE_UNITS],
        };

        let mut visitor = GLVisitor {
            state,
            capabilities,
        };

        Self::reset_render_state(&mut visitor.state)?;
        Ok(visitor)
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_stage(&mut self, kind: StageKind) -> Result<StageId> {
        if kind == StageKind::Geometry && !self.capabilities.has_geometry_shader() {
            return Err(Error::Requirement("geometry shaders".into()));
        }

        let id = gl::CreateShader(kind.into());
        check()?;

        if id == 0 {
            return Err(Error::ResourceCreation(format!("{} stage", kind)));
        }

        Ok(id)
    }

    unsafe fn compile_stage(&mut self, id: StageId, source: &str) -> Result<bool> {
        let c_str = cstring(source)?;
        gl::ShaderSource(id, 1, &c_str.as_ptr(), ::std::ptr::null());
        gl::CompileShader(id);

        // Get the compile status
        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut status);
        check()?;

        Ok(status == GLint::from(gl::TRUE))
    }

    unsafe fn stage_info_log(&mut self, id: StageId) -> Result<String> {
        let mut len = 0;
        gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
        if len <= 1 {
            return Ok(String::new());
        }

        let mut buf = vec![0u8; len as usize];
        let mut written = 0;
        gl::GetShaderInfoLog(id, len, &mut written, buf.as_mut_ptr() as *mut GLchar);
        check()?;

        buf.truncate(written as usize);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    unsafe fn delete_stage(&mut self, id: StageId) -> Result<()> {
        gl::DeleteShader(id);
        check()
    }

    unsafe fn create_program(&mut self) -> Result<ProgramId> {
        let id = gl::CreateProgram();
        check()?;

        if id == 0 {
            return Err(Error::ResourceCreation("program".into()));
        }

        Ok(id)
    }

    unsafe fn attach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()> {
        gl::AttachShader(program, stage);
        check()
    }

    unsafe fn detach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()> {
        gl::DetachShader(program, stage);
        check()
    }

    unsafe fn link_program(&mut self, program: ProgramId) -> Result<bool> {
        gl::LinkProgram(program);

        // Get the link status
        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        check()?;

        Ok(status == GLint::from(gl::TRUE))
    }

    unsafe fn program_info_log(&mut self, program: ProgramId) -> Result<String> {
        let mut len: GLint = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        if len <= 1 {
            return Ok(String::new());
        }

        let mut buf = vec![0u8; len as usize];
        let mut written = 0;
        gl::GetProgramInfoLog(program, len, &mut written, buf.as_mut_ptr() as *mut GLchar);
        check()?;

        buf.truncate(written as usize);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    unsafe fn delete_program(&mut self, program: ProgramId) -> Result<()> {
        if self.state.binded_program == Some(program) {
            self.state.binded_program = None;
        }

        gl::DeleteProgram(program);
        check()
    }

    unsafe fn uniform_location(&mut self, program: ProgramId, name: &str) -> Result<Option<i32>> {
        let c_name = cstring(name)?;
        let location = gl::GetUniformLocation(program, c_name.as_ptr());
        check()?;

        if location == -1 {
            Ok(None)
        } else {
            Ok(Some(location))
        }
    }

    unsafe fn attribute_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<Option<u32>> {
        let c_name = cstring(name)?;
        let location = gl::GetAttribLocation(program, c_name.as_ptr());
        check()?;

        if location < 0 {
            Ok(None)
        } else {
            Ok(Some(location as u32))
        }
    }

    unsafe fn use_program(&mut self, program: ProgramId) -> Result<()> {
        if self.state.binded_program == Some(program) {
            return Ok(());
        }

        gl::UseProgram(program);
        check()?;

        self.state.binded_program = Some(program);
        Ok(())
    }

    unsafe fn set_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()> {
        match *variable {
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
            UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
            UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
            UniformVariable::Matrix2f(v, transpose) => {
                let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                gl::UniformMatrix2fv(location, 1, transpose, v[0].as_ptr())
            }
            UniformVariable::Matrix3f(v, transpose) => {
                let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                gl::UniformMatrix3fv(location, 1, transpose, v[0].as_ptr())
            }
            UniformVariable::Matrix4f(v, transpose) => {
                let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                gl::UniformMatrix4fv(location, 1, transpose, v[0].as_ptr())
            }
        }

        check()
    }

    unsafe fn create_buffer(
        &mut self,
        _: BufferTarget,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<BufferId> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            return Err(Error::ResourceCreation("buffer".into()));
        }

        // Buffers are untyped. Index data goes through `ARRAY_BUFFER` too so the element
        // binding of the current vertex array stays untouched.
        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            data.len() as isize,
            data.as_ptr() as *const c_void,
            hint.into(),
        );

        if let Err(err) = check() {
            gl::DeleteBuffers(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn update_buffer(
        &mut self,
        _: BufferTarget,
        id: BufferId,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, id);
        gl::BufferSubData(
            gl::ARRAY_BUFFER,
            offset as isize,
            data.len() as isize,
            data.as_ptr() as *const c_void,
        );
        check()
    }

    unsafe fn delete_buffer(&mut self, id: BufferId) -> Result<()> {
        gl::DeleteBuffers(1, &id);
        check()
    }

    unsafe fn create_vertex_array(
        &mut self,
        vbo: BufferId,
        ibo: Option<BufferId>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayId> {
        self.capabilities.check_layout(layout)?;

        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        if vao == 0 {
            return Err(Error::ResourceCreation("vertex array".into()));
        }

        gl::BindVertexArray(vao);
        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

        let stride = layout.stride() as GLsizei;
        for v in layout.attributes() {
            gl::EnableVertexAttribArray(v.slot);
            gl::VertexAttribPointer(
                v.slot,
                GLint::from(v.size),
                v.format.into(),
                v.normalized as GLboolean,
                stride,
                v.offset as usize as *const c_void,
            );
        }

        if let Some(ibo) = ibo {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
        }

        // Restores the vertex array that was current before.
        gl::BindVertexArray(self.state.binded_vao.unwrap_or(0));

        if let Err(err) = check() {
            gl::DeleteVertexArrays(1, &vao);
            return Err(err);
        }

        Ok(vao)
    }

    unsafe fn bind_vertex_array(&mut self, id: VertexArrayId) -> Result<()> {
        if self.state.binded_vao == Some(id) {
            return Ok(());
        }

        gl::BindVertexArray(id);
        check()?;

        self.state.binded_vao = Some(id);
        Ok(())
    }

    unsafe fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<()> {
        if self.state.binded_vao == Some(id) {
            self.state.binded_vao = None;
        }

        gl::DeleteVertexArrays(1, &id);
        check()
    }

    unsafe fn create_texture(
        &mut self,
        params: TextureParams,
        image: &ImageData,
    ) -> Result<TextureId> {
        let format = image.format()?;
        let (internal_format, format, pixel_type) =
            types::texture_format(format, &self.capabilities);

        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            return Err(Error::ResourceCreation("texture".into()));
        }

        gl::BindTexture(gl::TEXTURE_2D, id);

        let wrap: GLenum = params.wrap.into();
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);

        let (min_filter, mag_filter) = types::texture_filter(params.filter, params.mipmap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);

        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal_format as GLint,
            image.width as GLsizei,
            image.height as GLsizei,
            0,
            format,
            pixel_type,
            image.pixels.as_ptr() as *const c_void,
        );

        if params.mipmap {
            gl::GenerateMipmap(gl::TEXTURE_2D);
        }

        // Restores the texture that was bound to the active unit before.
        let unit = self.state.binded_texture_index;
        gl::BindTexture(gl::TEXTURE_2D, self.state.binded_textures[unit].unwrap_or(0));

        if let Err(err) = check() {
            gl::DeleteTextures(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn bind_texture(&mut self, unit: usize, id: TextureId) -> Result<()> {
        if unit >= MAX_TEXTURE_UNITS
            || unit >= self.capabilities.max_combined_texture_image_units as usize
        {
            return Err(Error::TooManyTextureUnits(unit, MAX_TEXTURE_UNITS));
        }

        if self.state.binded_texture_index != unit {
            self.state.binded_texture_index = unit;
            gl::ActiveTexture(gl::TEXTURE0 + unit as GLuint);
        }

        if self.state.binded_textures[unit] != Some(id) {
            self.state.binded_textures[unit] = Some(id);
            gl::BindTexture(gl::TEXTURE_2D, id);
        }

        check()
    }

    unsafe fn delete_texture(&mut self, id: TextureId) -> Result<()> {
        for v in self.state.binded_textures.iter_mut() {
            if *v == Some(id) {
                *v = None;
            }
        }

        gl::DeleteTextures(1, &id);
        check()
    }

    unsafe fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei);
        check()
    }

    unsafe fn draw_elements(
        &mut self,
        primitive: Primitive,
        count: u32,
        offset: usize,
    ) -> Result<()> {
        gl::DrawElements(
            primitive.into(),
            count as GLsizei,
            gl::UNSIGNED_INT,
            offset as *const c_void,
        );
        check()
    }

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        let mut bits = 0;
        if let Some(v) = color {
            bits |= gl::COLOR_BUFFER_BIT;
            gl::ClearColor(v.r, v.g, v.b, v.a);
        }

        if let Some(v) = depth {
            bits |= gl::DEPTH_BUFFER_BIT;
            gl::ClearDepth(f64::from(v));
        }

        if bits != 0 {
            gl::Clear(bits);
            check()
        } else {
            Ok(())
        }
    }

    unsafe fn set_depth_test(&mut self, enable: bool) -> Result<()> {
        if self.state.depth_test == enable {
            return Ok(());
        }

        if enable {
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthMask(gl::TRUE);
        } else {
            gl::Disable(gl::DEPTH_TEST);
            gl::DepthMask(gl::FALSE);
        }

        self.state.depth_test = enable;
        check()
    }

    unsafe fn set_viewport(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        if self.state.viewport != dimensions {
            gl::Viewport(0, 0, dimensions.x as i32, dimensions.y as i32);
            self.state.viewport = dimensions;
            check()?;
        }

        Ok(())
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }
}

impl GLVisitor {
    unsafe fn reset_render_state(state: &mut GLMutableState) -> Result<()> {
        gl::Disable(gl::CULL_FACE);
        gl::FrontFace(gl::CCW);

        // Depth writes are only enabled along with the depth test, but clearing the
        // depth buffer needs the mask on.
        gl::Disable(gl::DEPTH_TEST);
        gl::DepthMask(gl::TRUE);
        gl::DepthFunc(gl::LESS);
        state.depth_test = false;

        gl::Disable(gl::BLEND);
        gl::ColorMask(1, 1, 1, 1);
        gl::Disable(gl::SCISSOR_TEST);

        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        check()
    }
}

fn cstring(v: &str) -> Result<CString> {
    CString::new(v.as_bytes()).map_err(|_| Error::Backend(format!("{:?} contains a nul byte.", v)))
}

unsafe fn check() -> Result<()> {
    let msg = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),

        gl::INVALID_ENUM => "[GL] An unacceptable value is specified for an enumerated argument.",

        gl::INVALID_VALUE => "[GL] A numeric argument is out of range.",

        gl::INVALID_OPERATION => {
            "[GL] The specified operation is not allowed in the current state."
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }

        gl::OUT_OF_MEMORY => {
            return Err(Error::ResourceCreation(
                "[GL] There is not enough memory left to execute the command.".into(),
            ))
        }

        _ => "[GL] Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(msg.into()))
}
