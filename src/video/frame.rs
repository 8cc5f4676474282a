//! Per-frame sequencing of draw calls.
//!
//! A `Frame` is plain data describing what to clear and what to draw. `FrameDriver`
//! walks it in order and restates every binding a draw needs right before issuing it.

use smallvec::SmallVec;

use crate::math::prelude::Color;

use super::backends::Visitor;
use super::errors::Result;
use super::geometry::{DrawMode, GeometryBinding, Primitive};
use super::shader::{ShaderProgram, UniformVariable};
use super::texture::Texture;

/// What to clear at the start of a frame. `None` leaves the buffer untouched.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearParams {
    pub color: Option<Color>,
    pub depth: Option<f32>,
}

impl Default for ClearParams {
    fn default() -> Self {
        ClearParams {
            color: Some(Color::black()),
            depth: None,
        }
    }
}

/// One program, one geometry, and everything they need to be drawn.
#[derive(Debug)]
pub struct DrawCall<'a> {
    program: &'a ShaderProgram,
    geometry: &'a GeometryBinding,
    textures: SmallVec<[(&'a str, &'a Texture); 4]>,
    uniforms: Vec<(&'a str, UniformVariable)>,
    instances: Vec<Vec<(&'a str, UniformVariable)>>,
    mode: DrawMode,
    primitive: Primitive,
}

impl<'a> DrawCall<'a> {
    pub fn new(program: &'a ShaderProgram, geometry: &'a GeometryBinding) -> Self {
        DrawCall {
            program,
            geometry,
            textures: SmallVec::new(),
            uniforms: Vec::new(),
            instances: Vec::new(),
            mode: geometry.default_mode(),
            primitive: Primitive::Triangles,
        }
    }

    /// Binds `texture` to the next free texture unit and points the sampler uniform
    /// `name` at it.
    pub fn with_texture(mut self, name: &'a str, texture: &'a Texture) -> Self {
        self.textures.push((name, texture));
        self
    }

    /// Sets a uniform once for every instance of this call.
    pub fn with_uniform<T: Into<UniformVariable>>(mut self, name: &'a str, value: T) -> Self {
        self.uniforms.push((name, value.into()));
        self
    }

    /// Adds an instance. The geometry is drawn once per instance with its uniforms
    /// applied on top of the shared ones. A call without instances draws once.
    pub fn with_instance(mut self, uniforms: Vec<(&'a str, UniformVariable)>) -> Self {
        self.instances.push(uniforms);
        self
    }

    pub fn with_mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = primitive;
        self
    }

    fn draw(
        &self,
        video: &mut dyn Visitor,
        uniforms: &[(&str, UniformVariable)],
        stats: &mut FrameStats,
    ) -> Result<()> {
        for &(name, ref value) in uniforms {
            self.program.set_uniform(video, name, *value)?;
        }

        self.geometry.bind(video)?;
        stats.primitives += self.geometry.draw(video, self.primitive, self.mode)?;
        stats.draws += 1;
        Ok(())
    }
}

/// Everything drawn between two presentations.
#[derive(Debug, Default)]
pub struct Frame<'a> {
    pub clear: ClearParams,
    pub depth_test: bool,
    pub calls: Vec<DrawCall<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(clear: ClearParams) -> Self {
        Frame {
            clear,
            depth_test: false,
            calls: Vec::new(),
        }
    }

    pub fn with_depth_test(mut self, enable: bool) -> Self {
        self.depth_test = enable;
        self
    }

    pub fn push(&mut self, call: DrawCall<'a>) {
        self.calls.push(call);
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: u32,
    pub primitives: u32,
}

/// Submits frames to the GPU.
#[derive(Debug, Default)]
pub struct FrameDriver {
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        FrameDriver::default()
    }

    /// Number of frames submitted so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn submit(&mut self, video: &mut dyn Visitor, frame: &Frame) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        unsafe {
            video.set_depth_test(frame.depth_test)?;
            video.clear(frame.clear.color, frame.clear.depth)?;
        }

        for call in &frame.calls {
            call.program.activate(video)?;

            for (unit, &(name, texture)) in call.textures.iter().enumerate() {
                texture.bind(video, unit)?;
                call.program.set_uniform(video, name, unit as i32)?;
            }

            for &(name, ref value) in &call.uniforms {
                call.program.set_uniform(video, name, *value)?;
            }

            if call.instances.is_empty() {
                call.draw(video, &[], &mut stats)?;
            } else {
                for uniforms in &call.instances {
                    call.draw(video, uniforms, &mut stats)?;
                }
            }
        }

        self.frames += 1;
        Ok(stats)
    }
}
