//! Compilation, linking and uniform lookup of GPU programs.
//!
//! A program moves through `Empty -> StageCompiled -> Linked -> Released`. Stages are
//! compiled on their own, attached to an unlinked program and handed over for good: once
//! the link status is known every stage is detached and released, so a stage can never be
//! shared between programs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::math::prelude::{Color, Matrix4, Vector2, Vector3, Vector4};
use crate::math::{Matrix2, Matrix3};

use super::backends::{ProgramId, StageId, Visitor};
use super::errors::{Error, Result};

/// The kind of a shader stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Geometry,
    Fragment,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            StageKind::Vertex => "vertex",
            StageKind::Geometry => "geometry",
            StageKind::Fragment => "fragment",
        };

        write!(f, "{}", name)
    }
}

/// One compiled shader unit.
///
/// A `ShaderStage` only exists in the compiled state: a failed compilation releases the
/// GPU object before reporting the error. It must either be attached to a program or
/// released explicitly.
#[derive(Debug)]
pub struct ShaderStage {
    kind: StageKind,
    id: Option<StageId>,
}

impl ShaderStage {
    /// Compiles `source` into a new stage of `kind`.
    ///
    /// On failure the driver's info log is returned untouched in `Error::Compile`.
    pub fn compile(video: &mut dyn Visitor, kind: StageKind, source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Err(Error::EmptySource(kind));
        }

        unsafe {
            let id = video.create_stage(kind)?;
            let compiled = match video.compile_stage(id, source) {
                Ok(v) => v,
                Err(err) => {
                    discard_stage(video, id);
                    return Err(err);
                }
            };

            if compiled {
                debug!("Compiled {} stage {}.", kind, id);
                return Ok(ShaderStage { kind, id: Some(id) });
            }

            let log = video.stage_info_log(id);
            discard_stage(video, id);

            let log = log?;
            warn!("Failed to compile {} stage:\n{}", kind, log);
            Err(Error::Compile { stage: kind, log })
        }
    }

    #[inline]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    #[inline]
    pub fn id(&self) -> Option<StageId> {
        self.id
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.id.is_some()
    }

    /// Releases a stage that is not going to be linked.
    pub fn release(mut self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(id) = self.id.take() {
            unsafe { video.delete_stage(id)? };
            debug!("Released {} stage {}.", self.kind, id);
        }

        Ok(())
    }
}

unsafe fn discard_stage(video: &mut dyn Visitor, id: StageId) {
    if let Err(err) = video.delete_stage(id) {
        warn!("Failed to delete stage {}: {}", id, err);
    }
}

impl Drop for ShaderStage {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            warn!("{} stage {} dropped without being released.", self.kind, id);
        }
    }
}

/// The GLSL sources of a program. Stages with empty sources are skipped.
#[derive(Debug, Clone, Default)]
pub struct ShaderSources {
    pub vs: String,
    pub gs: Option<String>,
    pub fs: Option<String>,
}

impl ShaderSources {
    pub fn new<T1: Into<String>, T2: Into<String>>(vs: T1, fs: T2) -> Self {
        ShaderSources {
            vs: vs.into(),
            gs: None,
            fs: Some(fs.into()),
        }
    }

    pub fn with_geometry<T: Into<String>>(mut self, gs: T) -> Self {
        self.gs = Some(gs.into());
        self
    }

    /// Reads the vertex and fragment sources from files.
    pub fn from_files<P1, P2>(vs: P1, fs: P2) -> crate::errors::Result<Self>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
    {
        Ok(ShaderSources::new(read(vs.as_ref())?, read(fs.as_ref())?))
    }

    /// Reads the geometry source from a file.
    pub fn with_geometry_file<P: AsRef<Path>>(self, gs: P) -> crate::errors::Result<Self> {
        Ok(self.with_geometry(read(gs.as_ref())?))
    }

    fn stages(&self) -> impl Iterator<Item = (StageKind, &str)> {
        let gs = self.gs.as_ref().map(|v| (StageKind::Geometry, v.as_str()));
        let fs = self.fs.as_ref().map(|v| (StageKind::Fragment, v.as_str()));

        Some((StageKind::Vertex, self.vs.as_str()))
            .into_iter()
            .chain(gs)
            .chain(fs)
            .filter(|&(kind, src)| kind == StageKind::Vertex || !src.trim().is_empty())
    }
}

fn read(path: &Path) -> crate::errors::Result<String> {
    fs::read_to_string(path)
        .map_err(|err| format_err!("Failed to read shader source {:?}: {}", path, err))
}

/// The lifecycle state of a `ShaderProgram`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramState {
    Empty,
    StageCompiled,
    Linked,
    Released,
}

/// A resolved uniform location of a linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(i32);

impl UniformLocation {
    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// A linked, executable GPU pipeline.
#[derive(Debug)]
pub struct ShaderProgram {
    id: Option<ProgramId>,
    state: ProgramState,
    stages: SmallVec<[ShaderStage; 3]>,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
    attributes: RefCell<HashMap<String, Option<u32>>>,
}

impl Default for ShaderProgram {
    fn default() -> Self {
        ShaderProgram::new()
    }
}

impl ShaderProgram {
    /// Creates an empty program without any stage.
    pub fn new() -> Self {
        ShaderProgram {
            id: None,
            state: ProgramState::Empty,
            stages: SmallVec::new(),
            uniforms: RefCell::new(HashMap::new()),
            attributes: RefCell::new(HashMap::new()),
        }
    }

    /// Compiles every stage of `sources` and links them into a program.
    ///
    /// If any stage fails, the stages that did compile are released before the error is
    /// returned.
    pub fn from_sources(video: &mut dyn Visitor, sources: &ShaderSources) -> Result<Self> {
        let mut program = ShaderProgram::new();

        for (kind, src) in sources.stages() {
            let attached = ShaderStage::compile(video, kind, src)
                .and_then(|stage| program.attach(video, stage));

            if let Err(err) = attached {
                program.discard(video);
                return Err(err);
            }
        }

        if let Err(err) = program.link(video) {
            program.discard(video);
            return Err(err);
        }

        Ok(program)
    }

    fn discard(&mut self, video: &mut dyn Visitor) {
        if let Err(err) = self.release(video) {
            warn!("Failed to release program {:?}: {}", self.id, err);
        }
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    #[inline]
    pub fn id(&self) -> Option<ProgramId> {
        self.id
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.state == ProgramState::Linked
    }

    /// Attaches a compiled stage. At most one stage of each kind is accepted; a rejected
    /// stage is released.
    pub fn attach(&mut self, video: &mut dyn Visitor, stage: ShaderStage) -> Result<()> {
        let err = match self.state {
            ProgramState::Linked => Some(Error::AlreadyLinked),
            ProgramState::Released => Some(Error::ProgramReleased),
            _ if self.stages.iter().any(|v| v.kind == stage.kind) => {
                Some(Error::DuplicateStage(stage.kind))
            }
            _ => None,
        };

        if let Some(err) = err {
            stage.release(video)?;
            return Err(err);
        }

        debug_assert!(stage.is_compiled());
        self.stages.push(stage);
        self.state = ProgramState::StageCompiled;
        Ok(())
    }

    /// Links the attached stages into an executable program.
    ///
    /// Stages are detached and released only after the link status is known, whatever it
    /// turns out to be. A failed link deletes the program object and leaves this program
    /// `Released`.
    pub fn link(&mut self, video: &mut dyn Visitor) -> Result<()> {
        match self.state {
            ProgramState::Empty => return Err(Error::MissingVertexStage),
            ProgramState::Linked => return Err(Error::AlreadyLinked),
            ProgramState::Released => return Err(Error::ProgramReleased),
            ProgramState::StageCompiled => {}
        }

        if !self.stages.iter().any(|v| v.kind == StageKind::Vertex) {
            return Err(Error::MissingVertexStage);
        }

        unsafe {
            let id = video.create_program()?;
            let mut attached = 0;
            let status = Self::attach_and_link(video, id, &self.stages, &mut attached);
            let log = match status {
                Ok(false) => Some(video.program_info_log(id)),
                _ => None,
            };

            // Every stage is deleted, but only the ones that made it onto the program
            // are detached.
            let mut cleanup = Ok(());
            for (i, mut stage) in self.stages.drain(..).enumerate() {
                if let Some(sid) = stage.id.take() {
                    if i < attached {
                        cleanup = cleanup.and(video.detach_stage(id, sid));
                    }

                    cleanup = cleanup.and(video.delete_stage(sid));
                }
            }

            if let Err(err) = cleanup {
                warn!("Failed to release the stages of program {}: {}", id, err);
            }

            if let Ok(true) = status {
                debug!("Linked program {}.", id);
                self.id = Some(id);
                self.state = ProgramState::Linked;
                return Ok(());
            }

            if let Err(err) = video.delete_program(id) {
                warn!("Failed to delete program {}: {}", id, err);
            }

            self.state = ProgramState::Released;
            match status {
                Err(err) => Err(err),
                _ => {
                    let log = log.unwrap_or_else(|| Ok(String::new()))?;
                    warn!("Failed to link program:\n{}", log);
                    Err(Error::Link { log })
                }
            }
        }
    }

    unsafe fn attach_and_link(
        video: &mut dyn Visitor,
        id: ProgramId,
        stages: &[ShaderStage],
        attached: &mut usize,
    ) -> Result<bool> {
        for stage in stages {
            if let Some(sid) = stage.id {
                video.attach_stage(id, sid)?;
            }

            *attached += 1;
        }

        video.link_program(id)
    }

    fn linked_id(&self) -> Result<ProgramId> {
        match (self.state, self.id) {
            (ProgramState::Linked, Some(id)) => Ok(id),
            (ProgramState::Released, _) => Err(Error::ProgramReleased),
            (state, _) => Err(Error::ProgramNotLinked(state)),
        }
    }

    /// Returns the location of a named uniform, or `None` if the program has no active
    /// uniform with this name. Results are cached per program.
    pub fn uniform_location(
        &self,
        video: &mut dyn Visitor,
        name: &str,
    ) -> Result<Option<UniformLocation>> {
        let id = self.linked_id()?;
        if let Some(location) = self.uniforms.borrow().get(name) {
            return Ok(*location);
        }

        let location = unsafe { video.uniform_location(id, name)? }.map(UniformLocation);
        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }

    /// Returns the slot of a named vertex attribute, or `None` if the program has no
    /// active attribute with this name. Results are cached per program.
    pub fn attribute_location(&self, video: &mut dyn Visitor, name: &str) -> Result<Option<u32>> {
        let id = self.linked_id()?;
        if let Some(location) = self.attributes.borrow().get(name) {
            return Ok(*location);
        }

        let location = unsafe { video.attribute_location(id, name)? };
        self.attributes.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }

    /// Makes this program the current one for subsequent draw calls.
    pub fn activate(&self, video: &mut dyn Visitor) -> Result<()> {
        let id = self.linked_id()?;
        unsafe { video.use_program(id) }
    }

    /// Activates the program and sets a uniform variable. Returns `false` without doing
    /// anything if the program has no such uniform.
    pub fn set_uniform<T>(&self, video: &mut dyn Visitor, name: &str, value: T) -> Result<bool>
    where
        T: Into<UniformVariable>,
    {
        match self.uniform_location(video, name)? {
            Some(location) => {
                self.activate(video)?;
                unsafe { video.set_uniform(location.0, &value.into())? };
                Ok(true)
            }
            None => {
                trace!("Uniform {:?} is not active in program {:?}.", name, self.id);
                Ok(false)
            }
        }
    }

    /// Destroys the underlying GPU objects. Calling it on a released program does nothing.
    ///
    /// Every GPU object is released even if one of them fails; the first error is returned.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        let mut result = Ok(());
        for stage in self.stages.drain(..) {
            result = result.and(stage.release(video));
        }

        if let Some(id) = self.id.take() {
            result = result.and(unsafe { video.delete_program(id) });
            debug!("Released program {}.", id);
        }

        self.uniforms.borrow_mut().clear();
        self.attributes.borrow_mut().clear();
        self.state = ProgramState::Released;
        result
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            warn!("Program {} dropped without being released.", id);
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix2f([[f32; 2]; 2], bool),
    Matrix3f([[f32; 3]; 3], bool),
    Matrix4f([[f32; 4]; 4], bool),
}

impl From<i32> for UniformVariable {
    fn from(v: i32) -> Self {
        UniformVariable::I32(v)
    }
}

impl From<f32> for UniformVariable {
    fn from(v: f32) -> Self {
        UniformVariable::F32(v)
    }
}

impl From<[f32; 2]> for UniformVariable {
    fn from(v: [f32; 2]) -> Self {
        UniformVariable::Vector2f(v)
    }
}

impl From<[f32; 3]> for UniformVariable {
    fn from(v: [f32; 3]) -> Self {
        UniformVariable::Vector3f(v)
    }
}

impl From<[f32; 4]> for UniformVariable {
    fn from(v: [f32; 4]) -> Self {
        UniformVariable::Vector4f(v)
    }
}

impl From<Vector2<f32>> for UniformVariable {
    fn from(v: Vector2<f32>) -> Self {
        UniformVariable::Vector2f(v.into())
    }
}

impl From<Vector3<f32>> for UniformVariable {
    fn from(v: Vector3<f32>) -> Self {
        UniformVariable::Vector3f(v.into())
    }
}

impl From<Vector4<f32>> for UniformVariable {
    fn from(v: Vector4<f32>) -> Self {
        UniformVariable::Vector4f(v.into())
    }
}

impl From<Color> for UniformVariable {
    fn from(v: Color) -> Self {
        UniformVariable::Vector4f(v.rgba())
    }
}

impl From<Matrix2<f32>> for UniformVariable {
    fn from(v: Matrix2<f32>) -> Self {
        UniformVariable::Matrix2f(v.into(), false)
    }
}

impl From<Matrix3<f32>> for UniformVariable {
    fn from(v: Matrix3<f32>) -> Self {
        UniformVariable::Matrix3f(v.into(), false)
    }
}

impl From<Matrix4<f32>> for UniformVariable {
    fn from(v: Matrix4<f32>) -> Self {
        UniformVariable::Matrix4f(v.into(), false)
    }
}
