//! A software stand-in for the GPU.
//!
//! `HeadlessVisitor` keeps every object the GPU would own in plain maps, so callers can
//! check exactly what is alive. Shader sources go through a small GLSL front end that
//! understands the declarations a program links against (`in`, `out`, `uniform` and
//! `layout(location = N)`), and draws are run through a rasterizer that counts vertex and
//! fragment invocations instead of shading anything.
//!
//! The rasterizer reads the position of a vertex from attribute slot 0, taking its `x`
//! and `y` components as normalized device coordinates. Pixels are sampled at their
//! centers and a pixel lying exactly on an edge shared by two triangles is only covered
//! once.

use std::collections::HashMap;

use byteorder::{ByteOrder, LittleEndian};
use smallvec::SmallVec;

use crate::math::prelude::{Color, Vector2};

use super::super::errors::*;
use super::super::geometry::{BufferHint, Primitive, VertexFormat, VertexLayout};
use super::super::shader::{StageKind, UniformVariable};
use super::super::texture::{ImageData, TextureParams};
use super::super::{MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBUTES};
use super::*;

/// Number of objects of each kind that are alive.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ResourceStats {
    pub stages: usize,
    pub programs: usize,
    pub buffers: usize,
    pub vertex_arrays: usize,
    pub textures: usize,
}

impl ResourceStats {
    #[inline]
    pub fn total(&self) -> usize {
        self.stages + self.programs + self.buffers + self.vertex_arrays + self.textures
    }
}

/// Running totals of the work submitted so far.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Counters {
    pub compiles: u32,
    pub links: u32,
    pub uniform_queries: u32,
    pub attribute_queries: u32,
    pub uniform_writes: u32,
    pub program_switches: u32,
    pub clears: u32,
    pub draws: u32,
    pub vertex_invocations: u64,
    pub fragment_invocations: u64,
    /// The largest vertex index any draw has fetched.
    pub max_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    name: String,
    location: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct Interface {
    inputs: Vec<Declaration>,
    outputs: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug)]
struct StageData {
    kind: StageKind,
    interface: Option<Interface>,
    log: String,
    attachments: usize,
    deleted: bool,
}

#[derive(Debug, Default)]
struct ProgramData {
    stages: SmallVec<[StageId; 3]>,
    linked: bool,
    rasterize: bool,
    log: String,
    uniforms: HashMap<String, i32>,
    attributes: HashMap<String, u32>,
    values: HashMap<i32, UniformVariable>,
}

#[derive(Debug)]
struct BufferData {
    target: BufferTarget,
    hint: BufferHint,
    bytes: Vec<u8>,
}

#[derive(Debug)]
struct VertexArrayData {
    vbo: BufferId,
    ibo: Option<BufferId>,
    layout: VertexLayout,
}

#[derive(Debug)]
struct TextureData {
    params: TextureParams,
    dimensions: Vector2<u32>,
    channels: u8,
}

pub struct HeadlessVisitor {
    dimensions: Vector2<u32>,
    next_id: u32,
    stages: HashMap<StageId, StageData>,
    programs: HashMap<ProgramId, ProgramData>,
    buffers: HashMap<BufferId, BufferData>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayData>,
    textures: HashMap<TextureId, TextureData>,
    binded_program: Option<ProgramId>,
    binded_vao: Option<VertexArrayId>,
    binded_textures: [Option<TextureId>; MAX_TEXTURE_UNITS],
    depth_test: bool,
    clear_color: Option<Color>,
    counters: Counters,
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor::with_dimensions(Vector2::new(800, 600))
    }

    /// Creates a visitor whose viewport covers `dimensions` pixels.
    pub fn with_dimensions(dimensions: Vector2<u32>) -> Self {
        HeadlessVisitor {
            dimensions,
            next_id: 0,
            stages: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            binded_program: None,
            binded_vao: None,
            binded_textures: [None; MAX_TEXTURE_UNITS],
            depth_test: false,
            clear_color: None,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            stages: self.stages.len(),
            programs: self.programs.len(),
            buffers: self.buffers.len(),
            vertex_arrays: self.vertex_arrays.len(),
            textures: self.textures.len(),
        }
    }

    #[inline]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    pub fn current_program(&self) -> Option<ProgramId> {
        self.binded_program
    }

    #[inline]
    pub fn current_vertex_array(&self) -> Option<VertexArrayId> {
        self.binded_vao
    }

    /// The texture bound to `unit`, if any.
    pub fn texture_unit(&self, unit: usize) -> Option<TextureId> {
        self.binded_textures.get(unit).cloned().unwrap_or(None)
    }

    /// Channel count and dimensions of a live texture.
    pub fn texture_info(&self, id: TextureId) -> Option<(u8, Vector2<u32>)> {
        self.textures.get(&id).map(|v| (v.channels, v.dimensions))
    }

    pub fn texture_params(&self, id: TextureId) -> Option<TextureParams> {
        self.textures.get(&id).map(|v| v.params)
    }

    #[inline]
    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    #[inline]
    pub fn clear_color(&self) -> Option<Color> {
        self.clear_color
    }

    /// The last value written to a named uniform of `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformVariable> {
        let program = self.programs.get(&program)?;
        let location = program.uniforms.get(name)?;
        program.values.get(location).cloned()
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn stage(&mut self, id: StageId) -> Result<&mut StageData> {
        match self.stages.get_mut(&id) {
            Some(stage) if !stage.deleted => Ok(stage),
            _ => Err(Error::Backend(format!("stage {} does not exist", id))),
        }
    }

    fn program(&mut self, id: ProgramId) -> Result<&mut ProgramData> {
        self.programs
            .get_mut(&id)
            .ok_or_else(|| Error::Backend(format!("program {} does not exist", id)))
    }

    fn release_stage(&mut self, id: StageId) {
        let free = match self.stages.get(&id) {
            Some(stage) => stage.deleted && stage.attachments == 0,
            None => false,
        };

        if free {
            self.stages.remove(&id);
        }
    }

    fn link(&self, stages: &[StageId]) -> ::std::result::Result<ProgramData, String> {
        let mut interfaces: SmallVec<[(StageKind, &Interface); 3]> = SmallVec::new();
        for id in stages {
            match self.stages.get(id).and_then(|v| v.interface.as_ref().map(|i| (v.kind, i))) {
                Some(v) => interfaces.push(v),
                None => return Err("error: linking with uncompiled/unspecialized shader".into()),
            }
        }

        let find = |kind: StageKind| interfaces.iter().find(|v| v.0 == kind).map(|v| v.1);
        let vs = find(StageKind::Vertex)
            .ok_or_else(|| "error: program lacks a vertex shader".to_owned())?;
        let gs = find(StageKind::Geometry);
        let fs = find(StageKind::Fragment);

        if let Some(gs) = gs {
            matches(vs, gs, "geometry")?;
        }

        if let Some(fs) = fs {
            matches(gs.unwrap_or(vs), fs, "fragment")?;
        }

        let mut program = ProgramData::default();
        program.stages = stages.iter().cloned().collect();
        program.rasterize = fs.is_some();

        for &(_, interface) in &interfaces {
            for name in &interface.uniforms {
                let next = program.uniforms.len() as i32;
                program.uniforms.entry(name.clone()).or_insert(next);
            }
        }

        for v in vs.inputs.iter().filter(|v| v.location.is_some()) {
            let location = v.location.unwrap_or(0);
            if location as usize >= MAX_VERTEX_ATTRIBUTES {
                return Err(format!(
                    "error: invalid location {} specified for vertex input `{}'",
                    location, v.name
                ));
            }

            if let Some((name, _)) = program.attributes.iter().find(|v| *v.1 == location) {
                return Err(format!(
                    "error: vertex shader input `{}' and `{}' share location {}",
                    name, v.name, location
                ));
            }

            program.attributes.insert(v.name.clone(), location);
        }

        for v in vs.inputs.iter().filter(|v| v.location.is_none()) {
            let free = (0..MAX_VERTEX_ATTRIBUTES as u32)
                .find(|slot| !program.attributes.values().any(|v| v == slot))
                .ok_or_else(|| "error: too many vertex shader inputs".to_owned())?;

            program.attributes.insert(v.name.clone(), free);
        }

        program.linked = true;
        Ok(program)
    }

    fn fetch_indices(&self, vao: &VertexArrayData, count: u32, offset: usize) -> Result<Vec<u32>> {
        let ibo = vao.ibo.ok_or(Error::MissingIndexBuffer)?;
        let buffer = self
            .buffers
            .get(&ibo)
            .ok_or_else(|| Error::Backend(format!("buffer {} does not exist", ibo)))?;

        let end = offset + count as usize * 4;
        if end > buffer.bytes.len() {
            return Err(Error::OutOfBounds);
        }

        let mut indices = vec![0; count as usize];
        LittleEndian::read_u32_into(&buffer.bytes[offset..end], &mut indices);
        Ok(indices)
    }

    unsafe fn execute(&mut self, primitive: Primitive, indices: Vec<u32>) -> Result<()> {
        let program = self
            .binded_program
            .ok_or_else(|| Error::Backend("no program is current".into()))?;
        let vao = self
            .binded_vao
            .ok_or_else(|| Error::Backend("no vertex array is bound".into()))?;

        let vao = &self.vertex_arrays[&vao];
        let vbo = self
            .buffers
            .get(&vao.vbo)
            .ok_or_else(|| Error::Backend(format!("buffer {} does not exist", vao.vbo)))?;

        let stride = vao.layout.stride() as usize;
        let len = (vbo.bytes.len() / stride) as u32;
        if let Some(&index) = indices.iter().find(|&&v| v >= len) {
            return Err(Error::IndexOutOfBounds { index, len });
        }

        let mut fragments = 0;
        let position = vao
            .layout
            .attribute(0)
            .filter(|v| v.format == VertexFormat::Float && v.size >= 2);

        if let Some(position) = position {
            if self.programs[&program].rasterize {
                let fetch = |index: u32| {
                    let from = index as usize * stride + position.offset as usize;
                    let x = LittleEndian::read_f32(&vbo.bytes[from..]);
                    let y = LittleEndian::read_f32(&vbo.bytes[from + 4..]);
                    [x, y]
                };

                let triangles: Vec<[u32; 3]> = match primitive {
                    Primitive::Triangles => indices
                        .chunks(3)
                        .filter(|v| v.len() == 3)
                        .map(|v| [v[0], v[1], v[2]])
                        .collect(),
                    Primitive::TriangleStrip => indices
                        .windows(3)
                        .map(|v| [v[0], v[1], v[2]])
                        .collect(),
                    _ => Vec::new(),
                };

                for v in triangles {
                    fragments += rasterize(self.dimensions, [fetch(v[0]), fetch(v[1]), fetch(v[2])]);
                }
            }
        }

        let max = indices.iter().cloned().max();
        self.counters.max_index = self.counters.max_index.max(max);
        self.counters.draws += 1;
        self.counters.vertex_invocations += indices.len() as u64;
        self.counters.fragment_invocations += fragments;
        Ok(())
    }
}

fn matches(from: &Interface, to: &Interface, stage: &str) -> ::std::result::Result<(), String> {
    for v in &to.inputs {
        if !from.outputs.contains(&v.name) {
            return Err(format!(
                "error: {} shader varying {} not written by previous stage",
                stage, v.name
            ));
        }
    }

    Ok(())
}

/// Counts the pixels whose centers are covered by a triangle given in normalized device
/// coordinates.
fn rasterize(dimensions: Vector2<u32>, vertices: [[f32; 2]; 3]) -> u64 {
    let (w, h) = (dimensions.x as f32, dimensions.y as f32);
    let mut p = [[0.0f32; 2]; 3];
    for (i, v) in vertices.iter().enumerate() {
        p[i] = [(v[0] + 1.0) * 0.5 * w, (v[1] + 1.0) * 0.5 * h];
    }

    let area = edge(p[0], p[1], p[2]);
    if area == 0.0 || !area.is_finite() {
        return 0;
    }

    if area < 0.0 {
        p.swap(1, 2);
    }

    let min_x = p.iter().map(|v| v[0]).fold(w, f32::min).floor().max(0.0) as u32;
    let max_x = p.iter().map(|v| v[0]).fold(0.0, f32::max).ceil().min(w) as u32;
    let min_y = p.iter().map(|v| v[1]).fold(h, f32::min).floor().max(0.0) as u32;
    let max_y = p.iter().map(|v| v[1]).fold(0.0, f32::max).ceil().min(h) as u32;

    let edges = [(p[1], p[2]), (p[2], p[0]), (p[0], p[1])];
    let mut covered = 0;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let c = [x as f32 + 0.5, y as f32 + 0.5];
            let inside = edges.iter().all(|&(a, b)| {
                let v = edge(a, b, c);
                v > 0.0 || (v == 0.0 && top_left(a, b))
            });

            if inside {
                covered += 1;
            }
        }
    }

    covered
}

#[inline]
fn edge(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

#[inline]
fn top_left(a: [f32; 2], b: [f32; 2]) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    dy < 0.0 || (dy == 0.0 && dx < 0.0)
}

/// Parses the declarations of a stage, or returns the compile log.
fn parse(kind: StageKind, source: &str) -> ::std::result::Result<Interface, String> {
    let mut interface = Interface::default();
    let mut depth = 0i32;
    let mut has_main = false;
    let mut lines = 0;

    for (i, line) in source.lines().enumerate() {
        let n = i + 1;
        lines = n;

        let line = line.trim();
        if line.starts_with("#error") {
            return Err(format!("0:{}(1): error: {}", n, line["#error".len()..].trim()));
        }

        if line.starts_with('#') {
            continue;
        }

        let line = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        };

        if depth == 0 {
            if line.starts_with("void main") {
                has_main = true;
            }

            for statement in line.split(';').filter(|v| !v.trim().is_empty()) {
                if let Some((storage, v)) = declaration(statement) {
                    match (storage, kind) {
                        ("uniform", _) => interface.uniforms.push(v.name),
                        ("in", _) | ("attribute", StageKind::Vertex) => interface.inputs.push(v),
                        ("varying", StageKind::Vertex) => interface.outputs.push(v.name),
                        ("varying", _) => interface.inputs.push(v),
                        _ => interface.outputs.push(v.name),
                    }
                }
            }
        }

        for c in line.chars() {
            match c {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }

            if depth < 0 {
                return Err(format!("0:{}(1): error: syntax error, unexpected '{}'", n, c));
            }
        }
    }

    if depth != 0 {
        return Err(format!(
            "0:{}(1): error: syntax error, unexpected end of file",
            lines.max(1)
        ));
    }

    if !has_main {
        return Err(format!(
            "0:{}(1): error: {} shader does not define function `main'",
            lines.max(1),
            kind
        ));
    }

    Ok(interface)
}

fn declaration(statement: &str) -> Option<(&'static str, Declaration)> {
    let mut rest = statement.trim();
    let mut location = None;

    if rest.starts_with("layout") {
        let open = rest.find('(')?;
        let close = rest.find(')')?;
        for qualifier in rest[open + 1..close].split(',') {
            let mut kv = qualifier.split('=');
            if kv.next().map(str::trim) == Some("location") {
                location = kv.next().and_then(|v| v.trim().parse().ok());
            }
        }

        rest = rest[close + 1..].trim();
    }

    let tokens: SmallVec<[&str; 4]> = rest
        .split_whitespace()
        .filter(|v| !INTERPOLATIONS.contains(v))
        .collect();

    if tokens.len() < 3 {
        return None;
    }

    let storage = *STORAGES.iter().find(|&&v| v == tokens[0])?;
    let name = tokens[tokens.len() - 1];
    let name = name.split('[').next().unwrap_or(name).trim();

    Some((
        storage,
        Declaration {
            name: name.to_owned(),
            location,
        },
    ))
}

const STORAGES: [&str; 5] = ["in", "out", "uniform", "attribute", "varying"];
const INTERPOLATIONS: [&str; 7] = [
    "flat",
    "smooth",
    "noperspective",
    "highp",
    "mediump",
    "lowp",
    "centroid",
];

impl Visitor for HeadlessVisitor {
    unsafe fn create_stage(&mut self, kind: StageKind) -> Result<StageId> {
        let id = self.allocate();
        self.stages.insert(
            id,
            StageData {
                kind,
                interface: None,
                log: String::new(),
                attachments: 0,
                deleted: false,
            },
        );

        Ok(id)
    }

    unsafe fn compile_stage(&mut self, id: StageId, source: &str) -> Result<bool> {
        self.counters.compiles += 1;

        let stage = self.stage(id)?;
        match parse(stage.kind, source) {
            Ok(interface) => {
                stage.interface = Some(interface);
                stage.log.clear();
                Ok(true)
            }
            Err(log) => {
                stage.interface = None;
                stage.log = log;
                Ok(false)
            }
        }
    }

    unsafe fn stage_info_log(&mut self, id: StageId) -> Result<String> {
        Ok(self.stage(id)?.log.clone())
    }

    unsafe fn delete_stage(&mut self, id: StageId) -> Result<()> {
        self.stage(id)?.deleted = true;
        self.release_stage(id);
        Ok(())
    }

    unsafe fn create_program(&mut self) -> Result<ProgramId> {
        let id = self.allocate();
        self.programs.insert(id, ProgramData::default());
        Ok(id)
    }

    unsafe fn attach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()> {
        if self.program(program)?.stages.contains(&stage) {
            return Err(Error::Backend(format!("stage {} is already attached", stage)));
        }

        self.stage(stage)?.attachments += 1;
        self.program(program)?.stages.push(stage);
        Ok(())
    }

    unsafe fn detach_stage(&mut self, program: ProgramId, stage: StageId) -> Result<()> {
        let data = self.program(program)?;
        let pos = data
            .stages
            .iter()
            .position(|&v| v == stage)
            .ok_or_else(|| Error::Backend(format!("stage {} is not attached", stage)))?;

        data.stages.remove(pos);
        if let Some(v) = self.stages.get_mut(&stage) {
            v.attachments -= 1;
        }

        self.release_stage(stage);
        Ok(())
    }

    unsafe fn link_program(&mut self, program: ProgramId) -> Result<bool> {
        self.counters.links += 1;

        let stages = self.program(program)?.stages.clone();
        let linked = self.link(&stages);

        let data = self.program(program)?;
        match linked {
            Ok(v) => {
                *data = v;
                Ok(true)
            }
            Err(log) => {
                data.linked = false;
                data.log = log;
                Ok(false)
            }
        }
    }

    unsafe fn program_info_log(&mut self, program: ProgramId) -> Result<String> {
        Ok(self.program(program)?.log.clone())
    }

    unsafe fn delete_program(&mut self, program: ProgramId) -> Result<()> {
        let data = self
            .programs
            .remove(&program)
            .ok_or_else(|| Error::Backend(format!("program {} does not exist", program)))?;

        for stage in data.stages {
            if let Some(v) = self.stages.get_mut(&stage) {
                v.attachments -= 1;
            }

            self.release_stage(stage);
        }

        if self.binded_program == Some(program) {
            self.binded_program = None;
        }

        Ok(())
    }

    unsafe fn uniform_location(&mut self, program: ProgramId, name: &str) -> Result<Option<i32>> {
        self.counters.uniform_queries += 1;
        Ok(self.program(program)?.uniforms.get(name).cloned())
    }

    unsafe fn attribute_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> Result<Option<u32>> {
        self.counters.attribute_queries += 1;
        Ok(self.program(program)?.attributes.get(name).cloned())
    }

    unsafe fn use_program(&mut self, program: ProgramId) -> Result<()> {
        if self.binded_program == Some(program) {
            return Ok(());
        }

        if !self.program(program)?.linked {
            return Err(Error::Backend(format!("program {} is not linked", program)));
        }

        self.counters.program_switches += 1;
        self.binded_program = Some(program);
        Ok(())
    }

    unsafe fn set_uniform(&mut self, location: i32, variable: &UniformVariable) -> Result<()> {
        let program = self
            .binded_program
            .ok_or_else(|| Error::Backend("no program is current".into()))?;

        let data = self.program(program)?;
        if location < 0 || location as usize >= data.uniforms.len() {
            return Err(Error::Backend(format!("invalid uniform location {}", location)));
        }

        data.values.insert(location, *variable);
        self.counters.uniform_writes += 1;
        Ok(())
    }

    unsafe fn create_buffer(
        &mut self,
        target: BufferTarget,
        hint: BufferHint,
        data: &[u8],
    ) -> Result<BufferId> {
        let id = self.allocate();
        self.buffers.insert(
            id,
            BufferData {
                target,
                hint,
                bytes: data.to_vec(),
            },
        );

        Ok(id)
    }

    unsafe fn update_buffer(
        &mut self,
        target: BufferTarget,
        id: BufferId,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        let buffer = self
            .buffers
            .get_mut(&id)
            .ok_or_else(|| Error::Backend(format!("buffer {} does not exist", id)))?;

        if buffer.target != target {
            return Err(Error::Backend(format!("buffer {} has another target", id)));
        }

        if buffer.hint == BufferHint::Immutable {
            return Err(Error::UpdateImmutableBuffer);
        }

        if offset + data.len() > buffer.bytes.len() {
            return Err(Error::OutOfBounds);
        }

        buffer.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    unsafe fn delete_buffer(&mut self, id: BufferId) -> Result<()> {
        self.buffers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::Backend(format!("buffer {} does not exist", id)))
    }

    unsafe fn create_vertex_array(
        &mut self,
        vbo: BufferId,
        ibo: Option<BufferId>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayId> {
        for &id in Some(vbo).iter().chain(ibo.iter()) {
            if !self.buffers.contains_key(&id) {
                return Err(Error::Backend(format!("buffer {} does not exist", id)));
            }
        }

        let id = self.allocate();
        self.vertex_arrays.insert(
            id,
            VertexArrayData {
                vbo,
                ibo,
                layout: layout.clone(),
            },
        );

        Ok(id)
    }

    unsafe fn bind_vertex_array(&mut self, id: VertexArrayId) -> Result<()> {
        if !self.vertex_arrays.contains_key(&id) {
            return Err(Error::Backend(format!("vertex array {} does not exist", id)));
        }

        self.binded_vao = Some(id);
        Ok(())
    }

    unsafe fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<()> {
        self.vertex_arrays
            .remove(&id)
            .ok_or_else(|| Error::Backend(format!("vertex array {} does not exist", id)))?;

        if self.binded_vao == Some(id) {
            self.binded_vao = None;
        }

        Ok(())
    }

    unsafe fn create_texture(
        &mut self,
        params: TextureParams,
        image: &ImageData,
    ) -> Result<TextureId> {
        image.validate()?;

        let id = self.allocate();
        self.textures.insert(
            id,
            TextureData {
                params,
                dimensions: Vector2::new(image.width, image.height),
                channels: image.channels,
            },
        );

        Ok(id)
    }

    unsafe fn bind_texture(&mut self, unit: usize, id: TextureId) -> Result<()> {
        if unit >= MAX_TEXTURE_UNITS {
            return Err(Error::TooManyTextureUnits(unit, MAX_TEXTURE_UNITS));
        }

        if !self.textures.contains_key(&id) {
            return Err(Error::Backend(format!("texture {} does not exist", id)));
        }

        self.binded_textures[unit] = Some(id);
        Ok(())
    }

    unsafe fn delete_texture(&mut self, id: TextureId) -> Result<()> {
        self.textures
            .remove(&id)
            .ok_or_else(|| Error::Backend(format!("texture {} does not exist", id)))?;

        for v in self.binded_textures.iter_mut() {
            if *v == Some(id) {
                *v = None;
            }
        }

        Ok(())
    }

    unsafe fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        self.execute(primitive, (first..first + count).collect())
    }

    unsafe fn draw_elements(
        &mut self,
        primitive: Primitive,
        count: u32,
        offset: usize,
    ) -> Result<()> {
        let vao = self
            .binded_vao
            .and_then(|v| self.vertex_arrays.get(&v))
            .ok_or_else(|| Error::Backend("no vertex array is bound".into()))?;

        let indices = self.fetch_indices(vao, count, offset)?;
        self.execute(primitive, indices)
    }

    unsafe fn clear(&mut self, color: Option<Color>, depth: Option<f32>) -> Result<()> {
        if color.is_some() || depth.is_some() {
            self.counters.clears += 1;
        }

        if color.is_some() {
            self.clear_color = color;
        }

        Ok(())
    }

    unsafe fn set_depth_test(&mut self, enable: bool) -> Result<()> {
        self.depth_test = enable;
        Ok(())
    }

    unsafe fn set_viewport(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        self.dimensions = dimensions;
        Ok(())
    }

    unsafe fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
