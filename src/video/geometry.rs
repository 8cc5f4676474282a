//! Vertex layouts and GPU-resident vertex/index data.

use smallvec::SmallVec;

use super::backends::{BufferId, BufferTarget, VertexArrayId, Visitor};
use super::errors::{Error, Result};
use super::MAX_VERTEX_ATTRIBUTES;

/// The numeric kind of each component of a vertex attribute.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VertexFormat {
    Byte,
    UByte,
    Short,
    UShort,
    Float,
}

impl VertexFormat {
    /// Size of a single component in bytes.
    pub fn size(self) -> u32 {
        match self {
            VertexFormat::Byte | VertexFormat::UByte => 1,
            VertexFormat::Short | VertexFormat::UShort => 2,
            VertexFormat::Float => 4,
        }
    }
}

/// Describes how one vertex field is packed within an interleaved vertex record.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AttributeDescriptor {
    /// The attribute slot of the program this field feeds.
    pub slot: u32,
    /// The data type of each component of this field.
    pub format: VertexFormat,
    /// The number of components, 1 to 4.
    pub size: u8,
    /// Byte offset of the field from the start of the record.
    pub offset: u32,
    /// Whether fixed-point data values should be normalized.
    pub normalized: bool,
}

impl AttributeDescriptor {
    pub fn new(slot: u32, format: VertexFormat, size: u8, offset: u32) -> Self {
        AttributeDescriptor {
            slot,
            format,
            size,
            offset,
            normalized: false,
        }
    }

    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Size of the whole field in bytes.
    #[inline]
    pub fn bytes(&self) -> u32 {
        u32::from(self.size) * self.format.size()
    }
}

/// A validated set of attribute descriptors sharing one stride.
///
/// Every descriptor fits in the record, slots are unique and no two fields share a byte.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VertexLayout {
    stride: u32,
    attributes: SmallVec<[AttributeDescriptor; 4]>,
}

impl VertexLayout {
    /// Creates a layout from descriptors with explicit offsets.
    pub fn new(stride: u32, attributes: &[AttributeDescriptor]) -> Result<Self> {
        if stride == 0 {
            return Err(violation("stride must be positive"));
        }

        if attributes.len() > MAX_VERTEX_ATTRIBUTES {
            return Err(violation(format!(
                "{} attributes exceed the limit of {}",
                attributes.len(),
                MAX_VERTEX_ATTRIBUTES
            )));
        }

        for (i, v) in attributes.iter().enumerate() {
            if v.size == 0 || v.size > 4 {
                return Err(violation(format!(
                    "attribute at slot {} has {} components",
                    v.slot, v.size
                )));
            }

            if v.slot as usize >= MAX_VERTEX_ATTRIBUTES {
                return Err(violation(format!("slot {} is out of range", v.slot)));
            }

            if u64::from(v.offset) + u64::from(v.bytes()) > u64::from(stride) {
                return Err(violation(format!(
                    "attribute at slot {} ends at byte {} beyond stride {}",
                    v.slot,
                    u64::from(v.offset) + u64::from(v.bytes()),
                    stride
                )));
            }

            for rhs in &attributes[..i] {
                if rhs.slot == v.slot {
                    return Err(violation(format!("slot {} is used twice", v.slot)));
                }

                if v.offset < rhs.offset + rhs.bytes() && rhs.offset < v.offset + v.bytes() {
                    return Err(violation(format!(
                        "attributes at slot {} and {} overlap",
                        rhs.slot, v.slot
                    )));
                }
            }
        }

        Ok(VertexLayout {
            stride,
            attributes: attributes.iter().cloned().collect(),
        })
    }

    /// Creates a new an empty `VertexLayoutBuilder`.
    #[inline]
    pub fn build() -> VertexLayoutBuilder {
        VertexLayoutBuilder::new()
    }

    /// Stride of single vertex record.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Returns the descriptor bound to `slot`.
    pub fn attribute(&self, slot: u32) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|v| v.slot == slot)
    }

    /// Relative offset of the field bound to `slot`.
    pub fn offset(&self, slot: u32) -> Option<u32> {
        self.attribute(slot).map(|v| v.offset)
    }
}

fn violation<T: Into<String>>(msg: T) -> Error {
    Error::LayoutViolation(msg.into())
}

/// Builds a tightly interleaved layout. Offsets are the sum of the sizes of the fields
/// declared before, and the stride is the size of all of them.
#[derive(Debug, Default)]
pub struct VertexLayoutBuilder {
    attributes: SmallVec<[AttributeDescriptor; 4]>,
}

impl VertexLayoutBuilder {
    #[inline]
    pub fn new() -> Self {
        VertexLayoutBuilder::default()
    }

    pub fn with(&mut self, slot: u32, format: VertexFormat, size: u8) -> &mut Self {
        self.attributes
            .push(AttributeDescriptor::new(slot, format, size, 0));
        self
    }

    pub fn with_normalized(&mut self, slot: u32, format: VertexFormat, size: u8) -> &mut Self {
        self.attributes
            .push(AttributeDescriptor::new(slot, format, size, 0).with_normalized(true));
        self
    }

    pub fn finish(&mut self) -> Result<VertexLayout> {
        let mut stride = 0;
        for v in &mut self.attributes {
            v.offset = stride;
            stride += v.bytes();
        }

        VertexLayout::new(stride, &self.attributes)
    }
}

/// Hint abouts the intended update strategy of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferHint {
    /// The resource is initialized with data and cannot be changed later, this
    /// is the most common and most efficient usage.
    Immutable,
    /// The resource is initialized without data, but will be be updated by the
    /// CPU in each frame.
    Dynamic,
}

impl Default for BufferHint {
    fn default() -> Self {
        BufferHint::Immutable
    }
}

/// Defines how the input vertex data is used to assemble primitives.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Primitive {
    /// Separate points.
    Points,
    /// Separate lines.
    Lines,
    /// Line strips.
    LineStrip,
    /// Separate triangles.
    Triangles,
    /// Triangle strips.
    TriangleStrip,
}

impl Default for Primitive {
    fn default() -> Self {
        Primitive::Triangles
    }
}

impl Primitive {
    /// Number of primitives assembled from `indices` vertices.
    pub fn assemble(self, indices: u32) -> u32 {
        match self {
            Primitive::Points => indices,
            Primitive::Lines => indices / 2,
            Primitive::LineStrip => indices.saturating_sub(1),
            Primitive::Triangles => indices / 3,
            Primitive::TriangleStrip => indices.saturating_sub(2),
        }
    }
}

/// Whether a draw walks the index buffer or the vertices in order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DrawMode {
    Indexed,
    Arrayed,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GeometryParams {
    pub layout: VertexLayout,
    pub hint: BufferHint,
}

impl GeometryParams {
    pub fn new(layout: VertexLayout) -> Self {
        GeometryParams {
            layout,
            hint: BufferHint::Immutable,
        }
    }

    pub fn with_hint(mut self, hint: BufferHint) -> Self {
        self.hint = hint;
        self
    }
}

/// GPU-resident vertex data, an optional index buffer and the vertex array that records
/// the attribute layout against them.
#[derive(Debug)]
pub struct GeometryBinding {
    params: GeometryParams,
    vbo: Option<BufferId>,
    ibo: Option<BufferId>,
    vao: Option<VertexArrayId>,
    num_vertices: u32,
    num_indices: u32,
}

impl GeometryBinding {
    /// Uploads `vertices` (and `indices`) and records the layout in a new vertex array.
    ///
    /// The data is validated against the layout before any GPU object is created.
    pub fn create(
        video: &mut dyn Visitor,
        params: GeometryParams,
        vertices: &[u8],
        indices: Option<&[u32]>,
    ) -> Result<Self> {
        let stride = params.layout.stride() as usize;
        if vertices.is_empty() || vertices.len() % stride != 0 {
            return Err(violation(format!(
                "{} bytes of vertex data is not a positive multiple of stride {}",
                vertices.len(),
                stride
            )));
        }

        let num_vertices = (vertices.len() / stride) as u32;
        if let Some(indices) = indices {
            if indices.is_empty() {
                return Err(Error::ResourceCreation("an empty index buffer".into()));
            }

            if let Some(&index) = indices.iter().find(|&&v| v >= num_vertices) {
                return Err(Error::IndexOutOfBounds {
                    index,
                    len: num_vertices,
                });
            }
        }

        let num_indices = indices.map(|v| v.len() as u32).unwrap_or(0);

        unsafe {
            let vbo = video.create_buffer(BufferTarget::Vertex, params.hint, vertices)?;

            let ibo = match indices {
                Some(indices) => {
                    let bytes = ::bytemuck::cast_slice(indices);
                    match video.create_buffer(BufferTarget::Index, params.hint, bytes) {
                        Ok(id) => Some(id),
                        Err(err) => {
                            video.delete_buffer(vbo)?;
                            return Err(err);
                        }
                    }
                }
                None => None,
            };

            let vao = match video.create_vertex_array(vbo, ibo, &params.layout) {
                Ok(id) => id,
                Err(err) => {
                    video.delete_buffer(vbo)?;
                    if let Some(ibo) = ibo {
                        video.delete_buffer(ibo)?;
                    }
                    return Err(err);
                }
            };

            debug!(
                "Created geometry {} with {} vertices and {} indices.",
                vao, num_vertices, num_indices
            );

            Ok(GeometryBinding {
                params,
                vbo: Some(vbo),
                ibo,
                vao: Some(vao),
                num_vertices,
                num_indices,
            })
        }
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.params.layout
    }

    #[inline]
    pub fn hint(&self) -> BufferHint {
        self.params.hint
    }

    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    #[inline]
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    #[inline]
    pub fn has_indices(&self) -> bool {
        self.ibo.is_some()
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.vao.is_none()
    }

    /// The mode draws use unless told otherwise.
    pub fn default_mode(&self) -> DrawMode {
        if self.has_indices() {
            DrawMode::Indexed
        } else {
            DrawMode::Arrayed
        }
    }

    /// Makes the vertex array of this binding the current one.
    pub fn bind(&self, video: &mut dyn Visitor) -> Result<()> {
        let vao = self.vao.ok_or(Error::GeometryReleased)?;
        unsafe { video.bind_vertex_array(vao) }
    }

    /// Binds this geometry and draws it with the current program. Returns the number of
    /// assembled primitives.
    pub fn draw(&self, video: &mut dyn Visitor, primitive: Primitive, mode: DrawMode) -> Result<u32> {
        self.bind(video)?;

        let count = match mode {
            DrawMode::Indexed => {
                if self.ibo.is_none() {
                    return Err(Error::MissingIndexBuffer);
                }

                unsafe { video.draw_elements(primitive, self.num_indices, 0)? };
                self.num_indices
            }
            DrawMode::Arrayed => {
                unsafe { video.draw_arrays(primitive, 0, self.num_vertices)? };
                self.num_vertices
            }
        };

        Ok(primitive.assemble(count))
    }

    /// Replaces part of the vertex data in place, starting at vertex `first`.
    pub fn update_vertices(&self, video: &mut dyn Visitor, first: u32, data: &[u8]) -> Result<()> {
        let vbo = self.vbo.ok_or(Error::GeometryReleased)?;
        if self.params.hint == BufferHint::Immutable {
            return Err(Error::UpdateImmutableBuffer);
        }

        let stride = self.params.layout.stride() as usize;
        let offset = first as usize * stride;
        let len = self.num_vertices as usize * stride;
        if data.len() % stride != 0 || offset + data.len() > len {
            return Err(Error::OutOfBounds);
        }

        unsafe { video.update_buffer(BufferTarget::Vertex, vbo, offset, data) }
    }

    /// Destroys the buffers and the vertex array. Calling it twice does nothing.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        unsafe {
            if let Some(vao) = self.vao.take() {
                video.delete_vertex_array(vao)?;
                debug!("Released geometry {}.", vao);
            }

            if let Some(vbo) = self.vbo.take() {
                video.delete_buffer(vbo)?;
            }

            if let Some(ibo) = self.ibo.take() {
                video.delete_buffer(ibo)?;
            }
        }

        Ok(())
    }
}

impl Drop for GeometryBinding {
    fn drop(&mut self) {
        if let Some(vao) = self.vao {
            warn!("Geometry {} dropped without being released.", vao);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic() {
        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with_normalized(1, VertexFormat::Float, 2)
            .finish()
            .unwrap();

        assert_eq!(layout.stride(), 20);
        assert_eq!(layout.offset(0), Some(0));
        assert_eq!(layout.offset(1), Some(12));
        assert_eq!(layout.offset(2), None);

        let element = layout.attribute(1).unwrap();
        assert_eq!(element.format, VertexFormat::Float);
        assert_eq!(element.size, 2);
        assert_eq!(element.normalized, true);
        assert_eq!(layout.attribute(2), None);
    }

    #[test]
    fn interleave() {
        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(1, VertexFormat::Float, 3)
            .with(2, VertexFormat::Float, 2)
            .finish()
            .unwrap();

        assert_eq!(layout.stride(), 32);
        assert_eq!(layout.offset(1), Some(12));
        assert_eq!(layout.offset(2), Some(24));

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 2)
            .with_normalized(1, VertexFormat::UByte, 4)
            .with(2, VertexFormat::Short, 1)
            .finish()
            .unwrap();

        assert_eq!(layout.stride(), 14);
        assert_eq!(layout.offset(2), Some(12));
    }

    #[test]
    fn duplicated_slot() {
        let err = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(0, VertexFormat::Float, 2)
            .finish();

        match err {
            Err(Error::LayoutViolation(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn explicit_offsets() {
        let attrs = [
            AttributeDescriptor::new(0, VertexFormat::Float, 3, 0),
            AttributeDescriptor::new(2, VertexFormat::Float, 2, 16),
        ];

        // Padding between fields is allowed.
        let layout = VertexLayout::new(24, &attrs).unwrap();
        assert_eq!(layout.attributes().len(), 2);
        assert_eq!(layout.offset(2), Some(16));

        assert!(VertexLayout::new(20, &attrs).is_err());
        assert!(VertexLayout::new(0, &[]).is_err());
        assert!(VertexLayout::new(4, &[]).is_ok());
    }

    #[test]
    fn overlapped() {
        let attrs = [
            AttributeDescriptor::new(0, VertexFormat::Float, 3, 0),
            AttributeDescriptor::new(1, VertexFormat::Float, 2, 8),
        ];

        assert!(VertexLayout::new(32, &attrs).is_err());

        let attrs = [
            AttributeDescriptor::new(0, VertexFormat::Float, 2, 8),
            AttributeDescriptor::new(1, VertexFormat::Float, 2, 0),
        ];

        assert!(VertexLayout::new(16, &attrs).is_ok());
    }

    #[test]
    fn components() {
        let attrs = [AttributeDescriptor::new(0, VertexFormat::Float, 5, 0)];
        assert!(VertexLayout::new(32, &attrs).is_err());

        let attrs = [AttributeDescriptor::new(0, VertexFormat::Float, 0, 0)];
        assert!(VertexLayout::new(32, &attrs).is_err());

        let attrs = [AttributeDescriptor::new(
            MAX_VERTEX_ATTRIBUTES as u32,
            VertexFormat::Float,
            1,
            0,
        )];
        assert!(VertexLayout::new(32, &attrs).is_err());
    }

    #[test]
    fn too_many_elements() {
        let mut builder = VertexLayout::build();
        for i in 0..MAX_VERTEX_ATTRIBUTES + 1 {
            builder.with(i as u32, VertexFormat::Byte, 1);
        }

        assert!(builder.finish().is_err());
    }

    #[test]
    fn assemble() {
        assert_eq!(Primitive::Triangles.assemble(6), 2);
        assert_eq!(Primitive::TriangleStrip.assemble(4), 2);
        assert_eq!(Primitive::TriangleStrip.assemble(1), 0);
        assert_eq!(Primitive::Lines.assemble(5), 2);
        assert_eq!(Primitive::LineStrip.assemble(5), 4);
        assert_eq!(Primitive::Points.assemble(3), 3);
    }
}
