extern crate bytemuck;
extern crate lantern;

use lantern::prelude::*;
use lantern::video::errors::Error;

#[rustfmt::skip]
const QUAD: [f32; 12] = [
     0.5,  0.5, 0.0,
     0.5, -0.5, 0.0,
    -0.5, -0.5, 0.0,
    -0.5,  0.5, 0.0,
];

fn position() -> VertexLayout {
    VertexLayout::build()
        .with(0, VertexFormat::Float, 3)
        .finish()
        .unwrap()
}

fn expect_violation<T: ::std::fmt::Debug>(v: Result<T, Error>) {
    match v {
        Err(Error::LayoutViolation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn layouts() {
    let pos = AttributeDescriptor::new(0, VertexFormat::Float, 3, 0);
    let color = AttributeDescriptor::new(1, VertexFormat::Float, 4, 12);
    let uv = AttributeDescriptor::new(2, VertexFormat::Float, 2, 28);

    let layout = VertexLayout::new(36, &[pos, color, uv]).unwrap();
    assert_eq!(layout.stride(), 36);
    assert_eq!(layout.attributes().len(), 3);

    // Padding at the end of a record is allowed.
    assert!(VertexLayout::new(40, &[pos, color, uv]).is_ok());

    let duplicated = AttributeDescriptor::new(1, VertexFormat::Float, 2, 28);
    let overlapped = AttributeDescriptor::new(1, VertexFormat::Float, 4, 8);
    let components = AttributeDescriptor::new(0, VertexFormat::Float, 5, 0);
    let slot = AttributeDescriptor::new(16, VertexFormat::Float, 1, 0);

    expect_violation(VertexLayout::new(0, &[]));
    expect_violation(VertexLayout::new(32, &[pos, color, uv]));
    expect_violation(VertexLayout::new(36, &[pos, color, duplicated]));
    expect_violation(VertexLayout::new(36, &[pos, overlapped]));
    expect_violation(VertexLayout::new(36, &[components]));
    expect_violation(VertexLayout::new(36, &[slot]));

    // The builder computes the same offsets as the hand written descriptors.
    let built = VertexLayout::build()
        .with(0, VertexFormat::Float, 3)
        .with(1, VertexFormat::Float, 4)
        .with(2, VertexFormat::Float, 2)
        .finish()
        .unwrap();

    assert_eq!(built, layout);
}

#[test]
fn create() {
    let mut video = HeadlessVisitor::new();

    let indices = [0u32, 1, 3, 1, 2, 3];
    let mut quad = GeometryBinding::create(
        &mut video,
        GeometryParams::new(position()),
        bytemuck::cast_slice(&QUAD),
        Some(&indices[..]),
    )
    .unwrap();

    assert_eq!(quad.num_vertices(), 4);
    assert_eq!(quad.num_indices(), 6);
    assert!(quad.has_indices());
    assert_eq!(quad.default_mode(), DrawMode::Indexed);

    let stats = video.stats();
    assert_eq!(stats.buffers, 2);
    assert_eq!(stats.vertex_arrays, 1);

    // Creating the vertex array leaves the current binding alone.
    assert_eq!(video.current_vertex_array(), None);
    quad.bind(&mut video).unwrap();
    assert!(video.current_vertex_array().is_some());

    quad.release(&mut video).unwrap();
    assert!(quad.is_released());
    assert_eq!(video.stats().total(), 0);
    assert_eq!(video.current_vertex_array(), None);

    quad.release(&mut video).unwrap();
    match quad.bind(&mut video) {
        Err(Error::GeometryReleased) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn rejected_before_allocation() {
    let mut video = HeadlessVisitor::new();
    let bytes: &[u8] = bytemuck::cast_slice(&QUAD);

    // 48 bytes are not a multiple of a 20 bytes stride.
    let layout = VertexLayout::build()
        .with(0, VertexFormat::Float, 3)
        .with(1, VertexFormat::Float, 2)
        .finish()
        .unwrap();
    let params = GeometryParams::new(layout);
    expect_violation(GeometryBinding::create(&mut video, params, bytes, None));

    let params = GeometryParams::new(position());
    expect_violation(GeometryBinding::create(&mut video, params, &[], None));

    let params = GeometryParams::new(position());
    match GeometryBinding::create(&mut video, params, bytes, Some(&[0, 1, 4][..])) {
        Err(Error::IndexOutOfBounds { index, len }) => {
            assert_eq!(index, 4);
            assert_eq!(len, 4);
        }
        other => panic!("unexpected {:?}", other),
    }

    let params = GeometryParams::new(position());
    match GeometryBinding::create(&mut video, params, bytes, Some(&[] as &[u32])) {
        Err(Error::ResourceCreation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(video.stats().total(), 0);
}

#[test]
fn draw_modes() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));
    let vs = "layout (location = 0) in vec3 aPos;\nvoid main() {}";
    let fs = "out vec4 FragColor;\nvoid main() {}";
    let sources = ShaderSources::new(vs, fs);
    let mut program = ShaderProgram::from_sources(&mut video, &sources).unwrap();

    let mut triangles = GeometryBinding::create(
        &mut video,
        GeometryParams::new(position()),
        bytemuck::cast_slice(&QUAD[..9]),
        None,
    )
    .unwrap();

    program.activate(&mut video).unwrap();
    assert_eq!(triangles.default_mode(), DrawMode::Arrayed);
    match triangles.draw(&mut video, Primitive::Triangles, DrawMode::Indexed) {
        Err(Error::MissingIndexBuffer) => {}
        other => panic!("unexpected {:?}", other),
    }

    let primitives = triangles
        .draw(&mut video, Primitive::Triangles, DrawMode::Arrayed)
        .unwrap();

    assert_eq!(primitives, 1);
    assert_eq!(video.counters().vertex_invocations, 3);
    assert_eq!(video.counters().max_index, Some(2));

    triangles.release(&mut video).unwrap();
    program.release(&mut video).unwrap();
    assert_eq!(video.stats().total(), 0);
}

#[test]
fn update() {
    let mut video = HeadlessVisitor::new();
    let bytes: &[u8] = bytemuck::cast_slice(&QUAD);

    let mut fixed =
        GeometryBinding::create(&mut video, GeometryParams::new(position()), bytes, None).unwrap();
    match fixed.update_vertices(&mut video, 0, &bytes[..12]) {
        Err(Error::UpdateImmutableBuffer) => {}
        other => panic!("unexpected {:?}", other),
    }

    let params = GeometryParams::new(position()).with_hint(BufferHint::Dynamic);
    let mut dynamic = GeometryBinding::create(&mut video, params, bytes, None).unwrap();
    assert_eq!(dynamic.hint(), BufferHint::Dynamic);

    dynamic.update_vertices(&mut video, 3, &bytes[..12]).unwrap();
    dynamic.update_vertices(&mut video, 0, bytes).unwrap();

    for (first, len) in &[(4, 12), (3, 24), (0, 10)] {
        match dynamic.update_vertices(&mut video, *first, &bytes[..*len]) {
            Err(Error::OutOfBounds) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    fixed.release(&mut video).unwrap();
    dynamic.release(&mut video).unwrap();
    assert_eq!(video.stats().total(), 0);
}

#[test]
fn update_contents() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));
    let vs = "layout (location = 0) in vec3 aPos;\nvoid main() {}";
    let fs = "out vec4 FragColor;\nvoid main() {}";
    let sources = ShaderSources::new(vs, fs);
    let mut program = ShaderProgram::from_sources(&mut video, &sources).unwrap();
    program.activate(&mut video).unwrap();

    // A corner triangle whose edges miss every pixel center.
    #[rustfmt::skip]
    let corner: [f32; 9] = [
        -1.0, -1.0, 0.0,
         0.1, -1.0, 0.0,
        -1.0,  0.1, 0.0,
    ];

    // Covers the whole viewport.
    #[rustfmt::skip]
    let screen: [f32; 9] = [
        -1.0, -1.0, 0.0,
         3.0, -1.0, 0.0,
        -1.0,  3.0, 0.0,
    ];

    let params = GeometryParams::new(position()).with_hint(BufferHint::Dynamic);
    let mut triangle =
        GeometryBinding::create(&mut video, params, bytemuck::cast_slice(&corner), None).unwrap();

    triangle.draw(&mut video, Primitive::Triangles, DrawMode::Arrayed).unwrap();
    assert_eq!(video.counters().fragment_invocations, 10);

    triangle.update_vertices(&mut video, 0, bytemuck::cast_slice(&screen)).unwrap();
    video.reset_counters();
    triangle.draw(&mut video, Primitive::Triangles, DrawMode::Arrayed).unwrap();
    assert_eq!(video.counters().fragment_invocations, 64);

    // Replacing only the last vertex brings the corner back.
    triangle.update_vertices(&mut video, 2, bytemuck::cast_slice(&corner[6..])).unwrap();
    video.reset_counters();
    triangle.draw(&mut video, Primitive::Triangles, DrawMode::Arrayed).unwrap();
    assert!(video.counters().fragment_invocations < 64);

    triangle.release(&mut video).unwrap();
    program.release(&mut video).unwrap();
    assert_eq!(video.stats().total(), 0);
}
