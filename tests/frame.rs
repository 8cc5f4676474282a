extern crate bytemuck;
extern crate lantern;

use lantern::prelude::*;
use lantern::video::errors::Error;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;

uniform mat4 model;

void main()
{
    gl_Position = model * vec4(aPos, 1.0);
}";

const FS: &str = "#version 330 core
out vec4 FragColor;

uniform sampler2D texture1;
uniform vec4 tint;

void main()
{
    FragColor = texture(texture1, vec2(0.5, 0.5)) * tint;
}";

const CONSTANT: &str = "#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}";

#[rustfmt::skip]
const QUAD: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

fn quad(video: &mut dyn Visitor) -> GeometryBinding {
    let layout = VertexLayout::build()
        .with(0, VertexFormat::Float, 3)
        .finish()
        .unwrap();

    let params = GeometryParams::new(layout);
    GeometryBinding::create(video, params, bytemuck::cast_slice(&QUAD), Some(&INDICES[..]))
        .unwrap()
}

#[test]
fn indexed_quad() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));

    let sources = ShaderSources::new(VS.replace("model * ", ""), CONSTANT);
    let mut program = ShaderProgram::from_sources(&mut video, &sources).unwrap();
    let mut geometry = quad(&mut video);

    let mut frame = Frame::new(ClearParams::default());
    frame.push(DrawCall::new(&program, &geometry));

    let mut driver = FrameDriver::new();
    let stats = driver.submit(&mut video, &frame).unwrap();
    assert_eq!(stats, FrameStats { draws: 1, primitives: 2 });
    assert_eq!(driver.frames(), 1);

    // Two triangles worth of vertices, and one fragment per covered pixel of the 4x4
    // pixels in the middle of the viewport.
    let counters = video.counters();
    assert_eq!(counters.draws, 1);
    assert_eq!(counters.vertex_invocations, 6);
    assert_eq!(counters.fragment_invocations, 16);
    assert_eq!(counters.max_index, Some(3));
    assert_eq!(counters.clears, 1);
    assert_eq!(video.clear_color(), Some(Color::black()));

    assert_eq!(video.stats().total(), 4);
    drop(frame);
    geometry.release(&mut video).unwrap();
    program.release(&mut video).unwrap();
    assert_eq!(video.stats().total(), 0);
}

#[test]
fn bindings() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));

    let mut program =
        ShaderProgram::from_sources(&mut video, &ShaderSources::new(VS, FS)).unwrap();
    let mut geometry = quad(&mut video);

    let image = ImageData::new(1, 1, 4, vec![255; 4]).unwrap();
    let mut texture = Texture::create(&mut video, TextureParams::default(), &image).unwrap();

    let identity = Matrix4::<f32>::from_scale(1.0);
    let half = Matrix4::<f32>::from_scale(0.5);

    let clear = ClearParams {
        color: Some(Color::new(0.2, 0.3, 0.3, 1.0)),
        depth: Some(1.0),
    };

    let mut frame = Frame::new(clear).with_depth_test(true);
    frame.push(
        DrawCall::new(&program, &geometry)
            .with_texture("texture1", &texture)
            .with_uniform("tint", Color::white())
            .with_uniform("unused", 1.0f32)
            .with_instance(vec![("model", UniformVariable::from(identity))])
            .with_instance(vec![("model", UniformVariable::from(half))]),
    );

    let mut driver = FrameDriver::new();
    let stats = driver.submit(&mut video, &frame).unwrap();
    assert_eq!(stats.draws, 2);
    assert_eq!(stats.primitives, 4);
    assert!(video.depth_test());

    let id = program.id().unwrap();
    assert_eq!(video.current_program(), Some(id));
    assert_eq!(video.texture_unit(0), texture.id());
    assert_eq!(video.uniform_value(id, "texture1"), Some(UniformVariable::I32(0)));
    assert_eq!(
        video.uniform_value(id, "tint"),
        Some(UniformVariable::Vector4f([1.0, 1.0, 1.0, 1.0]))
    );

    // The last instance wins.
    assert_eq!(video.uniform_value(id, "model"), Some(UniformVariable::from(half)));
    assert_eq!(video.counters().vertex_invocations, 12);

    drop(frame);
    texture.release(&mut video).unwrap();
    geometry.release(&mut video).unwrap();
    program.release(&mut video).unwrap();
    assert_eq!(video.stats().total(), 0);
}

#[test]
fn released_resources() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));

    let sources = ShaderSources::new(VS, CONSTANT);
    let mut program = ShaderProgram::from_sources(&mut video, &sources).unwrap();
    let mut geometry = quad(&mut video);
    program.release(&mut video).unwrap();

    let mut driver = FrameDriver::new();
    {
        let mut frame = Frame::default();
        frame.push(DrawCall::new(&program, &geometry));

        match driver.submit(&mut video, &frame) {
            Err(Error::ProgramReleased) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(video.counters().draws, 0);
    assert_eq!(driver.frames(), 0);
    geometry.release(&mut video).unwrap();
}

#[test]
fn arrayed() {
    let mut video = HeadlessVisitor::with_dimensions(Vector2::new(8, 8));

    let sources = ShaderSources::new(VS, CONSTANT);
    let mut program = ShaderProgram::from_sources(&mut video, &sources).unwrap();
    let mut geometry = quad(&mut video);

    let mut driver = FrameDriver::new();
    {
        let mut frame = Frame::default();
        frame.push(
            DrawCall::new(&program, &geometry)
                .with_mode(DrawMode::Arrayed)
                .with_primitive(Primitive::TriangleStrip),
        );

        let stats = driver.submit(&mut video, &frame).unwrap();
        assert_eq!(stats.primitives, 2);
    }

    assert_eq!(video.counters().vertex_invocations, 4);
    assert_eq!(video.counters().max_index, Some(3));

    geometry.release(&mut video).unwrap();
    program.release(&mut video).unwrap();
}
