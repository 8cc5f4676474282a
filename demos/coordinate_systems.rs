extern crate env_logger;
extern crate lantern;

use std::fs;

use lantern::errors::Result;
use lantern::math::{perspective, Matrix4};
use lantern::prelude::*;

// position (3), color (4) and texture coordinates (2) of the 36 vertices of a cube.
#[rustfmt::skip]
const VERTICES: [f32; 36 * 9] = [
    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
     0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
     0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
     0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
    -0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,

    -0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
     0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
    -0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,

    -0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
    -0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
    -0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,

     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
     0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
     0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
     0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
     0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,

    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
     0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
     0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
     0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
    -0.5, -0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
    -0.5, -0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,

    -0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 1.0,
     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
     0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  1.0, 0.0,
    -0.5,  0.5,  0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 0.0,
    -0.5,  0.5, -0.5,  1.0, 1.0, 1.0, 1.0,  0.0, 1.0,
];

const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

fn asset(name: &str) -> String {
    format!("{}/demos/assets/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn load_texture(video: &mut dyn Visitor, name: &str) -> Result<Texture> {
    let bytes = fs::read(asset(name))?;
    let image = ImageData::decode(&bytes, true)?;
    Ok(Texture::create(video, TextureParams::default(), &image)?)
}

struct CoordinateSystems {
    program: ShaderProgram,
    cube: GeometryBinding,
    container: Texture,
    face: Texture,
    models: Vec<Matrix4<f32>>,
    driver: FrameDriver,
}

impl Application for CoordinateSystems {
    fn on_setup(engine: &mut Engine) -> Result<Self> {
        let video = engine.video();

        let sources = ShaderSources::from_files(
            asset("shaders/coordinate_systems.vs"),
            asset("shaders/coordinate_systems.fs"),
        )?;
        let program = ShaderProgram::from_sources(video, &sources)?;

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(1, VertexFormat::Float, 4)
            .with(2, VertexFormat::Float, 2)
            .finish()?;

        let cube = GeometryBinding::create(
            video,
            GeometryParams::new(layout),
            bytemuck::cast_slice(&VERTICES),
            None,
        )?;

        let container = load_texture(video, "images/container.png")?;
        let face = load_texture(video, "images/awesomeface.png")?;

        let axis = Vector3::new(1.0, 0.3, 0.5).normalize();
        let models = CUBE_POSITIONS
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let angle = Deg(20.0 * i as f32);
                Matrix4::from_translation(position.into()) * Matrix4::from_axis_angle(axis, angle)
            })
            .collect();

        Ok(CoordinateSystems {
            program,
            cube,
            container,
            face,
            models,
            driver: FrameDriver::new(),
        })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        let radius = 10.0;
        let time = engine.time() as f32;
        let eye = Point3::new(time.sin() * radius, 0.0, time.cos() * radius);
        let view = Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());

        let dimensions = engine.dimensions();
        let aspect = dimensions.x as f32 / dimensions.y.max(1) as f32;
        let projection = perspective(Deg(45.0), aspect, 0.1, 100.0);

        let mut call = DrawCall::new(&self.program, &self.cube)
            .with_texture("texture1", &self.container)
            .with_texture("texture2", &self.face)
            .with_uniform("view", view)
            .with_uniform("projection", projection);

        for model in &self.models {
            call = call.with_instance(vec![("model", UniformVariable::from(*model))]);
        }

        let mut frame = engine.frame();
        frame.push(call);
        self.driver.submit(engine.video(), &frame)?;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        let video = engine.video();
        self.container.release(video)?;
        self.face.release(video)?;
        self.cube.release(video)?;
        self.program.release(video)?;
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let mut settings = Settings::default();
    settings.window.title = "Coordinate Systems".to_owned();
    settings.engine.depth_test = true;

    let run = settings
        .merge_env()
        .and_then(|settings| Engine::new(&settings))
        .and_then(|engine| engine.run::<CoordinateSystems>());

    if let Err(err) = run {
        eprintln!("{}", err);
        ::std::process::exit(1);
    }
}
