extern crate env_logger;
extern crate lantern;

use std::fs;

use lantern::errors::Result;
use lantern::prelude::*;

#[rustfmt::skip]
const VERTICES: [f32; 36] = [
    // positions         // colors              // texture coords
     0.5,  0.5, 0.0,     1.0, 0.0, 0.0, 1.0,    1.0, 1.0, // top right
     0.5, -0.5, 0.0,     0.0, 1.0, 0.0, 1.0,    1.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,     0.0, 0.0, 1.0, 1.0,    0.0, 0.0, // bottom left
    -0.5,  0.5, 0.0,     1.0, 1.0, 0.0, 1.0,    0.0, 1.0, // top left
];

const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

fn asset(name: &str) -> String {
    format!("{}/demos/assets/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn load_texture(video: &mut dyn Visitor, name: &str) -> Result<Texture> {
    let bytes = fs::read(asset(name))?;
    // Images are stored top row first, while texture coordinates start at the bottom.
    let image = ImageData::decode(&bytes, true)?;
    Ok(Texture::create(video, TextureParams::default(), &image)?)
}

struct Textures {
    program: ShaderProgram,
    quad: GeometryBinding,
    container: Texture,
    face: Texture,
    driver: FrameDriver,
}

impl Application for Textures {
    fn on_setup(engine: &mut Engine) -> Result<Self> {
        let video = engine.video();

        let sources = ShaderSources::from_files(
            asset("shaders/textures.vs"),
            asset("shaders/textures.fs"),
        )?;
        let program = ShaderProgram::from_sources(video, &sources)?;

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(1, VertexFormat::Float, 4)
            .with(2, VertexFormat::Float, 2)
            .finish()?;

        let quad = GeometryBinding::create(
            video,
            GeometryParams::new(layout),
            bytemuck::cast_slice(&VERTICES),
            Some(&INDICES[..]),
        )?;

        // The container has three channels and the face has four, the texture formats
        // follow whatever the decoder reports.
        let container = load_texture(video, "images/container.png")?;
        let face = load_texture(video, "images/awesomeface.png")?;

        Ok(Textures {
            program,
            quad,
            container,
            face,
            driver: FrameDriver::new(),
        })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        let mut frame = engine.frame();
        frame.push(
            DrawCall::new(&self.program, &self.quad)
                .with_texture("texture1", &self.container)
                .with_texture("texture2", &self.face),
        );

        self.driver.submit(engine.video(), &frame)?;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        let video = engine.video();
        self.container.release(video)?;
        self.face.release(video)?;
        self.quad.release(video)?;
        self.program.release(video)?;
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let mut settings = Settings::default();
    settings.window.title = "Textures".to_owned();

    let run = settings
        .merge_env()
        .and_then(|settings| Engine::new(&settings))
        .and_then(|engine| engine.run::<Textures>());

    if let Err(err) = run {
        eprintln!("{}", err);
        ::std::process::exit(1);
    }
}
