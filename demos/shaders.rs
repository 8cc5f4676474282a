extern crate env_logger;
extern crate lantern;

use lantern::errors::Result;
use lantern::prelude::*;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;   // the position variable has attribute position 0
layout (location = 1) in vec4 aColor; // the color variable has attribute position 1

out vec4 ourColor;

uniform float xOffset;

void main()
{
    gl_Position = vec4(aPos.x + xOffset, aPos.y, aPos.z, 1.0);
    ourColor = aColor;
}";

const FS: &str = "#version 330 core
out vec4 FragColor;

in vec4 ourColor;

void main()
{
    FragColor = ourColor;
}";

#[rustfmt::skip]
const VERTICES: [f32; 21] = [
    // positions        // colors
     0.5, -0.5, 0.0,    1.0, 0.0, 0.0, 1.0, // bottom right
    -0.5, -0.5, 0.0,    0.0, 1.0, 0.0, 1.0, // bottom left
     0.0,  0.5, 0.0,    0.0, 0.0, 1.0, 1.0, // top
];

struct Shaders {
    program: ShaderProgram,
    triangle: GeometryBinding,
    driver: FrameDriver,
}

impl Application for Shaders {
    fn on_setup(engine: &mut Engine) -> Result<Self> {
        let video = engine.video();
        let program = ShaderProgram::from_sources(video, &ShaderSources::new(VS, FS))?;

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .with(1, VertexFormat::Float, 4)
            .finish()?;

        let triangle = GeometryBinding::create(
            video,
            GeometryParams::new(layout),
            bytemuck::cast_slice(&VERTICES),
            Some(&[0, 1, 2][..]),
        )?;

        Ok(Shaders {
            program,
            triangle,
            driver: FrameDriver::new(),
        })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        let offset = (engine.time().sin() * 0.25) as f32;

        let mut frame = engine.frame();
        frame.push(DrawCall::new(&self.program, &self.triangle).with_uniform("xOffset", offset));
        self.driver.submit(engine.video(), &frame)?;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        self.triangle.release(engine.video())?;
        self.program.release(engine.video())?;
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let mut settings = Settings::default();
    settings.window.title = "Shaders".to_owned();

    let run = settings
        .merge_env()
        .and_then(|settings| Engine::new(&settings))
        .and_then(|engine| engine.run::<Shaders>());

    if let Err(err) = run {
        eprintln!("{}", err);
        ::std::process::exit(1);
    }
}
