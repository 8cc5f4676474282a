extern crate env_logger;
extern crate lantern;

use lantern::errors::Result;
use lantern::prelude::*;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;

void main()
{
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}";

const FS: &str = "#version 330 core
out vec4 FragColor;

void main()
{
    FragColor = vec4(1.0f, 0.5f, 0.2f, 1.0f);
}";

#[rustfmt::skip]
const VERTICES: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

struct HelloTriangle {
    program: ShaderProgram,
    quad: GeometryBinding,
    driver: FrameDriver,
}

impl Application for HelloTriangle {
    fn on_setup(engine: &mut Engine) -> Result<Self> {
        let video = engine.video();
        let program = ShaderProgram::from_sources(video, &ShaderSources::new(VS, FS))?;

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .finish()?;

        let quad = GeometryBinding::create(
            video,
            GeometryParams::new(layout),
            bytemuck::cast_slice(&VERTICES),
            Some(&INDICES[..]),
        )?;

        Ok(HelloTriangle {
            program,
            quad,
            driver: FrameDriver::new(),
        })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        let mut frame = engine.frame();
        frame.push(DrawCall::new(&self.program, &self.quad));
        self.driver.submit(engine.video(), &frame)?;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        self.quad.release(engine.video())?;
        self.program.release(engine.video())?;
        Ok(())
    }
}

fn main() {
    env_logger::init();

    let mut settings = Settings::default();
    settings.window.title = "Hello Triangle".to_owned();

    let run = settings
        .merge_env()
        .and_then(|settings| Engine::new(&settings))
        .and_then(|engine| engine.run::<HelloTriangle>());

    if let Err(err) = run {
        eprintln!("{}", err);
        ::std::process::exit(1);
    }
}
