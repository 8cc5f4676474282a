extern crate bytemuck;
extern crate failure;
extern crate lantern;

use std::sync::atomic::{AtomicUsize, Ordering};

use lantern::errors::Result;
use lantern::prelude::*;

fn headless(frames: Option<u64>) -> Settings {
    let mut settings = Settings::default();
    settings.headless = true;
    settings.window.size = Vector2::new(8, 8);
    settings.engine.max_frames = frames;
    settings
}

static COUNTED: AtomicUsize = AtomicUsize::new(0);

struct Counter {
    updates: usize,
}

impl Application for Counter {
    fn on_setup(_: &mut Engine) -> Result<Self> {
        Ok(Counter { updates: 0 })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        assert_eq!(engine.frames(), self.updates as u64);
        self.updates += 1;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        assert_eq!(engine.frames(), 5);
        COUNTED.store(self.updates, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn max_frames() {
    let engine = Engine::new(&headless(Some(5))).unwrap();
    assert!(engine.window().is_headless());
    engine.run::<Counter>().unwrap();
    assert_eq!(COUNTED.load(Ordering::SeqCst), 5);
}

static CLOSED_AT: AtomicUsize = AtomicUsize::new(0);

struct Closer;

impl Application for Closer {
    fn on_setup(_: &mut Engine) -> Result<Self> {
        Ok(Closer)
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        match engine.frames() {
            0 => engine.window_mut().push_event(Event::Resized(Vector2::new(64, 32))),
            1 => assert_eq!(engine.dimensions(), Vector2::new(64, 32)),
            2 => engine.window_mut().push_event(Event::Closed),
            _ => panic!("the window should have been closed"),
        }

        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        assert!(engine.window().should_close());
        CLOSED_AT.store(engine.frames() as usize, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn close_event() {
    let engine = Engine::new(&headless(None)).unwrap();
    engine.run::<Closer>().unwrap();
    assert_eq!(CLOSED_AT.load(Ordering::SeqCst), 3);
}

static EXITED: AtomicUsize = AtomicUsize::new(0);

struct Failing;

impl Application for Failing {
    fn on_setup(_: &mut Engine) -> Result<Self> {
        Ok(Failing)
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        if engine.frames() == 1 {
            return Err(failure::err_msg("update failed"));
        }

        Ok(())
    }

    fn on_exit(&mut self, _: &mut Engine) -> Result<()> {
        EXITED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn failed_update() {
    let engine = Engine::new(&headless(Some(10))).unwrap();
    let err = engine.run::<Failing>().unwrap_err();
    assert_eq!(format!("{}", err), "update failed");
    assert_eq!(EXITED.load(Ordering::SeqCst), 1);
}

static DRAWN: AtomicUsize = AtomicUsize::new(0);

const VS: &str = "layout (location = 0) in vec3 aPos;
void main()
{
    gl_Position = vec4(aPos, 1.0);
}";

const FS: &str = "out vec4 FragColor;
uniform vec4 color;
void main()
{
    FragColor = color;
}";

struct Quad {
    program: ShaderProgram,
    geometry: GeometryBinding,
    driver: FrameDriver,
    primitives: u32,
}

impl Application for Quad {
    fn on_setup(engine: &mut Engine) -> Result<Self> {
        let video = engine.video();
        let program = ShaderProgram::from_sources(video, &ShaderSources::new(VS, FS))?;

        let layout = VertexLayout::build()
            .with(0, VertexFormat::Float, 3)
            .finish()?;

        let vertices: [f32; 12] = [
            0.5, 0.5, 0.0, 0.5, -0.5, 0.0, -0.5, -0.5, 0.0, -0.5, 0.5, 0.0,
        ];

        let geometry = GeometryBinding::create(
            video,
            GeometryParams::new(layout),
            bytemuck::cast_slice(&vertices),
            Some(&[0, 1, 3, 1, 2, 3][..]),
        )?;

        Ok(Quad {
            program,
            geometry,
            driver: FrameDriver::new(),
            primitives: 0,
        })
    }

    fn on_update(&mut self, engine: &mut Engine) -> Result<()> {
        let mut frame = engine.frame();
        assert_eq!(frame.clear, engine.clear_params());
        assert!(frame.depth_test);

        let color = Color::new(1.0, 0.5, 0.2, 1.0);
        frame.push(DrawCall::new(&self.program, &self.geometry).with_uniform("color", color));

        let stats = self.driver.submit(engine.video(), &frame)?;
        self.primitives += stats.primitives;
        Ok(())
    }

    fn on_exit(&mut self, engine: &mut Engine) -> Result<()> {
        assert_eq!(self.driver.frames(), 3);
        DRAWN.store(self.primitives as usize, Ordering::SeqCst);

        self.geometry.release(engine.video())?;
        self.program.release(engine.video())?;
        Ok(())
    }
}

#[test]
fn draw_quad() {
    let mut settings = headless(Some(3));
    settings.engine.depth_test = true;

    let engine = Engine::new(&settings).unwrap();
    assert_eq!(engine.clear_params().depth, Some(1.0));
    engine.run::<Quad>().unwrap();
    assert_eq!(DRAWN.load(Ordering::SeqCst), 6);
}

#[test]
fn shutdown() {
    struct Once;

    impl Application for Once {
        fn on_setup(engine: &mut Engine) -> Result<Self> {
            engine.shutdown();
            Ok(Once)
        }

        fn on_update(&mut self, _: &mut Engine) -> Result<()> {
            panic!("shutdown before the first frame");
        }
    }

    let engine = Engine::new(&headless(None)).unwrap();
    engine.run::<Once>().unwrap();
}
