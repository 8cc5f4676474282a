use gl;
use glutin::dpi::{LogicalSize, PhysicalSize};
use glutin::event::Event as GlutinEvent;
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::platform::run_return::EventLoopExtRunReturn;
use glutin::window::WindowBuilder;
use glutin::{ContextBuilder, ContextWrapper, GlProfile, GlRequest, PossiblyCurrent};

use crate::math::prelude::Vector2;

use super::super::super::errors::*;
use super::super::super::events::Event;
use super::super::super::WindowParams;
use super::super::Visitor;
use super::types;

pub struct GlutinVisitor {
    context: ContextWrapper<PossiblyCurrent, glutin::window::Window>,
    events_loop: EventLoop<()>,
    close_on_escape: bool,
}

impl GlutinVisitor {
    pub fn new(params: &WindowParams) -> Result<Self> {
        let builder = WindowBuilder::new()
            .with_title(params.title.clone())
            .with_inner_size(LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ));

        let events_loop = EventLoop::new();
        let context = ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_gl_profile(GlProfile::Core)
            .with_gl(GlRequest::Latest)
            .with_vsync(params.vsync)
            .build_windowed(builder, &events_loop)?;

        let context = unsafe { context.make_current().map_err(|(_, err)| err)? };
        gl::load_with(|symbol| context.get_proc_address(symbol) as *const _);

        info!(
            "Created window {:?} with {:?}.",
            params.title,
            context.get_pixel_format()
        );

        Ok(GlutinVisitor {
            context,
            events_loop,
            close_on_escape: params.close_on_escape,
        })
    }
}

impl Visitor for GlutinVisitor {
    #[inline]
    fn show(&self) {
        self.context.window().set_visible(true);
    }

    #[inline]
    fn hide(&self) {
        self.context.window().set_visible(false);
    }

    #[inline]
    fn dimensions(&self) -> Vector2<u32> {
        let size = self.context.window().inner_size();
        Vector2::new(size.width, size.height)
    }

    #[inline]
    fn resize(&self, dimensions: Vector2<u32>) {
        self.context
            .resize(PhysicalSize::new(dimensions.x, dimensions.y));
    }

    fn poll_events(&mut self, events: &mut Vec<Event>) {
        let close_on_escape = self.close_on_escape;
        self.events_loop.run_return(|v, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match v {
                GlutinEvent::WindowEvent { ref event, .. } => {
                    if let Some(e) = types::from_window_event(event, close_on_escape) {
                        events.push(e);
                    }
                }
                GlutinEvent::MainEventsCleared => *control_flow = ControlFlow::Exit,
                _ => {}
            }
        });
    }

    #[inline]
    fn is_current(&self) -> bool {
        self.context.is_current()
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        self.context.swap_buffers()?;
        Ok(())
    }
}
