use std::sync::Arc;

use anyhow::Context as _;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::FrameTimer;
use crate::graphics::Graphics;
use crate::platform::{set_global_graphics, with_graphics};
use crate::{Context, Event, FrameConfig, FrameTime, Scene, WindowConfig};

type SceneFactory = Box<dyn FnOnce(&mut Context) -> anyhow::Result<Box<dyn DynScene>>>;

/// Object-safe view of [`Scene`] used by the frame loop.
trait DynScene {
    fn update(&mut self, context: &mut Context, frame: FrameTime);
    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()>;
}

impl<T: Scene> DynScene for T {
    fn update(&mut self, context: &mut Context, frame: FrameTime) {
        Scene::update(self, context, frame);
    }

    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
        Scene::draw(self, context)
    }
}

fn window_attributes(cfg: &WindowConfig) -> WindowAttributes {
    Window::default_attributes()
        .with_title(cfg.title.clone())
        .with_inner_size(LogicalSize::new(cfg.width as f64, cfg.height as f64))
        .with_resizable(cfg.resizable)
}

/// Runs the GPU-free half of a frame: update, quit check, then draw.
///
/// Returns `Ok(false)` when the scene quit or left a close request unread; in
/// that case nothing is drawn and the frame must not be presented.
fn step(scene: &mut dyn DynScene, context: &mut Context, frame: FrameTime) -> anyhow::Result<bool> {
    context.begin_frame();
    scene.update(context, frame);
    let unread_quit = context.discard_unread_events();
    if context.quit_requested() || unread_quit {
        return Ok(false);
    }

    scene.draw(context)?;
    context.input_mut().end_frame();
    Ok(true)
}

pub(crate) struct App {
    window_config: WindowConfig,
    frame_config: FrameConfig,
    window: Option<Arc<Window>>,
    instance: Option<wgpu::Instance>,
    surface: Option<wgpu::Surface<'static>>,
    context: Context,
    timer: FrameTimer,
    scene: Option<Box<dyn DynScene>>,
    scene_factory: Option<SceneFactory>,
    error: Option<anyhow::Error>,
}

impl App {
    pub(crate) fn new<T: Scene + 'static>(window_config: WindowConfig, frame_config: FrameConfig) -> Self {
        let context = Context::new();
        let timer = FrameTimer::new(context.ticks());
        Self {
            window_config,
            frame_config,
            window: None,
            instance: None,
            surface: None,
            context,
            timer,
            scene: None,
            scene_factory: Some(Box::new(|ctx: &mut Context| {
                let scene = T::initialize(ctx)?;
                Ok(Box::new(scene) as Box<dyn DynScene>)
            })),
            error: None,
        }
    }

    /// Outcome of the run once the event loop has returned.
    pub(crate) fn into_result(mut self) -> anyhow::Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Keeps the first fatal error; `run` hands it to the caller, which reports it.
    fn record_error(&mut self, err: anyhow::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.record_error(err);
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(window_attributes(&self.window_config))
                .context("failed to create window")?,
        );
        let size = window.inner_size();
        log::info!("opened window {}x{}", size.width, size.height);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create surface")?;
        let graphics = pollster::block_on(Graphics::new(
            &instance,
            &surface,
            size.width,
            size.height,
        ))
        .context("failed to initialize renderer")?;
        set_global_graphics(graphics)?;

        // ticks count from here, not from before window and adapter setup
        self.context.restart_clock();
        self.context.set_output_size(size.width, size.height);
        self.instance = Some(instance);
        self.window = Some(window);
        self.surface = Some(surface);

        if let Some(factory) = self.scene_factory.take() {
            self.scene = Some(factory(&mut self.context).context("scene initialization failed")?);
        }
        self.timer = FrameTimer::new(self.context.ticks());
        Ok(())
    }

    /// One iteration of the frame loop. Returns `Ok(false)` once the scene quits.
    fn frame(&mut self) -> anyhow::Result<bool> {
        let (Some(scene), Some(surface)) = (self.scene.as_mut(), self.surface.as_ref()) else {
            return Ok(true);
        };

        let frame = self.timer.tick(self.context.ticks());
        if !step(&mut **scene, &mut self.context, frame)? {
            return Ok(false);
        }

        match with_graphics(|g| match g.draw_context(surface, &self.context) {
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                g.reconfigure(surface);
                Ok(())
            }
            other => other,
        })? {
            Ok(()) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => anyhow::bail!("out of GPU memory while presenting"),
            Err(err) => log::warn!("skipped frame: {err}"),
        }

        if !self.frame_config.frame_delay.is_zero() {
            std::thread::sleep(self.frame_config.frame_delay);
        }
        Ok(true)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.context.push_event(Event::Quit),
            WindowEvent::Resized(new_size) => {
                self.context.set_output_size(new_size.width, new_size.height);
            }
            WindowEvent::Focused(focused) => self.context.input_mut().handle_focus(focused),
            WindowEvent::KeyboardInput { event, .. } => {
                self.context
                    .input_mut()
                    .handle_keyboard_input(event.state, event.physical_key);
                if let Some(ev) = Event::from_keyboard(event.state, event.physical_key, event.repeat) {
                    self.context.push_event(ev);
                }
            }
            WindowEvent::RedrawRequested => match self.frame() {
                Ok(true) => {}
                Ok(false) => {
                    log::info!("quit requested");
                    event_loop.exit();
                }
                Err(err) => self.fail(event_loop, err),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Scene textures and the surface go before the window.
        self.scene.take();
        self.surface.take();
        self.instance.take();
        self.window.take();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use winit::dpi::Size;

    use super::*;
    use crate::Key;
    use crate::runner::RunnerState;

    type Calls = Rc<RefCell<Vec<&'static str>>>;

    /// Runs the soldier and records which hooks ran.
    #[derive(Default)]
    struct Soldier {
        state: RunnerState,
        calls: Calls,
    }

    impl Scene for Soldier {
        fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
            Ok(Self::default())
        }

        fn update(&mut self, context: &mut Context, frame: FrameTime) {
            self.calls.borrow_mut().push("update");
            self.state.handle_events(context);
            self.state.update(frame, context.output_width());
        }

        fn draw(&mut self, _context: &mut Context) -> anyhow::Result<()> {
            self.calls.borrow_mut().push("draw");
            Ok(())
        }
    }

    /// Never reads its events.
    #[derive(Default)]
    struct Idle {
        calls: Calls,
        fail_draw: bool,
    }

    impl Scene for Idle {
        fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
            Ok(Self::default())
        }

        fn update(&mut self, _context: &mut Context, _frame: FrameTime) {
            self.calls.borrow_mut().push("update");
        }

        fn draw(&mut self, _context: &mut Context) -> anyhow::Result<()> {
            self.calls.borrow_mut().push("draw");
            if self.fail_draw {
                anyhow::bail!("texture vanished");
            }
            Ok(())
        }
    }

    fn frame(ticks: u32, delta: u32) -> FrameTime {
        FrameTime { ticks, delta }
    }

    fn key_down(key: Key) -> Event {
        Event::KeyDown { key, repeat: false }
    }

    #[test]
    fn update_runs_before_draw() {
        let mut scene = Soldier::default();
        let mut ctx = Context::new();
        ctx.set_output_size(640, 480);
        ctx.push_event(key_down(Key::Right));

        assert!(step(&mut scene, &mut ctx, frame(500, 500)).unwrap());
        assert_eq!(*scene.calls.borrow(), vec!["update", "draw"]);
        assert!((scene.state.position() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn quit_mid_queue_ends_the_loop_without_drawing() {
        for quit in [Event::Quit, key_down(Key::Escape), key_down(Key::Q)] {
            let mut scene = Soldier::default();
            let mut ctx = Context::new();
            ctx.set_output_size(640, 480);
            ctx.push_event(key_down(Key::Right));
            ctx.push_event(quit);
            ctx.push_event(Event::KeyUp { key: Key::Right });

            assert!(!step(&mut scene, &mut ctx, frame(16, 16)).unwrap(), "{quit:?}");
            assert_eq!(*scene.calls.borrow(), vec!["update"], "{quit:?}");
        }
    }

    #[test]
    fn unread_close_request_ends_the_loop_without_drawing() {
        let mut scene = Idle::default();
        let mut ctx = Context::new();
        ctx.push_event(key_down(Key::Right));
        ctx.push_event(Event::Quit);

        assert!(!step(&mut scene, &mut ctx, frame(0, 0)).unwrap());
        assert_eq!(*scene.calls.borrow(), vec!["update"]);
    }

    #[test]
    fn unread_keys_are_dropped_and_the_loop_goes_on() {
        let mut scene = Idle::default();
        let mut ctx = Context::new();
        ctx.push_event(key_down(Key::Escape));

        assert!(step(&mut scene, &mut ctx, frame(0, 0)).unwrap());
        assert_eq!(ctx.poll_event(), None);
    }

    #[test]
    fn draw_errors_abort_the_frame() {
        let mut scene = Idle {
            fail_draw: true,
            ..Idle::default()
        };
        let mut ctx = Context::new();
        let err = step(&mut scene, &mut ctx, frame(0, 0)).unwrap_err();
        assert_eq!(err.to_string(), "texture vanished");
    }

    #[test]
    fn quitting_without_errors_is_success() {
        let app = App::new::<Soldier>(WindowConfig::default(), FrameConfig::default());
        assert!(app.into_result().is_ok());
    }

    #[test]
    fn first_fatal_error_is_returned_once() {
        let mut app = App::new::<Soldier>(WindowConfig::default(), FrameConfig::default());
        app.record_error(anyhow::anyhow!("no adapter"));
        app.record_error(anyhow::anyhow!("later failure"));
        let err = app.into_result().unwrap_err();
        assert_eq!(err.to_string(), "no adapter");
    }

    #[test]
    fn window_size_is_logical() {
        let attrs = window_attributes(&WindowConfig::default().with_title("lesson04"));
        assert_eq!(
            attrs.inner_size,
            Some(Size::Logical(LogicalSize::new(640.0, 480.0)))
        );
        assert_eq!(attrs.title, "lesson04");
        assert!(attrs.resizable);
    }
}
