//! blitkit - a thin 2D sprite layer over winit and wgpu.
//!
//! A program implements [`Scene`] and hands it to [`run`]. Every frame the
//! scene drains pending input with [`Context::poll_event`], updates its
//! state, and records texture copies on the [`Context`]; the frame loop then
//! clears the window, executes the copies in order and presents.
//!
//! # Example
//! ```no_run
//! use blitkit::{Context, Event, FrameTime, Key, Rect, Scene, Texture};
//!
//! struct Demo {
//!     sprites: Texture,
//! }
//!
//! impl Scene for Demo {
//!     fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
//!         let sprites = Texture::load(blitkit::data_path("M484SpaceSoldier.png"))?;
//!         Ok(Self { sprites })
//!     }
//!
//!     fn update(&mut self, context: &mut Context, _frame: FrameTime) {
//!         while let Some(event) = context.poll_event() {
//!             if event == Event::Quit || event.is_key_down(Key::Escape) {
//!                 context.quit();
//!             }
//!         }
//!     }
//!
//!     fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
//!         context.clear();
//!         context.copy(&self.sprites, Some(Rect::new(8, 11, 50, 50)), Some(Rect::new(0, 0, 50, 50)));
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     blitkit::exit_on_error(blitkit::run::<Demo>(blitkit::WindowConfig::default()))
//! }
//! ```

mod clock;
mod color;
mod config;
mod drawable;
mod event;
mod font;
mod graphics;
mod input;
mod key;
mod platform;
mod rect;
pub mod runner;
mod sprite_batch;
mod surface;
mod texture;
mod window;

use std::process::ExitCode;

use anyhow::Context as _;
use winit::event_loop::{ControlFlow, EventLoop};

use drawable::{CopyRequest, DrawCommand};
use event::EventQueue;

pub use clock::{FrameTime, Timeout};
pub use color::Color;
pub use config::{
    DATA_PATH_ENV, DEBUG_DRAW_ENV, FrameConfig, PRESENT_MODE_ENV, WindowConfig, data_dir,
    data_path,
};
pub use event::Event;
pub use font::Font;
pub use input::InputManager;
pub use key::Key;
pub use rect::{Flip, Point, Rect};
pub use surface::Surface;
pub use texture::{BlendMode, PixelFormat, Texture};

/// Per-frame state shared between the frame loop and a scene.
///
/// Holds the pending input events, the monotonic clock, the output size and
/// the list of copies recorded for the current frame.
#[derive(Debug)]
pub struct Context {
    draw_list: Vec<DrawCommand>,
    events: EventQueue,
    input: InputManager,
    clock: clock::Clock,
    output_size: (u32, u32),
    draw_color: Color,
    clear_color: Color,
    quit_requested: bool,
    debug_draw: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            draw_list: Vec::new(),
            events: EventQueue::new(),
            input: InputManager::new(),
            clock: clock::Clock::new(),
            output_size: (0, 0),
            draw_color: Color::BLACK,
            clear_color: Color::BLACK,
            quit_requested: false,
            debug_draw: config::flag_from_env(DEBUG_DRAW_ENV),
        }
    }

    /// Next pending event, or `None` once this frame's queue is drained. Never blocks.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.poll()
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Asks the frame loop to stop after the current update.
    pub fn quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Milliseconds since the window and renderer came up.
    pub fn ticks(&self) -> u32 {
        self.clock.ticks()
    }

    pub(crate) fn restart_clock(&mut self) {
        self.clock.restart();
    }

    /// Output size in physical pixels.
    pub fn output_size(&self) -> (u32, u32) {
        self.output_size
    }

    pub fn output_width(&self) -> u32 {
        self.output_size.0
    }

    pub fn output_height(&self) -> u32 {
        self.output_size.1
    }

    pub(crate) fn set_output_size(&mut self, width: u32, height: u32) {
        self.output_size = (width, height);
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    /// Colour used by [`Context::clear`].
    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    /// Fills the whole output with the draw colour, discarding earlier copies this frame.
    pub fn clear(&mut self) {
        self.draw_list.clear();
        self.clear_color = self.draw_color;
    }

    /// Copies `src` of `texture` (all of it for `None`) onto `dst` (the whole output for `None`).
    pub fn copy(&mut self, texture: &Texture, src: Option<Rect>, dst: Option<Rect>) {
        self.copy_ex(texture, src, dst, 0.0, None, Flip::None);
    }

    /// Like [`Context::copy`], rotating `angle` degrees clockwise around
    /// `center` (relative to `dst`, its middle for `None`) and mirroring per `flip`.
    pub fn copy_ex(
        &mut self,
        texture: &Texture,
        src: Option<Rect>,
        dst: Option<Rect>,
        angle: f64,
        center: Option<Point>,
        flip: Flip,
    ) {
        let output = Rect::sized(self.output_size.0, self.output_size.1);
        let request = CopyRequest {
            texture_size: (texture.width(), texture.height()),
            src,
            dst: dst.unwrap_or(output),
            angle_degrees: angle,
            center,
            flip,
            tint: texture.tint(),
        };
        let Some(instance) = request.resolve() else {
            return;
        };
        self.push(DrawCommand {
            texture: texture.id,
            blend: texture.blend_mode(),
            instance,
        });
    }

    fn push(&mut self, command: DrawCommand) {
        if !command.is_rotated() && !self.is_visible(&command) {
            return;
        }
        if self.debug_draw {
            log::debug!(
                "copy texture #{} dst={:?} uv={:?} blend={:?}",
                command.texture,
                command.instance.dst,
                command.instance.uv,
                command.blend
            );
        }
        self.draw_list.push(command);
    }

    fn is_visible(&self, command: &DrawCommand) -> bool {
        let [x, y, w, h] = command.dst_rect();
        let (sw, sh) = (self.output_size.0 as f32, self.output_size.1 as f32);
        !(x + w <= 0.0 || y + h <= 0.0 || x >= sw || y >= sh)
    }

    pub(crate) fn begin_frame(&mut self) {
        self.draw_list.clear();
        self.clear_color = self.draw_color;
    }

    /// Drops events the scene left unread; true if one of them was a quit request.
    pub(crate) fn discard_unread_events(&mut self) -> bool {
        self.events.drain_for_quit()
    }

    pub(crate) fn draw_list(&self) -> &[DrawCommand] {
        &self.draw_list
    }

    pub(crate) fn clear_color(&self) -> Color {
        self.clear_color
    }
}

pub fn key_down(context: &Context, key: Key) -> bool {
    context.input().key_down(key)
}

pub fn key_pressed(context: &Context, key: Key) -> bool {
    context.input().key_pressed(key)
}

pub fn key_released(context: &Context, key: Key) -> bool {
    context.input().key_released(key)
}

/// A program driven by the frame loop.
pub trait Scene {
    /// Called once the window and renderer exist. Load textures and fonts here;
    /// an error aborts [`run`].
    fn initialize(context: &mut Context) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Called first every frame: drain events and advance state.
    ///
    /// A [`Event::Quit`] left unread in the queue ends the loop after this call.
    fn update(&mut self, context: &mut Context, frame: FrameTime);

    /// Records this frame's copies. An error aborts [`run`].
    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()>;
}

/// Opens a window and drives `T` until it quits or fails.
///
/// Returns `Ok(())` on a normal quit. Can only be called once per process.
pub fn run<T: Scene + 'static>(window: WindowConfig) -> anyhow::Result<()> {
    run_with::<T>(window, FrameConfig::default())
}

/// [`run`] with explicit frame pacing.
pub fn run_with<T: Scene + 'static>(window: WindowConfig, frame: FrameConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = window::App::new::<T>(window, frame);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;
    app.into_result()
}

/// Maps the outcome of [`run`] to a process exit code, reporting failures on stderr.
pub fn exit_on_error(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
