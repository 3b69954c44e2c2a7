//! A proper main loop: the standing soldier stays up until the window is
//! closed or Escape/Q is pressed.

use std::process::ExitCode;

use blitkit::runner::{RunnerState, is_quit_event};
use blitkit::{Context, FrameTime, Scene, Texture, WindowConfig};

struct Lesson {
    sprites: Texture,
    state: RunnerState,
}

impl Scene for Lesson {
    fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
        Ok(Self {
            sprites: Texture::load(blitkit::data_path("M484SpaceSoldier.png"))?,
            state: RunnerState::new(),
        })
    }

    fn update(&mut self, context: &mut Context, _frame: FrameTime) {
        while let Some(event) = context.poll_event() {
            if is_quit_event(&event) {
                log::info!("quitting on {event:?}");
                context.quit();
            }
        }
    }

    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
        context.clear();
        self.state.draw_sprite(context, &self.sprites);
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();
    blitkit::exit_on_error(blitkit::run::<Lesson>(
        WindowConfig::default().with_title("lesson02"),
    ))
}
