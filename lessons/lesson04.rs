//! Keyboard control: hold the right arrow to make the soldier run.

use std::process::ExitCode;

use blitkit::runner::RunnerState;
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

    fn update(&mut self, context: &mut Context, frame: FrameTime) {
        self.state.handle_events(context);
        self.state.update(frame, context.output_width());
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
        WindowConfig::default().with_title("lesson04"),
    ))
}
