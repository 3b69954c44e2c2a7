//! Draws the standing soldier on the centre line for five seconds.

use std::process::ExitCode;

use blitkit::runner::{RunnerState, vcenter};
use blitkit::{Context, FrameTime, Scene, Texture, Timeout, WindowConfig};

const SHOW_MS: u32 = 5000;

struct Lesson {
    sprites: Texture,
    shown: Timeout,
    state: RunnerState,
}

impl Scene for Lesson {
    fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
        Ok(Self {
            sprites: Texture::load(blitkit::data_path("M484SpaceSoldier.png"))?,
            shown: Timeout::new(SHOW_MS),
            state: RunnerState::new(),
        })
    }

    fn update(&mut self, context: &mut Context, frame: FrameTime) {
        if self.shown.expired(frame) {
            context.quit();
        }
    }

    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
        context.clear();
        let dst = self.state.sprite_rect(vcenter(context));
        context.copy(&self.sprites, Some(self.state.sprite_frame()), Some(dst));
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();
    blitkit::exit_on_error(blitkit::run::<Lesson>(
        WindowConfig::default().with_title("lesson01"),
    ))
}
