//! Stretches the whole sprite sheet over the window for five seconds.

use std::process::ExitCode;

use blitkit::{Context, FrameTime, Scene, Texture, Timeout, WindowConfig};

const SHOW_MS: u32 = 5000;

struct Lesson {
    sprites: Texture,
    shown: Timeout,
}

impl Scene for Lesson {
    fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
        let sprites = Texture::load(blitkit::data_path("M484SpaceSoldier.png"))?;
        Ok(Self {
            sprites,
            shown: Timeout::new(SHOW_MS),
        })
    }

    fn update(&mut self, context: &mut Context, frame: FrameTime) {
        // a close request left in the queue still ends the loop
        if self.shown.expired(frame) {
            context.quit();
        }
    }

    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
        context.clear();
        context.copy(&self.sprites, None, None);
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();
    blitkit::exit_on_error(blitkit::run::<Lesson>(
        WindowConfig::default().with_title("lesson00"),
    ))
}
