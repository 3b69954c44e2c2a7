//! Alpha blending: colour-keyed sprites over a tinted gradient floor, a
//! translucent reflection and a live status line.

use std::process::ExitCode;

use anyhow::Context as _;
use blitkit::runner::{self, RunnerState};
use blitkit::{
    BlendMode, Color, Context, Font, FrameTime, PixelFormat, Rect, Scene, Surface, Texture,
    WindowConfig,
};

const GRADIENT_HEIGHT: u32 = 256;
const FONT_POINTS: u32 = 12;

struct Lesson {
    sprites: Texture,
    gradient: Texture,
    font: Font,
    text: Option<Texture>,
    state: RunnerState,
}

/// 1x256 grey ramp from white down to black, three bytes per pixel.
fn gradient_pixels() -> Vec<u8> {
    (0..GRADIENT_HEIGHT as usize * 3)
        .map(|n| 255 - (n / 3) as u8)
        .collect()
}

impl Scene for Lesson {
    fn initialize(_context: &mut Context) -> anyhow::Result<Self> {
        let mut sheet = Surface::load(blitkit::data_path("M484SpaceSoldier.png"))?;
        sheet.set_color_key(Some(Color::BLACK));
        let mut sprites = Texture::from_surface(&sheet)?;
        sprites.set_blend_mode(BlendMode::Blend);

        let mut gradient = Texture::new_static(PixelFormat::Bgr24, 1, GRADIENT_HEIGHT)?;
        gradient
            .update(None, &gradient_pixels(), 3)
            .context("failed to upload gradient")?
            .set_blend_mode(BlendMode::Blend)
            .set_color_mod(0, 255, 255)
            .set_alpha_mod(85);

        let font = Font::open(blitkit::data_path("Vera.ttf"), FONT_POINTS)?;

        Ok(Self {
            sprites,
            gradient,
            font,
            text: None,
            state: RunnerState::new(),
        })
    }

    fn update(&mut self, context: &mut Context, frame: FrameTime) {
        self.state.handle_events(context);
        self.state.update(frame, context.output_width());
    }

    fn draw(&mut self, context: &mut Context) -> anyhow::Result<()> {
        context.clear();
        runner::draw_ground(context, &self.gradient);
        self.state.draw_sprite(context, &self.sprites);
        self.state.draw_reflection(context, &mut self.sprites);

        let surface = self
            .font
            .render_blended(&self.state.status_line(), Color::WHITE)?;
        let text = self.text.insert(Texture::from_surface(&surface)?);
        let dst = Rect::sized(text.width(), text.height());
        context.copy(text, None, Some(dst));
        Ok(())
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .init();
    blitkit::exit_on_error(blitkit::run::<Lesson>(
        WindowConfig::default().with_title("lesson07"),
    ))
}
