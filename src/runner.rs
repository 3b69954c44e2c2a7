//! Movement and animation state of the running soldier shared by the lessons.
//!
//! The soldier stands still until the right arrow is held, then runs right at
//! a fixed speed cycling through eight frames of the sprite sheet, wrapping
//! back in from the left edge once it leaves the output.

use crate::{Context, Event, Flip, FrameTime, Key, Rect, Texture};

/// Horizontal speed while running, in pixels per millisecond.
pub const VELOCITY: f32 = 0.2;
/// Milliseconds each running frame is shown.
pub const FRAME_MS: u32 = 100;
/// Number of frames in the running cycle.
pub const RUN_FRAMES: u32 = 8;
/// Side of one sprite cell, in pixels.
pub const SPRITE_SIZE: i32 = 50;
/// Position the soldier re-enters from after leaving the right edge.
pub const WRAP_POSITION: f32 = -(SPRITE_SIZE as f32);
/// Alpha modulation of the mirrored reflection.
pub const REFLECTION_ALPHA: u8 = 127;

/// Key that makes the soldier run while held.
pub const MOVE_KEY: Key = Key::Right;

const STANDING: Rect = Rect::new(8, 11, SPRITE_SIZE, SPRITE_SIZE);
const RUN_ORIGIN: (i32, i32) = (8, 67);
const RUN_STRIDE: i32 = 51;

/// What the frame loop should do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// True for the window close request and the quit keys (Escape, Q).
pub fn is_quit_event(event: &Event) -> bool {
    match event {
        Event::Quit => true,
        Event::KeyDown { key, .. } => matches!(key, Key::Escape | Key::Q),
        Event::KeyUp { .. } => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunnerState {
    is_running: bool,
    run_phase: u32,
    position: f32,
}

impl RunnerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Index into the running cycle, always 0 while standing.
    pub fn run_phase(&self) -> u32 {
        self.run_phase
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Applies one event, returning [`Flow::Quit`] for quit requests.
    pub fn handle_event(&mut self, event: &Event) -> Flow {
        if is_quit_event(event) {
            return Flow::Quit;
        }
        if event.is_key_down(MOVE_KEY) {
            self.is_running = true;
        } else if event.is_key_up(MOVE_KEY) {
            self.is_running = false;
        }
        Flow::Continue
    }

    /// Drains every pending event of the context, requesting quit when asked to.
    pub fn handle_events(&mut self, context: &mut Context) {
        while let Some(event) = context.poll_event() {
            if self.handle_event(&event) == Flow::Quit {
                context.quit();
            }
        }
    }

    /// Advances position and animation by one frame.
    pub fn update(&mut self, frame: FrameTime, output_width: u32) {
        if self.is_running {
            self.position += frame.delta as f32 * VELOCITY;
            self.run_phase = (frame.ticks / FRAME_MS) % RUN_FRAMES;
        } else {
            self.run_phase = 0;
        }

        if self.position > output_width as f32 {
            self.position = WRAP_POSITION;
        }
    }

    /// Sprite sheet cell for the current state.
    pub fn sprite_frame(&self) -> Rect {
        if self.is_running {
            Rect::new(
                RUN_ORIGIN.0 + RUN_STRIDE * self.run_phase as i32,
                RUN_ORIGIN.1,
                SPRITE_SIZE,
                SPRITE_SIZE,
            )
        } else {
            STANDING
        }
    }

    /// Where the soldier stands, feet on the vertical centre line.
    pub fn sprite_rect(&self, vcenter: i32) -> Rect {
        Rect::new(self.position as i32, vcenter - SPRITE_SIZE, SPRITE_SIZE, SPRITE_SIZE)
    }

    /// Where the mirrored reflection goes, just below the soldier.
    pub fn reflection_rect(&self, vcenter: i32) -> Rect {
        Rect::new(self.position as i32, vcenter, SPRITE_SIZE, SPRITE_SIZE)
    }

    pub fn status_line(&self) -> String {
        format!(
            "Position: {}, running: {}",
            self.position as i32, self.is_running
        )
    }

    /// Copies the current sprite frame onto the output.
    pub fn draw_sprite(&self, context: &mut Context, sprites: &Texture) {
        let vcenter = vcenter(context);
        context.copy(sprites, Some(self.sprite_frame()), Some(self.sprite_rect(vcenter)));
    }

    /// Copies the current frame again, upside down and half transparent.
    ///
    /// Leaves `sprites` at full alpha afterwards.
    pub fn draw_reflection(&self, context: &mut Context, sprites: &mut Texture) {
        let vcenter = vcenter(context);
        sprites.set_alpha_mod(REFLECTION_ALPHA);
        context.copy_ex(
            sprites,
            Some(self.sprite_frame()),
            Some(self.reflection_rect(vcenter)),
            0.0,
            None,
            Flip::Vertical,
        );
        sprites.set_alpha_mod(255);
    }
}

/// Vertical centre of the output, the line the soldier runs on.
pub fn vcenter(context: &Context) -> i32 {
    (context.output_height() / 2) as i32
}

/// Stretches `gradient` over the lower half of the output.
pub fn draw_ground(context: &mut Context, gradient: &Texture) {
    let (w, h) = context.output_size();
    let half = (h / 2) as i32;
    context.copy(gradient, None, Some(Rect::new(0, half, w as i32, half)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ticks: u32, delta: u32) -> FrameTime {
        FrameTime { ticks, delta }
    }

    fn running() -> RunnerState {
        let mut s = RunnerState::new();
        s.handle_event(&Event::KeyDown {
            key: Key::Right,
            repeat: false,
        });
        s
    }

    #[test]
    fn starts_standing_at_origin() {
        let s = RunnerState::new();
        assert!(!s.is_running());
        assert_eq!(s.run_phase(), 0);
        assert_eq!(s.position(), 0.0);
        assert_eq!(s.sprite_frame(), Rect::new(8, 11, 50, 50));
    }

    #[test]
    fn half_a_second_of_running_moves_100_pixels() {
        let mut s = running();
        s.update(frame(500, 500), 640);
        assert!((s.position() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn position_advances_linearly_with_delta() {
        let mut s = running();
        let mut expected = 0.0f32;
        for dt in [0, 1, 16, 33, 7] {
            s.update(frame(0, dt), 640);
            expected += dt as f32 * VELOCITY;
            assert!((s.position() - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn phase_follows_ticks_while_running() {
        let mut s = running();
        for t in [0, 99, 100, 250, 799, 800, 1234, 5050] {
            s.update(frame(t, 0), 640);
            assert_eq!(s.run_phase(), (t / 100) % 8);
            assert!(s.run_phase() < RUN_FRAMES);
        }
    }

    #[test]
    fn standing_resets_phase_and_holds_position() {
        let mut s = running();
        s.update(frame(350, 100), 640);
        assert_eq!(s.run_phase(), 3);
        s.handle_event(&Event::KeyUp { key: Key::Right });
        assert!(!s.is_running());
        let before = s.position();
        s.update(frame(450, 100), 640);
        assert_eq!(s.run_phase(), 0);
        assert_eq!(s.position(), before);
    }

    #[test]
    fn leaving_the_right_edge_wraps_to_minus_50() {
        let mut s = running();
        // 640 exactly is still on screen
        s.update(frame(0, 3200), 640);
        assert_eq!(s.position(), 640.0);
        s.update(frame(0, 5), 640);
        assert_eq!(s.position(), -50.0);
    }

    #[test]
    fn quit_events_and_keys() {
        let mut s = RunnerState::new();
        assert_eq!(s.handle_event(&Event::Quit), Flow::Quit);
        for key in [Key::Escape, Key::Q] {
            let ev = Event::KeyDown { key, repeat: false };
            assert_eq!(s.handle_event(&ev), Flow::Quit);
        }
        assert_eq!(s.handle_event(&Event::KeyUp { key: Key::Escape }), Flow::Continue);
        assert_eq!(
            s.handle_event(&Event::KeyDown { key: Key::Left, repeat: false }),
            Flow::Continue
        );
        assert!(!s.is_running());
    }

    #[test]
    fn handle_events_drains_queue_and_requests_quit() {
        let mut ctx = Context::new();
        ctx.push_event(Event::KeyDown { key: Key::Right, repeat: false });
        ctx.push_event(Event::KeyDown { key: Key::Q, repeat: false });
        let mut s = RunnerState::new();
        s.handle_events(&mut ctx);
        assert!(s.is_running());
        assert!(ctx.quit_requested());
        assert_eq!(ctx.poll_event(), None);
    }

    #[test]
    fn running_frames_step_through_the_sheet() {
        let mut s = running();
        let xs: Vec<i32> = (0..8)
            .map(|i| {
                s.update(frame(i * 100, 0), 640);
                s.sprite_frame().x
            })
            .collect();
        assert_eq!(xs, vec![8, 59, 110, 161, 212, 263, 314, 365]);
        assert_eq!(s.sprite_frame().y, 67);
    }

    #[test]
    fn placement_around_vertical_centre() {
        let mut s = running();
        s.update(frame(0, 60), 640);
        assert_eq!(s.sprite_rect(240), Rect::new(12, 190, 50, 50));
        assert_eq!(s.reflection_rect(240), Rect::new(12, 240, 50, 50));
        assert_eq!(s.status_line(), "Position: 12, running: true");
    }

    #[test]
    fn reflection_is_recorded_flipped_and_translucent() {
        let mut ctx = Context::new();
        ctx.set_output_size(640, 480);
        let mut sprites = Texture::detached(3, 400, 200);
        sprites.set_blend_mode(crate::BlendMode::Blend);
        let s = RunnerState::new();
        s.draw_sprite(&mut ctx, &sprites);
        s.draw_reflection(&mut ctx, &mut sprites);

        let list = ctx.draw_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].instance.dst, [0.0, 190.0, 50.0, 50.0]);
        assert_eq!(list[1].instance.dst, [0.0, 240.0, 50.0, 50.0]);
        assert_eq!(list[1].instance.tint[3], 127.0 / 255.0);
        assert!(list[1].instance.uv[3] < 0.0);
        assert_eq!(sprites.alpha_mod(), 255);
    }

    #[test]
    fn ground_covers_lower_half() {
        let mut ctx = Context::new();
        ctx.set_output_size(640, 480);
        let gradient = Texture::detached(4, 1, 256);
        draw_ground(&mut ctx, &gradient);
        assert_eq!(ctx.draw_list()[0].instance.dst, [0.0, 240.0, 640.0, 240.0]);
    }
}
