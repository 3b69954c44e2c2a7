use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

use crate::Key;

/// Held/pressed/released key state, for scenes that prefer polling over events.
#[derive(Debug, Clone)]
pub struct InputManager {
    keys_down: [u64; Key::WORDS],
    keys_pressed: [u64; Key::WORDS],
    keys_released: [u64; Key::WORDS],
    focused: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self {
            keys_down: [0u64; Key::WORDS],
            keys_pressed: [0u64; Key::WORDS],
            keys_released: [0u64; Key::WORDS],
            focused: true,
        }
    }
}

fn key_word_bit(key: Key) -> (usize, u64) {
    let idx = key.as_index();
    (idx / 64, 1u64 << (idx % 64))
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn key_down(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_down[w] & m) != 0
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_pressed[w] & m) != 0
    }

    pub fn key_released(&self, key: Key) -> bool {
        let (w, m) = key_word_bit(key);
        (self.keys_released[w] & m) != 0
    }

    pub(crate) fn end_frame(&mut self) {
        self.keys_pressed = [0u64; Key::WORDS];
        self.keys_released = [0u64; Key::WORDS];
    }

    pub(crate) fn handle_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keys_down = [0u64; Key::WORDS];
            self.keys_pressed = [0u64; Key::WORDS];
            self.keys_released = [0u64; Key::WORDS];
        }
    }

    pub(crate) fn handle_keyboard_input(&mut self, state: ElementState, physical_key: PhysicalKey) {
        let PhysicalKey::Code(code) = physical_key else {
            return;
        };
        let Some(key) = Key::from_winit_key_code(code) else {
            return;
        };
        self.set_key(key, state == ElementState::Pressed);
    }

    pub(crate) fn set_key(&mut self, key: Key, down: bool) {
        let (w, mask) = key_word_bit(key);
        if down {
            if (self.keys_down[w] & mask) == 0 {
                self.keys_down[w] |= mask;
                self.keys_pressed[w] |= mask;
            }
        } else {
            self.keys_down[w] &= !mask;
            self.keys_released[w] |= mask;
        }
    }
}
