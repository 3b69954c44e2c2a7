use std::collections::VecDeque;

use winit::event::ElementState;
use winit::keyboard::PhysicalKey;

use crate::Key;

/// Discrete input event delivered to a scene once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The window was asked to close.
    Quit,
    KeyDown { key: Key, repeat: bool },
    KeyUp { key: Key },
}

impl Event {
    pub(crate) fn from_keyboard(
        state: ElementState,
        physical_key: PhysicalKey,
        repeat: bool,
    ) -> Option<Self> {
        let PhysicalKey::Code(code) = physical_key else {
            return None;
        };
        let key = Key::from_winit_key_code(code)?;
        Some(match state {
            ElementState::Pressed => Event::KeyDown { key, repeat },
            ElementState::Released => Event::KeyUp { key },
        })
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        matches!(self, Event::KeyDown { key: k, .. } if *k == key)
    }

    pub fn is_key_up(&self, key: Key) -> bool {
        matches!(self, Event::KeyUp { key: k } if *k == key)
    }
}

/// FIFO of events collected from the platform between two frames.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    pending: VecDeque<Event>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    pub(crate) fn poll(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Discards everything still queued, reporting whether a quit request was among it.
    pub(crate) fn drain_for_quit(&mut self) -> bool {
        let quit = self.pending.iter().any(|e| *e == Event::Quit);
        self.pending.clear();
        quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::KeyCode;

    #[test]
    fn queue_is_fifo() {
        let mut q = EventQueue::new();
        q.push(Event::KeyDown {
            key: Key::Right,
            repeat: false,
        });
        q.push(Event::KeyUp { key: Key::Right });
        q.push(Event::Quit);
        assert_eq!(q.len(), 3);
        assert!(q.poll().is_some_and(|e| e.is_key_down(Key::Right)));
        assert!(q.poll().is_some_and(|e| e.is_key_up(Key::Right)));
        assert_eq!(q.poll(), Some(Event::Quit));
        assert_eq!(q.poll(), None);
    }

    #[test]
    fn keyboard_conversion() {
        let down = Event::from_keyboard(
            ElementState::Pressed,
            PhysicalKey::Code(KeyCode::ArrowRight),
            false,
        );
        assert_eq!(
            down,
            Some(Event::KeyDown {
                key: Key::Right,
                repeat: false
            })
        );

        let up = Event::from_keyboard(
            ElementState::Released,
            PhysicalKey::Code(KeyCode::KeyQ),
            false,
        );
        assert_eq!(up, Some(Event::KeyUp { key: Key::Q }));

        let unknown = Event::from_keyboard(
            ElementState::Pressed,
            PhysicalKey::Code(KeyCode::CapsLock),
            false,
        );
        assert_eq!(unknown, None);
    }

    #[test]
    fn drain_reports_unhandled_quit() {
        let mut q = EventQueue::new();
        q.push(Event::KeyUp { key: Key::A });
        assert!(!q.drain_for_quit());
        q.push(Event::Quit);
        q.push(Event::KeyUp { key: Key::A });
        assert!(q.drain_for_quit());
        assert_eq!(q.len(), 0);
    }
}
