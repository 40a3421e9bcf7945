//! Input events delivered to controller components
//!
//! The host window translates its events into [`InputEvent`]s and passes them
//! to [`crate::game::Game::handle_input`], which forwards them to every
//! input-handling component of the active scene.

/// Key codes the controllers react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// Space bar
    Space,
    /// Either shift key
    Shift,
    /// Escape key
    Escape,
    /// Any other key, by platform key code
    Other(u32),
}

/// One input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Relative mouse motion, reported while the pointer is locked
    MouseMotion {
        /// Horizontal movement in pixels
        dx: f64,
        /// Vertical movement in pixels
        dy: f64,
    },
    /// Absolute cursor position, reported while the pointer is free
    CursorPosition {
        /// Horizontal position in pixels
        x: f64,
        /// Vertical position in pixels
        y: f64,
    },
    /// A key went down
    KeyDown {
        /// Key
        key: KeyCode,
        /// Whether this is an auto-repeat of a held key
        repeat: bool,
    },
    /// A key went up
    KeyUp {
        /// Key
        key: KeyCode,
    },
}

/// Converts cursor positions into motion deltas
///
/// Controllers see the same [`InputEvent::MouseMotion`] stream whether or
/// not the pointer is locked.
#[derive(Debug, Default, Clone)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    /// Motion delta carried by `event`, if it is a mouse event
    ///
    /// The first cursor position only primes the tracker.
    pub fn delta(&mut self, event: &InputEvent) -> Option<(f64, f64)> {
        match *event {
            InputEvent::MouseMotion { dx, dy } => Some((dx, dy)),
            InputEvent::CursorPosition { x, y } => {
                let delta = self.last.map(|(lx, ly)| (x - lx, y - ly));
                self.last = Some((x, y));
                delta
            }
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_positions_become_deltas() {
        let mut tracker = MouseTracker::default();
        assert_eq!(tracker.delta(&InputEvent::CursorPosition { x: 10.0, y: 10.0 }), None);
        assert_eq!(tracker.delta(&InputEvent::CursorPosition { x: 14.0, y: 7.0 }), Some((4.0, -3.0)));
        assert_eq!(tracker.delta(&InputEvent::MouseMotion { dx: 1.0, dy: 2.0 }), Some((1.0, 2.0)));
        assert_eq!(tracker.delta(&InputEvent::KeyUp { key: KeyCode::W }), None);
    }
}
