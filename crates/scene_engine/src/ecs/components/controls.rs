//! Mouse look and key movement state shared by the controller components

use crate::foundation::math::{axis_angle, constants, Quat, Vec3};
use crate::input::{InputEvent, KeyCode, MouseTracker};

/// Yaw around +Z and pitch around +X driven by mouse motion
#[derive(Debug, Clone)]
pub(crate) struct MouseLook {
    sensitivity: f32,
    mouse_x: f32,
    mouse_y: f32,
    tracker: MouseTracker,
}

impl MouseLook {
    /// Looking straight ahead along +Y
    pub(crate) fn new(sensitivity: f32) -> Self {
        Self { sensitivity, mouse_x: 0.0, mouse_y: constants::HALF_PI, tracker: MouseTracker::default() }
    }

    /// Feed a mouse event; returns whether the look changed
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn handle(&mut self, event: &InputEvent) -> bool {
        let Some((dx, dy)) = self.tracker.delta(event) else {
            return false;
        };
        self.mouse_x += dx as f32 * self.sensitivity;
        // Pitch stops at straight up and straight down
        self.mouse_y = (self.mouse_y + dy as f32 * self.sensitivity).clamp(0.0, constants::PI);
        true
    }

    /// Rotation around the up axis
    pub(crate) fn yaw(&self) -> Quat {
        axis_angle(&Vec3::z(), self.mouse_x)
    }

    /// Rotation around the right axis
    pub(crate) fn pitch(&self) -> Quat {
        axis_angle(&Vec3::x(), self.mouse_y)
    }

    /// Yaw applied after pitch
    pub(crate) fn look(&self) -> Quat {
        self.yaw() * self.pitch()
    }
}

/// Key-driven movement intent, each axis in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct MoveAxes {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl MoveAxes {
    /// Feed a key event; `vertical` enables Space and Shift
    pub(crate) fn handle(&mut self, event: &InputEvent, vertical: bool) {
        match *event {
            InputEvent::KeyDown { repeat: true, .. } => {}
            InputEvent::KeyDown { key, .. } => match key {
                KeyCode::W => self.forward = (self.forward + 1.0).min(1.0),
                KeyCode::S => self.forward = (self.forward - 1.0).max(-1.0),
                KeyCode::D => self.right = (self.right + 1.0).min(1.0),
                KeyCode::A => self.right = (self.right - 1.0).max(-1.0),
                KeyCode::Space if vertical => self.up = (self.up + 1.0).min(1.0),
                KeyCode::Shift if vertical => self.up = (self.up - 1.0).max(-1.0),
                _ => {}
            },
            InputEvent::KeyUp { key } => match key {
                KeyCode::W => self.forward -= 1.0,
                KeyCode::S => self.forward += 1.0,
                KeyCode::D => self.right -= 1.0,
                KeyCode::A => self.right += 1.0,
                KeyCode::Space if vertical => self.up -= 1.0,
                KeyCode::Shift if vertical => self.up += 1.0,
                _ => {}
            },
            InputEvent::MouseMotion { .. } | InputEvent::CursorPosition { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initial_look_faces_forward() {
        let look = MouseLook::new(-0.005);
        let forward = look.look() * Vec3::new(0.0, 0.0, -1.0);
        assert_relative_eq!(forward, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut look = MouseLook::new(-0.005);
        look.handle(&InputEvent::MouseMotion { dx: 0.0, dy: -10_000.0 });
        assert_relative_eq!(look.mouse_y, constants::PI);
        look.handle(&InputEvent::MouseMotion { dx: 0.0, dy: 10_000.0 });
        assert_relative_eq!(look.mouse_y, 0.0);
    }

    #[test]
    fn test_repeats_do_not_stack() {
        let mut axes = MoveAxes::default();
        axes.handle(&InputEvent::KeyDown { key: KeyCode::W, repeat: false }, true);
        axes.handle(&InputEvent::KeyDown { key: KeyCode::W, repeat: true }, true);
        assert_relative_eq!(axes.forward, 1.0);
        axes.handle(&InputEvent::KeyUp { key: KeyCode::W }, true);
        assert_relative_eq!(axes.forward, 0.0);

        axes.handle(&InputEvent::KeyDown { key: KeyCode::Space, repeat: false }, false);
        assert_relative_eq!(axes.up, 0.0);
    }
}
