//! Gesture state and input normalization for the orbit control
//!
//! Holds the gesture state machine vocabulary: the active-gesture enum,
//! button/touch-to-action bindings, the ordered pointer tracker used for
//! multi-touch arithmetic, and wheel delta normalization.

use crate::input::event::{Modifiers, PointerId, WheelDeltaMode};
use glam::Vec2;
use std::collections::HashMap;

/// Action bound to a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Rotate,
    Pan,
    Dolly,
}

/// Mouse button to action bindings.
#[derive(Debug, Clone, Copy)]
pub struct MouseMapping {
    pub left: Option<MouseAction>,
    pub middle: Option<MouseAction>,
    pub right: Option<MouseAction>,
}

impl Default for MouseMapping {
    fn default() -> Self {
        Self {
            left: Some(MouseAction::Rotate),
            middle: Some(MouseAction::Dolly),
            right: Some(MouseAction::Pan),
        }
    }
}

/// Action bound to a touch-point count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Rotate,
    Pan,
    DollyPan,
    DollyRotate,
}

/// Touch-point count to action bindings.
#[derive(Debug, Clone, Copy)]
pub struct TouchMapping {
    /// Action for a single contact.
    pub one: Option<TouchAction>,
    /// Action for two contacts.
    pub two: Option<TouchAction>,
}

impl Default for TouchMapping {
    fn default() -> Self {
        Self {
            one: Some(TouchAction::Rotate),
            two: Some(TouchAction::DollyPan),
        }
    }
}

/// Active gesture of the orbit control.
///
/// Exactly one gesture is active at a time; `Idle` is both the initial
/// and the terminal state between gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Rotate,
    Pan,
    Dolly,
    TouchRotate,
    TouchPan,
    TouchDollyPan,
    TouchDollyRotate,
}

impl Gesture {
    /// Check whether this is a touch gesture.
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            Gesture::TouchRotate
                | Gesture::TouchPan
                | Gesture::TouchDollyPan
                | Gesture::TouchDollyRotate
        )
    }
}

/// Tracks active pointers in press order with their last-known positions.
///
/// Press order doubles as gesture priority: the first two entries drive
/// two-finger midpoint and pinch-distance arithmetic.
#[derive(Debug, Default)]
pub struct PointerTracker {
    order: Vec<PointerId>,
    positions: HashMap<PointerId, Vec2>,
}

impl PointerTracker {
    /// Start tracking a pointer, or refresh its position if already known.
    pub fn add(&mut self, id: PointerId, position: Vec2) {
        if !self.order.contains(&id) {
            self.order.push(id);
        }
        self.positions.insert(id, position);
    }

    /// Update the last-known position of a tracked pointer.
    pub fn track(&mut self, id: PointerId, position: Vec2) {
        if self.positions.contains_key(&id) {
            self.positions.insert(id, position);
        }
    }

    /// Stop tracking a pointer.
    pub fn remove(&mut self, id: PointerId) {
        self.order.retain(|p| *p != id);
        self.positions.remove(&id);
    }

    /// Number of active pointers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no pointers are active.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check whether a pointer is tracked.
    pub fn contains(&self, id: PointerId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Last-known position of a pointer.
    pub fn position(&self, id: PointerId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    /// Position of the first pointer in press order.
    pub fn first_position(&self) -> Option<Vec2> {
        self.position(*self.order.first()?)
    }

    /// Positions of the first two pointers in press order.
    pub fn pair(&self) -> Option<(Vec2, Vec2)> {
        if self.order.len() < 2 {
            return None;
        }
        Some((self.position(self.order[0])?, self.position(self.order[1])?))
    }

    /// Position of the other pointer in a two-finger gesture.
    pub fn other_position(&self, id: PointerId) -> Option<Vec2> {
        let other = self.order.iter().copied().find(|p| *p != id)?;
        self.position(other)
    }

    /// Drop all pointers.
    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }
}

/// Normalize a wheel delta into pixels.
///
/// Line and page units use fixed multipliers. A physically held ctrl key
/// inflates the delta tenfold unless a control gesture is already in
/// progress, which distinguishes a keyboard-modified wheel from trackpad
/// pinches that arrive as ctrl+wheel.
pub fn normalize_wheel_delta(
    delta_y: f32,
    mode: WheelDeltaMode,
    modifiers: Modifiers,
    control_active: bool,
) -> f32 {
    let mut delta = delta_y;
    match mode {
        WheelDeltaMode::Pixel => {}
        WheelDeltaMode::Line => delta *= 16.0,
        WheelDeltaMode::Page => delta *= 100.0,
    }
    if modifiers.ctrl && !control_active {
        delta *= 10.0;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_tracker_preserves_press_order() {
        let mut tracker = PointerTracker::default();
        tracker.add(PointerId(7), Vec2::new(1.0, 1.0));
        tracker.add(PointerId(3), Vec2::new(2.0, 2.0));

        let (a, b) = tracker.pair().unwrap();
        assert_eq!(a, Vec2::new(1.0, 1.0));
        assert_eq!(b, Vec2::new(2.0, 2.0));

        tracker.remove(PointerId(7));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.first_position(), Some(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_pointer_tracker_other_position() {
        let mut tracker = PointerTracker::default();
        tracker.add(PointerId(1), Vec2::new(10.0, 0.0));
        tracker.add(PointerId(2), Vec2::new(20.0, 0.0));

        assert_eq!(tracker.other_position(PointerId(1)), Some(Vec2::new(20.0, 0.0)));
        assert_eq!(tracker.other_position(PointerId(2)), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(tracker.other_position(PointerId(9)), Some(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_tracker_ignores_untracked_motion() {
        let mut tracker = PointerTracker::default();
        tracker.track(PointerId(1), Vec2::new(5.0, 5.0));
        assert!(tracker.is_empty() || tracker.position(PointerId(1)).is_none());
    }

    #[test]
    fn test_wheel_delta_units() {
        let mods = Modifiers::default();
        assert_eq!(
            normalize_wheel_delta(3.0, WheelDeltaMode::Pixel, mods, false),
            3.0
        );
        assert_eq!(
            normalize_wheel_delta(3.0, WheelDeltaMode::Line, mods, false),
            48.0
        );
        assert_eq!(
            normalize_wheel_delta(3.0, WheelDeltaMode::Page, mods, false),
            300.0
        );
    }

    #[test]
    fn test_wheel_ctrl_inflation_suppressed_during_control_gesture() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert_eq!(
            normalize_wheel_delta(2.0, WheelDeltaMode::Pixel, ctrl, false),
            20.0
        );
        assert_eq!(
            normalize_wheel_delta(2.0, WheelDeltaMode::Pixel, ctrl, true),
            2.0
        );
    }
}
