//! Camera controls
//!
//! Controls translate input events into camera movement. They borrow the
//! camera for the duration of a call instead of owning it, so the host
//! application stays free to reposition the camera between frames.

mod orbit;

pub use orbit::{Gesture, MouseAction, MouseMapping, OrbitControl, TouchAction, TouchMapping};

/// Notification emitted by a control.
///
/// Drained with [`OrbitControl::take_events`]; hosts use these to pause
/// scene animation during interaction or to schedule redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// An interaction gesture began.
    Start,
    /// The active gesture ended.
    End,
    /// The camera pose changed.
    Change,
}
