//! Orrery camera controls
//!
//! An orbit camera controller in the style of a planetarium viewer:
//! rotate around a focus point, dolly toward it, pan the focus, with
//! optional inertial damping, auto-rotation, and cursor-centered zoom.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **camera** - Camera, projection, and viewer abstractions
//! 2. **input** - Platform-independent pointer/wheel/keyboard events
//! 3. **control** - The orbit controller driven by input events
//! 4. **window** - Window management with winit and wgpu (feature = "window")
//!
//! The controller never owns the camera: feed it events with
//! [`OrbitControl::handle_events`] and advance it once per frame with
//! [`OrbitControl::update`], which reports whether a redraw is needed.

pub mod camera;
pub mod control;
pub mod input;

#[cfg(feature = "window")]
pub mod window;

// Re-export commonly used types
pub use camera::{Camera, CameraUniform, Projection, Viewer, Viewport};

pub use control::{
    ControlEvent, Gesture, MouseAction, MouseMapping, OrbitControl, TouchAction, TouchMapping,
};

pub use input::{Event, Key, Modifiers, PointerButton, PointerId, WheelDeltaMode};

#[cfg(feature = "window")]
pub use window::{FrameInput, FrameOutput, Window, WindowSettings};

// Re-export the math crate used throughout the public API
pub use glam;
