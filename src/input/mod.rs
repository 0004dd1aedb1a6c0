//! Input event model
//!
//! Platform-independent pointer, wheel, and keyboard events consumed by
//! the camera controls. The `window` feature converts winit events into
//! this model; hosts with their own event loop can construct these
//! events directly.

pub mod event;

pub use event::{Event, Key, Modifiers, PointerButton, PointerId, WheelDeltaMode};
