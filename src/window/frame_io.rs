//! Frame input/output types
//!
//! Types for passing data to and from the render loop callback.

use crate::camera::Viewport;
use crate::input::event::Event;

/// Input data for a frame.
pub struct FrameInput<'a> {
    /// Events that occurred since the last frame.
    pub events: Vec<Event>,
    /// Time elapsed since the start of the application in seconds.
    pub elapsed_time: f64,
    /// Time elapsed since the last frame in seconds.
    pub delta_time: f64,
    /// The viewport dimensions.
    pub viewport: Viewport,
    /// The wgpu device.
    pub device: &'a wgpu::Device,
    /// The wgpu queue.
    pub queue: &'a wgpu::Queue,
    /// The surface texture view to render to.
    pub surface_view: &'a wgpu::TextureView,
    /// The surface format.
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> FrameInput<'a> {
    /// Get the viewport width.
    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    /// Get the viewport height.
    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    /// Get the aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.viewport.aspect()
    }
}

/// Output data from a frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Whether to exit the application.
    pub exit: bool,
}

impl FrameOutput {
    /// Create a new frame output that doesn't exit.
    pub fn new() -> Self {
        Self { exit: false }
    }

    /// Create a frame output that exits the application.
    pub fn exit() -> Self {
        Self { exit: true }
    }
}
