//! Window management module
//!
//! Provides a convenient abstraction over winit for window creation and
//! event handling. Winit mouse, touch, and keyboard input is translated
//! into the crate's pointer event model: the mouse is pointer 0 and each
//! touch contact gets its own pointer id for its lifetime.

pub mod frame_io;
pub mod settings;

pub use frame_io::{FrameInput, FrameOutput};
pub use settings::WindowSettings;

use crate::camera::Viewport;
use crate::input::event::{Event, Key, Modifiers, PointerButton, PointerId, WheelDeltaMode};
use std::collections::HashMap;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

/// Pointer id of the mouse. Touch contacts use their platform id plus one.
const MOUSE_POINTER: PointerId = PointerId(0);

/// A window with GPU rendering context.
pub struct Window {
    settings: WindowSettings,
}

impl Window {
    /// Create a new window with the given settings.
    pub fn new(settings: WindowSettings) -> anyhow::Result<Self> {
        Ok(Self { settings })
    }

    /// Run the render loop with a callback.
    ///
    /// The callback receives a `FrameInput` and should return a `FrameOutput`.
    pub fn render_loop<F, S>(self, state_init: S, callback: F) -> anyhow::Result<()>
    where
        F: FnMut(&mut S, FrameInput<'_>) -> FrameOutput + 'static,
        S: 'static,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            settings: self.settings,
            state: Some(state_init),
            callback: Some(callback),
            graphics: None,
            events: Vec::new(),
            start_time: std::time::Instant::now(),
            last_frame_time: std::time::Instant::now(),
            mouse_position: (0.0, 0.0),
            touch_positions: HashMap::new(),
            modifiers: Modifiers::default(),
        };

        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

struct Graphics {
    window: Arc<winit::window::Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

struct App<S, F> {
    settings: WindowSettings,
    state: Option<S>,
    callback: Option<F>,
    graphics: Option<Graphics>,
    events: Vec<Event>,
    start_time: std::time::Instant,
    last_frame_time: std::time::Instant,
    mouse_position: (f32, f32),
    touch_positions: HashMap<PointerId, (f32, f32)>,
    modifiers: Modifiers,
}

impl<S, F> App<S, F> {
    fn on_touch(&mut self, touch: winit::event::Touch) {
        let pointer = PointerId(touch.id + 1);
        let position = (touch.location.x as f32, touch.location.y as f32);

        match touch.phase {
            TouchPhase::Started => {
                self.touch_positions.insert(pointer, position);
                self.events.push(Event::PointerPress {
                    pointer,
                    button: PointerButton::Touch,
                    position,
                    modifiers: self.modifiers,
                    handled: false,
                });
            }
            TouchPhase::Moved => {
                let old = self
                    .touch_positions
                    .insert(pointer, position)
                    .unwrap_or(position);
                self.events.push(Event::PointerMotion {
                    pointer,
                    position,
                    delta: (position.0 - old.0, position.1 - old.1),
                    modifiers: self.modifiers,
                    handled: false,
                });
            }
            TouchPhase::Ended => {
                self.touch_positions.remove(&pointer);
                self.events.push(Event::PointerRelease {
                    pointer,
                    button: PointerButton::Touch,
                    position,
                    modifiers: self.modifiers,
                    handled: false,
                });
            }
            TouchPhase::Cancelled => {
                self.touch_positions.remove(&pointer);
                self.events.push(Event::PointerCancel { pointer });
            }
        }
    }
}

impl<S, F> ApplicationHandler for App<S, F>
where
    F: FnMut(&mut S, FrameInput<'_>) -> FrameOutput + 'static,
    S: 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        let window_attrs = winit::window::WindowAttributes::default()
            .with_title(&self.settings.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.size.0,
                self.settings.size.1,
            ))
            .with_resizable(self.settings.resizable);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        // Create wgpu instance and surface
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orrery device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: Default::default(),
                experimental_features: Default::default(),
            },
        ))
        .expect("Failed to create device");

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if self.settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        self.graphics = Some(Graphics {
            window,
            surface,
            config,
            device,
            queue,
        });

        self.start_time = std::time::Instant::now();
        self.last_frame_time = std::time::Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    graphics.config.width = size.width;
                    graphics.config.height = size.height;
                    graphics.surface.configure(&graphics.device, &graphics.config);
                }
                self.events.push(Event::Resize {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    alt: state.alt_key(),
                    meta: state.super_key(),
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                let old_position = self.mouse_position;
                self.mouse_position = (position.x as f32, position.y as f32);
                let delta = (
                    self.mouse_position.0 - old_position.0,
                    self.mouse_position.1 - old_position.1,
                );
                self.events.push(Event::PointerMotion {
                    pointer: MOUSE_POINTER,
                    position: self.mouse_position,
                    delta,
                    modifiers: self.modifiers,
                    handled: false,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => PointerButton::Left,
                    winit::event::MouseButton::Right => PointerButton::Right,
                    winit::event::MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => {
                        self.events.push(Event::PointerPress {
                            pointer: MOUSE_POINTER,
                            button,
                            position: self.mouse_position,
                            modifiers: self.modifiers,
                            handled: false,
                        });
                    }
                    ElementState::Released => {
                        self.events.push(Event::PointerRelease {
                            pointer: MOUSE_POINTER,
                            button,
                            position: self.mouse_position,
                            modifiers: self.modifiers,
                            handled: false,
                        });
                    }
                }
            }
            WindowEvent::Touch(touch) => {
                self.on_touch(touch);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Winit's y axis is positive toward the user; flip it so
                // positive means scroll down, matching the event model.
                let (delta, delta_mode) = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => {
                        ((-x, -y), WheelDeltaMode::Line)
                    }
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        ((-pos.x as f32, -pos.y as f32), WheelDeltaMode::Pixel)
                    }
                };
                self.events.push(Event::MouseWheel {
                    delta,
                    delta_mode,
                    position: self.mouse_position,
                    modifiers: self.modifiers,
                    handled: false,
                });
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let Some(key) = Key::from_winit(&key_event.logical_key) {
                    match key_event.state {
                        ElementState::Pressed => {
                            self.events.push(Event::KeyPress {
                                key,
                                modifiers: self.modifiers,
                                handled: false,
                            });
                        }
                        ElementState::Released => {
                            self.events.push(Event::KeyRelease {
                                key,
                                modifiers: self.modifiers,
                                handled: false,
                            });
                        }
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let now = std::time::Instant::now();
                let elapsed_time = (now - self.start_time).as_secs_f64();
                let delta_time = (now - self.last_frame_time).as_secs_f64();
                self.last_frame_time = now;

                let surface_texture = match graphics.surface.get_current_texture() {
                    Ok(texture) => texture,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        graphics.surface.configure(&graphics.device, &graphics.config);
                        return;
                    }
                    Err(e) => {
                        tracing::error!("Surface error: {:?}", e);
                        return;
                    }
                };

                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let viewport = Viewport {
                    x: 0,
                    y: 0,
                    width: graphics.config.width,
                    height: graphics.config.height,
                };

                let events = std::mem::take(&mut self.events);

                let frame_input = FrameInput {
                    events,
                    elapsed_time,
                    delta_time,
                    viewport,
                    device: &graphics.device,
                    queue: &graphics.queue,
                    surface_view: &view,
                    surface_format: graphics.config.format,
                };

                let state = self.state.as_mut().expect("State should exist");
                let callback = self.callback.as_mut().expect("Callback should exist");
                let output = (callback)(state, frame_input);

                surface_texture.present();

                if output.exit {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }
}
