//! Orbit camera control
//!
//! Rotates, pans, and dollies a camera around a target point. Input
//! arrives as platform-independent events; the per-frame [`update`]
//! applies accumulated deltas with optional damping, clamps the result
//! into the configured constraints, and repositions the camera.
//!
//! [`update`]: OrbitControl::update

mod gesture;
mod spherical;

pub use gesture::{Gesture, MouseAction, MouseMapping, TouchAction, TouchMapping};

use self::gesture::{normalize_wheel_delta, PointerTracker};
use self::spherical::{clamp_azimuth, Spherical};
use super::ControlEvent;
use crate::camera::{Camera, Projection, Viewer};
use crate::input::event::{Event, Key, Modifiers, PointerButton, PointerId};
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Squared-distance and small-angle threshold for change detection.
const CHANGE_EPSILON: f32 = 1e-6;

/// cos(70°). When the view direction is within 20° of the horizon, the
/// ground-plane intersection after a cursor zoom is ill-conditioned and
/// is skipped in favor of re-aiming at the existing target.
const TILT_LIMIT: f32 = 0.342_020_14;

/// Orbit camera control that rotates around a target point.
///
/// The controller never owns the camera; it reads and repositions the
/// camera passed into [`handle_events`] and [`update`], tolerating
/// external mutation between frames.
///
/// [`handle_events`]: OrbitControl::handle_events
/// [`update`]: OrbitControl::update
pub struct OrbitControl {
    /// Whether the control responds to input.
    pub enabled: bool,
    /// The point to orbit around.
    pub target: Vec3,
    /// Anchor the target may not be panned arbitrarily far from.
    pub cursor: Vec3,

    /// Minimum distance from target (perspective dolly).
    pub min_distance: f32,
    /// Maximum distance from target (perspective dolly).
    pub max_distance: f32,
    /// Minimum zoom factor (orthographic).
    pub min_zoom: f32,
    /// Maximum zoom factor (orthographic).
    pub max_zoom: f32,
    /// Minimum distance the target may be panned from the anchor.
    pub min_target_radius: f32,
    /// Maximum distance the target may be panned from the anchor.
    pub max_target_radius: f32,
    /// Lower polar angle bound, in `[0, π]`.
    pub min_polar_angle: f32,
    /// Upper polar angle bound, in `[0, π]`.
    pub max_polar_angle: f32,
    /// Lower azimuth bound; the pair may wrap across the ±π seam.
    pub min_azimuth_angle: f32,
    /// Upper azimuth bound.
    pub max_azimuth_angle: f32,

    /// Whether pending deltas decay over several frames.
    pub enable_damping: bool,
    /// Fraction of the pending delta consumed per update, in `[0, 1)`.
    pub damping_factor: f32,

    /// Whether dolly/zoom input is honored.
    pub enable_zoom: bool,
    /// Zoom speed multiplier.
    pub zoom_speed: f32,
    /// Whether rotate input is honored.
    pub enable_rotate: bool,
    /// Rotation speed multiplier.
    pub rotate_speed: f32,
    /// Whether pan input is honored.
    pub enable_pan: bool,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Pan parallel to the screen instead of the ground plane.
    pub screen_space_panning: bool,
    /// Arrow-key pan step in pixels.
    pub key_pan_speed: f32,

    /// Zoom toward the point under the pointer instead of the target.
    pub zoom_to_cursor: bool,

    /// Rotate the azimuth automatically while no gesture is active.
    pub auto_rotate: bool,
    /// Auto-rotation speed; 2.0 is one turn per 30 seconds at 60 fps.
    pub auto_rotate_speed: f32,

    /// Mouse button bindings.
    pub mouse_mapping: MouseMapping,
    /// Touch-point count bindings.
    pub touch_mapping: TouchMapping,

    // Gesture state
    gesture: Gesture,
    pointers: PointerTracker,
    rotate_start: Vec2,
    rotate_end: Vec2,
    pan_start: Vec2,
    pan_end: Vec2,
    dolly_start: Vec2,
    dolly_end: Vec2,
    control_active: bool,

    // Pending deltas, consumed by update
    spherical: Spherical,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,

    // Cursor zoom state
    mouse_ndc: Vec2,
    dolly_direction: Vec3,
    performed_cursor_zoom: bool,

    // Saved snapshot for reset
    saved_target: Vec3,
    saved_position: Vec3,
    saved_zoom: f32,

    // Last pose for change detection
    last_position: Vec3,
    last_quaternion: Quat,
    last_target: Vec3,

    events: Vec<ControlEvent>,
    connected: bool,
}

impl OrbitControl {
    /// Create a new orbit control around `target` and perform one
    /// initial update so the camera snaps onto the constrained orbit.
    pub fn new(camera: &mut Camera, target: Vec3) -> Self {
        let mut control = Self {
            enabled: true,
            target,
            cursor: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_zoom: 0.0,
            max_zoom: f32::INFINITY,
            min_target_radius: 0.0,
            max_target_radius: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_azimuth_angle: f32::NEG_INFINITY,
            max_azimuth_angle: f32::INFINITY,
            enable_damping: false,
            damping_factor: 0.05,
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_pan: true,
            pan_speed: 1.0,
            screen_space_panning: true,
            key_pan_speed: 7.0,
            zoom_to_cursor: false,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            mouse_mapping: MouseMapping::default(),
            touch_mapping: TouchMapping::default(),
            gesture: Gesture::Idle,
            pointers: PointerTracker::default(),
            rotate_start: Vec2::ZERO,
            rotate_end: Vec2::ZERO,
            pan_start: Vec2::ZERO,
            pan_end: Vec2::ZERO,
            dolly_start: Vec2::ZERO,
            dolly_end: Vec2::ZERO,
            control_active: false,
            spherical: Spherical::default(),
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            mouse_ndc: Vec2::ZERO,
            dolly_direction: Vec3::ZERO,
            performed_cursor_zoom: false,
            saved_target: target,
            saved_position: camera.position,
            saved_zoom: camera.zoom,
            last_position: Vec3::ZERO,
            last_quaternion: Quat::IDENTITY,
            last_target: Vec3::ZERO,
            events: Vec::new(),
            connected: true,
        };
        control.update(camera, None);
        control
    }

    /// Current polar angle from the up axis, in radians.
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Current azimuth angle around the up axis, in radians.
    pub fn azimuthal_angle(&self) -> f32 {
        self.spherical.theta
    }

    /// Current distance from the camera to the target.
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Currently active gesture.
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Resume consuming input events after a `disconnect`.
    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Stop consuming input events; ends any active gesture.
    pub fn disconnect(&mut self) {
        if self.gesture != Gesture::Idle {
            self.events.push(ControlEvent::End);
        }
        self.gesture = Gesture::Idle;
        self.pointers.clear();
        self.control_active = false;
        self.connected = false;
    }

    /// Tear the control down. Alias for [`disconnect`](Self::disconnect).
    pub fn dispose(&mut self) {
        self.disconnect();
    }

    /// Snapshot the target, camera position, and zoom for [`reset`].
    ///
    /// [`reset`]: Self::reset
    pub fn save_state(&mut self, camera: &Camera) {
        self.saved_target = self.target;
        self.saved_position = camera.position;
        self.saved_zoom = camera.zoom;
    }

    /// Restore the last saved snapshot bit-for-bit.
    ///
    /// Pending deltas are discarded and the active gesture ends. The
    /// camera pose is written back directly rather than re-derived, so
    /// the restored position is exactly the saved one.
    pub fn reset(&mut self, camera: &mut Camera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.zoom = self.saved_zoom;
        camera.target = self.target;

        self.spherical_delta = Spherical::default();
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
        self.performed_cursor_zoom = false;
        self.spherical.set_from_vec3(camera.position - self.target);

        if self.gesture != Gesture::Idle {
            self.events.push(ControlEvent::End);
        }
        self.gesture = Gesture::Idle;
        self.pointers.clear();
        self.events.push(ControlEvent::Change);
    }

    /// Drain the notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    /// Consume input events, advancing the gesture state machine and
    /// accumulating rotation/pan/dolly deltas for the next update.
    ///
    /// Events are processed in delivery order; multiple motion events
    /// between two updates accumulate into the same pending delta.
    pub fn handle_events(&mut self, camera: &Camera, events: &mut [Event]) {
        if !self.connected {
            return;
        }

        for event in events.iter_mut() {
            if event.is_handled() {
                continue;
            }

            match event {
                Event::PointerPress {
                    pointer,
                    button,
                    position,
                    modifiers,
                    ..
                } => {
                    let (pointer, button, position, modifiers) =
                        (*pointer, *button, *position, *modifiers);
                    if self.enabled
                        && self.on_pointer_down(
                            camera,
                            pointer,
                            button,
                            Vec2::new(position.0, position.1),
                            modifiers,
                        )
                    {
                        event.set_handled();
                    }
                }
                Event::PointerMotion {
                    pointer, position, ..
                } => {
                    let (pointer, position) = (*pointer, *position);
                    if self.enabled
                        && self.on_pointer_move(camera, pointer, Vec2::new(position.0, position.1))
                    {
                        event.set_handled();
                    }
                }
                Event::PointerRelease { pointer, .. } => {
                    let pointer = *pointer;
                    if self.on_pointer_up(pointer) {
                        event.set_handled();
                    }
                }
                Event::PointerCancel { pointer } => {
                    let pointer = *pointer;
                    self.on_pointer_up(pointer);
                }
                Event::MouseWheel {
                    delta,
                    delta_mode,
                    position,
                    modifiers,
                    ..
                } => {
                    let (delta, delta_mode, position, modifiers) =
                        (*delta, *delta_mode, *position, *modifiers);
                    if self.enabled && self.enable_zoom && self.gesture == Gesture::Idle {
                        let delta_y = normalize_wheel_delta(
                            delta.1,
                            delta_mode,
                            modifiers,
                            self.control_active,
                        );
                        self.on_mouse_wheel(camera, delta_y, Vec2::new(position.0, position.1));
                        event.set_handled();
                    }
                }
                Event::KeyPress { key, modifiers, .. } => {
                    let (key, modifiers) = (*key, *modifiers);
                    if key == Key::Control {
                        self.control_active = true;
                    }
                    if self.enabled && self.on_key_down(camera, key, modifiers) {
                        event.set_handled();
                    }
                }
                Event::KeyRelease { key, .. } => {
                    if *key == Key::Control {
                        self.control_active = false;
                    }
                }
                _ => {}
            }
        }
    }

    /// Apply accumulated deltas, clamp the spherical state into the
    /// configured constraints, and reposition the camera.
    ///
    /// `delta_time` (seconds) scales the auto-rotation increment; without
    /// it each call advances by 1/3600 of a turn (times the speed) so a
    /// 60 fps caller still sees the same rotation rate.
    ///
    /// Returns whether the camera pose changed this update, so the host
    /// can skip redraws at steady state.
    pub fn update(&mut self, camera: &mut Camera, delta_time: Option<f32>) -> bool {
        // Rotate the offset into Y-up space so the spherical math is
        // independent of the camera's up axis.
        let quat = Quat::from_rotation_arc(camera.up.normalize(), Vec3::Y);
        let quat_inverse = quat.inverse();

        let mut offset = quat * (camera.position - self.target);
        self.spherical.set_from_vec3(offset);

        if self.auto_rotate && self.gesture == Gesture::Idle {
            let angle = self.auto_rotation_angle(delta_time);
            self.rotate_left(angle);
        }

        if self.enable_damping {
            self.spherical.theta += self.spherical_delta.theta * self.damping_factor;
            self.spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            self.spherical.theta += self.spherical_delta.theta;
            self.spherical.phi += self.spherical_delta.phi;
        }

        self.spherical.theta = clamp_azimuth(
            self.spherical.theta,
            self.min_azimuth_angle,
            self.max_azimuth_angle,
        );
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        self.spherical.make_safe();

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        // Panning may not drag the orbit center arbitrarily far from the
        // anchor point, independent of camera distance. A target sitting
        // exactly on the anchor has no direction to scale along and stays
        // put, even when a minimum radius is configured.
        let anchor_offset = self.target - self.cursor;
        if anchor_offset.length_squared() > 0.0 {
            self.target = self.cursor
                + anchor_offset.clamp_length(self.min_target_radius, self.max_target_radius);
        }

        // Cursor-centered zoom (and orthographic zoom) pick their anchor
        // after the camera is placed; everything else scales the radius
        // here and records whether the clamped result differs.
        let mut zoom_changed = false;
        if (self.zoom_to_cursor && self.performed_cursor_zoom)
            || matches!(camera.projection, Projection::Orthographic { .. })
        {
            self.spherical.radius = self.clamp_distance(self.spherical.radius);
        } else {
            let prev_radius = self.spherical.radius;
            self.spherical.radius = self.clamp_distance(self.spherical.radius * self.scale);
            zoom_changed = prev_radius != self.spherical.radius;
        }

        offset = quat_inverse * self.spherical.to_vec3();
        camera.position = self.target + offset;
        camera.target = self.target;

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }

        if self.zoom_to_cursor && self.performed_cursor_zoom {
            match camera.projection {
                Projection::Perspective { .. } => {
                    // Move the camera along the cursor ray by the radius
                    // difference so the point under the cursor stays put.
                    let prev_radius = offset.length();
                    let new_radius = self.clamp_distance(prev_radius * self.scale);
                    let radius_delta = prev_radius - new_radius;
                    let forward = camera.forward();

                    camera.position += self.dolly_direction * radius_delta;
                    camera.target += self.dolly_direction * radius_delta;

                    if self.screen_space_panning {
                        self.target = camera.position + forward * new_radius;
                        camera.target = self.target;
                    } else if camera.up.normalize().dot(forward).abs() < TILT_LIMIT {
                        camera.target = self.target;
                    } else {
                        match intersect_plane(
                            camera.position,
                            forward,
                            camera.up.normalize(),
                            self.target,
                        ) {
                            Some(hit) => {
                                self.target = hit;
                                camera.target = hit;
                            }
                            None => {
                                // Ray points away from the ground plane;
                                // keep the current orientation.
                                camera.target = camera.position + forward * new_radius;
                            }
                        }
                    }

                    self.spherical.radius = new_radius;
                    zoom_changed = radius_delta != 0.0;
                }
                Projection::Orthographic { .. } => {
                    // Zoom changes scale, not distance: unproject the
                    // cursor before and after and translate by the shift.
                    let before = camera.unproject(self.mouse_ndc.extend(0.0));
                    let prev_zoom = camera.zoom;
                    camera.zoom = (camera.zoom / self.scale).clamp(self.min_zoom, self.max_zoom);
                    if prev_zoom != camera.zoom {
                        let after = camera.unproject(self.mouse_ndc.extend(0.0));
                        let shift = before - after;
                        camera.position += shift;
                        camera.target += shift;
                        zoom_changed = true;
                    }
                }
            }
        } else if matches!(camera.projection, Projection::Orthographic { .. }) && self.scale != 1.0
        {
            let prev_zoom = camera.zoom;
            camera.zoom = (camera.zoom / self.scale).clamp(self.min_zoom, self.max_zoom);
            zoom_changed = prev_zoom != camera.zoom;
        }

        self.scale = 1.0;
        self.performed_cursor_zoom = false;

        // A cheap small-angle proxy replaces a full angular comparison
        // for the orientation term.
        let orientation = camera.orientation();
        if zoom_changed
            || (self.last_position - camera.position).length_squared() > CHANGE_EPSILON
            || 8.0 * (1.0 - self.last_quaternion.dot(orientation)) > CHANGE_EPSILON
            || (self.last_target - self.target).length_squared() > CHANGE_EPSILON
        {
            self.events.push(ControlEvent::Change);
            self.last_position = camera.position;
            self.last_quaternion = orientation;
            self.last_target = self.target;
            return true;
        }

        false
    }

    // ---- gesture selection -------------------------------------------------

    fn on_pointer_down(
        &mut self,
        camera: &Camera,
        id: PointerId,
        button: PointerButton,
        position: Vec2,
        modifiers: Modifiers,
    ) -> bool {
        self.pointers.add(id, position);

        if button == PointerButton::Touch {
            self.select_touch_gesture();
        } else {
            self.select_mouse_gesture(camera, button, position, modifiers);
        }

        if self.gesture != Gesture::Idle {
            self.events.push(ControlEvent::Start);
            true
        } else {
            false
        }
    }

    fn select_mouse_gesture(
        &mut self,
        camera: &Camera,
        button: PointerButton,
        position: Vec2,
        modifiers: Modifiers,
    ) {
        let action = match button {
            PointerButton::Left => self.mouse_mapping.left,
            PointerButton::Middle => self.mouse_mapping.middle,
            PointerButton::Right => self.mouse_mapping.right,
            PointerButton::Touch => None,
        };

        // Ctrl/meta/shift swap the rotate and pan bindings.
        let swapped = modifiers.ctrl || modifiers.meta || modifiers.shift;

        self.gesture = match action {
            Some(MouseAction::Dolly) => {
                if self.enable_zoom {
                    // A drag dolly anchors cursor-centered zoom at the
                    // press position, like a wheel tick does.
                    self.update_zoom_parameters(camera, position);
                    self.dolly_start = position;
                    Gesture::Dolly
                } else {
                    Gesture::Idle
                }
            }
            Some(MouseAction::Rotate) if swapped => {
                if self.enable_pan {
                    self.pan_start = position;
                    Gesture::Pan
                } else {
                    Gesture::Idle
                }
            }
            Some(MouseAction::Rotate) => {
                if self.enable_rotate {
                    self.rotate_start = position;
                    Gesture::Rotate
                } else {
                    Gesture::Idle
                }
            }
            Some(MouseAction::Pan) if swapped => {
                if self.enable_rotate {
                    self.rotate_start = position;
                    Gesture::Rotate
                } else {
                    Gesture::Idle
                }
            }
            Some(MouseAction::Pan) => {
                if self.enable_pan {
                    self.pan_start = position;
                    Gesture::Pan
                } else {
                    Gesture::Idle
                }
            }
            None => Gesture::Idle,
        };
    }

    fn select_touch_gesture(&mut self) {
        self.gesture = match self.pointers.len() {
            1 => match self.touch_mapping.one {
                Some(TouchAction::Rotate) if self.enable_rotate => {
                    if let Some(position) = self.pointers.first_position() {
                        self.rotate_start = position;
                    }
                    Gesture::TouchRotate
                }
                Some(TouchAction::Pan) if self.enable_pan => {
                    if let Some(position) = self.pointers.first_position() {
                        self.pan_start = position;
                    }
                    Gesture::TouchPan
                }
                _ => Gesture::Idle,
            },
            2 => match self.touch_mapping.two {
                Some(TouchAction::DollyPan) if self.enable_zoom || self.enable_pan => {
                    self.start_touch_dolly_pan();
                    Gesture::TouchDollyPan
                }
                Some(TouchAction::DollyRotate) if self.enable_zoom || self.enable_rotate => {
                    self.start_touch_dolly_rotate();
                    Gesture::TouchDollyRotate
                }
                _ => Gesture::Idle,
            },
            _ => Gesture::Idle,
        };
    }

    fn start_touch_dolly_pan(&mut self) {
        let Some((a, b)) = self.pointers.pair() else {
            return;
        };
        if self.enable_zoom {
            self.dolly_start = Vec2::new(0.0, (a - b).length());
        }
        if self.enable_pan {
            self.pan_start = 0.5 * (a + b);
        }
    }

    fn start_touch_dolly_rotate(&mut self) {
        let Some((a, b)) = self.pointers.pair() else {
            return;
        };
        if self.enable_zoom {
            self.dolly_start = Vec2::new(0.0, (a - b).length());
        }
        if self.enable_rotate {
            self.rotate_start = 0.5 * (a + b);
        }
    }

    // ---- gesture motion ----------------------------------------------------

    fn on_pointer_move(&mut self, camera: &Camera, id: PointerId, position: Vec2) -> bool {
        if self.pointers.contains(id) {
            self.pointers.track(id, position);
        }

        match self.gesture {
            Gesture::Rotate if self.enable_rotate => {
                self.rotate_end = position;
                self.apply_rotate_delta(camera);
                true
            }
            Gesture::Pan if self.enable_pan => {
                self.pan_end = position;
                self.apply_pan_delta(camera);
                true
            }
            Gesture::Dolly if self.enable_zoom => {
                self.handle_mouse_move_dolly(camera, position);
                true
            }
            Gesture::TouchRotate if self.enable_rotate => {
                self.rotate_end = self.touch_gesture_point(id, position);
                self.apply_rotate_delta(camera);
                true
            }
            Gesture::TouchPan if self.enable_pan => {
                self.pan_end = self.touch_gesture_point(id, position);
                self.apply_pan_delta(camera);
                true
            }
            Gesture::TouchDollyPan => {
                if self.enable_zoom {
                    self.handle_touch_move_dolly(camera, id, position);
                }
                if self.enable_pan {
                    self.pan_end = self.touch_gesture_point(id, position);
                    self.apply_pan_delta(camera);
                }
                true
            }
            Gesture::TouchDollyRotate => {
                if self.enable_zoom {
                    self.handle_touch_move_dolly(camera, id, position);
                }
                if self.enable_rotate {
                    self.rotate_end = self.touch_gesture_point(id, position);
                    self.apply_rotate_delta(camera);
                }
                true
            }
            _ => false,
        }
    }

    /// Drag point of the active gesture: the pointer itself for single
    /// contacts, the midpoint of the pair for two-finger gestures.
    fn touch_gesture_point(&self, id: PointerId, position: Vec2) -> Vec2 {
        if self.pointers.len() < 2 {
            return position;
        }
        match self.pointers.other_position(id) {
            Some(other) => 0.5 * (position + other),
            None => position,
        }
    }

    fn apply_rotate_delta(&mut self, camera: &Camera) {
        let delta = (self.rotate_end - self.rotate_start) * self.rotate_speed;
        let height = camera.viewport().height.max(1) as f32;
        self.rotate_left(TAU * delta.x / height);
        self.rotate_up(TAU * delta.y / height);
        self.rotate_start = self.rotate_end;
    }

    fn apply_pan_delta(&mut self, camera: &Camera) {
        let delta = (self.pan_end - self.pan_start) * self.pan_speed;
        self.pan(camera, delta.x, delta.y);
        self.pan_start = self.pan_end;
    }

    fn handle_mouse_move_dolly(&mut self, camera: &Camera, position: Vec2) {
        self.dolly_end = position;
        let delta = self.dolly_end - self.dolly_start;
        if delta.y > 0.0 {
            self.dolly_out(self.zoom_scale(delta.y));
        } else if delta.y < 0.0 {
            self.dolly_in(self.zoom_scale(delta.y));
        }
        self.dolly_start = self.dolly_end;

        self.update_zoom_parameters(camera, position);
    }

    fn handle_touch_move_dolly(&mut self, camera: &Camera, id: PointerId, position: Vec2) {
        let Some(other) = self.pointers.other_position(id) else {
            return;
        };

        let distance = (position - other).length();
        self.dolly_end = Vec2::new(0.0, distance);

        // Frame-to-frame pinch ratio, raised to the zoom speed exponent.
        // A shrinking pinch dollies out: the radius grows.
        let ratio = (self.dolly_end.y / self.dolly_start.y).powf(self.zoom_speed);
        self.dolly_out(ratio);
        self.dolly_start = self.dolly_end;

        self.update_zoom_parameters(camera, 0.5 * (position + other));
    }

    // ---- gesture end -------------------------------------------------------

    fn on_pointer_up(&mut self, id: PointerId) -> bool {
        if !self.pointers.contains(id) {
            return false;
        }
        self.pointers.remove(id);

        match self.pointers.len() {
            0 => {
                if self.gesture != Gesture::Idle {
                    self.events.push(ControlEvent::End);
                }
                self.gesture = Gesture::Idle;
            }
            1 if self.gesture.is_touch() => {
                // Restart the one-finger gesture with the remaining contact.
                self.select_touch_gesture();
                if self.gesture != Gesture::Idle {
                    self.events.push(ControlEvent::Start);
                }
            }
            _ => {}
        }
        true
    }

    // ---- wheel and keyboard ------------------------------------------------

    fn on_mouse_wheel(&mut self, camera: &Camera, delta_y: f32, position: Vec2) {
        // A wheel tick is an instantaneous gesture: start, one dolly
        // step, end.
        self.events.push(ControlEvent::Start);
        self.update_zoom_parameters(camera, position);
        if delta_y < 0.0 {
            self.dolly_in(self.zoom_scale(delta_y));
        } else if delta_y > 0.0 {
            self.dolly_out(self.zoom_scale(delta_y));
        }
        self.events.push(ControlEvent::End);
    }

    fn on_key_down(&mut self, camera: &Camera, key: Key, modifiers: Modifiers) -> bool {
        let height = camera.viewport().height.max(1) as f32;
        let rotate_angle = TAU * self.rotate_speed / height;
        let rotate_instead = modifiers.ctrl || modifiers.meta || modifiers.shift;

        // Claim the event only when an action actually fired, so vetoed
        // arrow keys stay available to other listeners.
        match key {
            Key::Up => {
                if rotate_instead {
                    if self.enable_rotate {
                        self.rotate_up(rotate_angle);
                        return true;
                    }
                } else if self.enable_pan {
                    self.pan(camera, 0.0, self.key_pan_speed);
                    return true;
                }
                false
            }
            Key::Down => {
                if rotate_instead {
                    if self.enable_rotate {
                        self.rotate_up(-rotate_angle);
                        return true;
                    }
                } else if self.enable_pan {
                    self.pan(camera, 0.0, -self.key_pan_speed);
                    return true;
                }
                false
            }
            Key::Left => {
                if rotate_instead {
                    if self.enable_rotate {
                        self.rotate_left(rotate_angle);
                        return true;
                    }
                } else if self.enable_pan {
                    self.pan(camera, self.key_pan_speed, 0.0);
                    return true;
                }
                false
            }
            Key::Right => {
                if rotate_instead {
                    if self.enable_rotate {
                        self.rotate_left(-rotate_angle);
                        return true;
                    }
                } else if self.enable_pan {
                    self.pan(camera, -self.key_pan_speed, 0.0);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    // ---- delta accumulation ------------------------------------------------

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn zoom_scale(&self, delta: f32) -> f32 {
        0.95f32.powf(self.zoom_speed * (delta * 0.01).abs())
    }

    /// Translate the pending pan offset by a screen-space drag.
    ///
    /// The world-units-per-pixel factor depends on the projection: the
    /// view height at the target for perspective, the zoomed extents for
    /// orthographic.
    fn pan(&mut self, camera: &Camera, dx: f32, dy: f32) {
        let viewport = camera.viewport();
        let client_width = viewport.width.max(1) as f32;
        let client_height = viewport.height.max(1) as f32;

        match camera.projection {
            Projection::Perspective { fov, .. } => {
                let offset = camera.position - self.target;
                let target_distance = offset.length() * (fov / 2.0).tan();
                self.pan_left(2.0 * dx * target_distance / client_height, camera);
                self.pan_up(2.0 * dy * target_distance / client_height, camera);
            }
            Projection::Orthographic { width, height, .. } => {
                self.pan_left(dx * width / camera.zoom / client_width, camera);
                self.pan_up(dy * height / camera.zoom / client_height, camera);
            }
        }
    }

    fn pan_left(&mut self, distance: f32, camera: &Camera) {
        self.pan_offset += camera.right() * -distance;
    }

    fn pan_up(&mut self, distance: f32, camera: &Camera) {
        let direction = if self.screen_space_panning {
            camera.right().cross(camera.forward())
        } else {
            // Keep the motion parallel to the ground plane.
            camera.up.cross(camera.right())
        };
        self.pan_offset += direction * distance;
    }

    // ---- cursor zoom -------------------------------------------------------

    /// Record the cursor position and the ray through it for the next
    /// cursor-centered zoom resolution.
    fn update_zoom_parameters(&mut self, camera: &Camera, position: Vec2) {
        if !self.zoom_to_cursor {
            return;
        }
        self.performed_cursor_zoom = true;

        let viewport = camera.viewport();
        let dx = position.x - viewport.x as f32;
        let dy = position.y - viewport.y as f32;
        let width = viewport.width.max(1) as f32;
        let height = viewport.height.max(1) as f32;

        self.mouse_ndc = Vec2::new(dx / width * 2.0 - 1.0, -(dy / height) * 2.0 + 1.0);
        self.dolly_direction =
            (camera.unproject(self.mouse_ndc.extend(1.0)) - camera.position).normalize();
    }

    fn auto_rotation_angle(&self, delta_time: Option<f32>) -> f32 {
        match delta_time {
            Some(dt) => TAU / 60.0 * self.auto_rotate_speed * dt,
            None => TAU / 60.0 / 60.0 * self.auto_rotate_speed,
        }
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

/// Intersect a ray with a plane given by its normal and a coplanar point.
fn intersect_plane(origin: Vec3, direction: Vec3, normal: Vec3, point: Vec3) -> Option<Vec3> {
    let denom = normal.dot(direction);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    (t >= 0.0).then(|| origin + direction * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::input::event::WheelDeltaMode;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn test_camera() -> Camera {
        let mut camera = Camera::new_perspective(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.0,
            0.1,
            1000.0,
        );
        camera.set_viewport(Viewport {
            x: 0,
            y: 0,
            width: 800,
            height: 800,
        });
        camera
    }

    fn mods() -> Modifiers {
        Modifiers::default()
    }

    fn drag_left_button(from: (f32, f32), to: (f32, f32)) -> Vec<Event> {
        vec![
            Event::PointerPress {
                pointer: PointerId(0),
                button: PointerButton::Left,
                position: from,
                modifiers: mods(),
                handled: false,
            },
            Event::PointerMotion {
                pointer: PointerId(0),
                position: to,
                delta: (to.0 - from.0, to.1 - from.1),
                modifiers: mods(),
                handled: false,
            },
            Event::PointerRelease {
                pointer: PointerId(0),
                button: PointerButton::Left,
                position: to,
                modifiers: mods(),
                handled: false,
            },
        ]
    }

    #[test]
    fn test_rotate_clamps_to_azimuth_bound() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.min_azimuth_angle = -FRAC_PI_4;
        control.max_azimuth_angle = FRAC_PI_4;

        // Dragging 200 px left at 800 px height rotates +90° in one step.
        let mut events = drag_left_button((400.0, 400.0), (200.0, 400.0));
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);

        assert_eq!(control.azimuthal_angle(), FRAC_PI_4);
    }

    #[test]
    fn test_wrapped_azimuth_bounds_clamp_to_nearer_bound() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.min_azimuth_angle = 170f32.to_radians();
        control.max_azimuth_angle = (-170f32).to_radians();

        // Place the camera at 100° azimuth, inside the excluded wedge.
        let theta = 100f32.to_radians();
        camera.position = 10.0 * Vec3::new(theta.sin(), 0.0, theta.cos());
        control.update(&mut camera, None);
        assert!((control.azimuthal_angle() - control.min_azimuth_angle).abs() < 1e-5);

        // Repeated input-free updates stay put inside the bounds.
        for _ in 0..5 {
            control.update(&mut camera, None);
            let theta = control.azimuthal_angle();
            assert!(
                theta >= control.min_azimuth_angle || theta <= control.max_azimuth_angle,
                "theta {theta} escaped the wrapped bounds"
            );
        }
    }

    #[test]
    fn test_polar_angle_stays_off_the_poles() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);

        // A full-screen vertical drag overshoots the pole by a wide margin.
        let mut events = drag_left_button((400.0, 0.0), (400.0, 800.0));
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);

        assert!(control.polar_angle() > 0.0);
        assert!(control.polar_angle() < PI);
    }

    #[test]
    fn test_no_damping_applies_delta_fully_then_settles() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.take_events();

        let mut events = drag_left_button((400.0, 400.0), (200.0, 400.0));
        control.handle_events(&camera, &mut events);

        let changed = control.update(&mut camera, None);
        assert!(changed);
        assert!((control.azimuthal_angle() - FRAC_PI_2).abs() < 1e-6);

        // Steady state: the second input-free update reports no change.
        let changed = control.update(&mut camera, None);
        assert!(!changed);
    }

    #[test]
    fn test_damping_consumes_configured_fraction_per_update() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.enable_damping = true;
        control.damping_factor = 0.05;

        let mut events = drag_left_button((400.0, 400.0), (200.0, 400.0));
        control.handle_events(&camera, &mut events);

        // First update consumes exactly the damping fraction of Δ = π/2.
        control.update(&mut camera, None);
        assert!((control.azimuthal_angle() - 0.05 * FRAC_PI_2).abs() < 1e-6);

        // The pending remainder decays geometrically toward zero, so the
        // angle converges on the full delta.
        for _ in 0..400 {
            control.update(&mut camera, None);
        }
        assert!((control.azimuthal_angle() - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_save_and_reset_restore_snapshot_exactly() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.save_state(&camera);
        let saved_position = camera.position;
        let saved_zoom = camera.zoom;

        let mut events = drag_left_button((400.0, 400.0), (250.0, 300.0));
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);
        assert_ne!(camera.position, saved_position);

        control.reset(&mut camera);
        assert_eq!(camera.position, saved_position);
        assert_eq!(camera.zoom, saved_zoom);
        assert_eq!(control.target, Vec3::ZERO);
        assert!(control.take_events().contains(&ControlEvent::Change));
    }

    #[test]
    fn test_wheel_dolly_is_an_instantaneous_gesture() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.take_events();

        let mut events = vec![Event::MouseWheel {
            delta: (0.0, 100.0),
            delta_mode: WheelDeltaMode::Pixel,
            position: (400.0, 400.0),
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);

        // Positive delta scrolls down: the camera dollies out.
        assert!(control.distance() > 10.0);
        assert_eq!(
            control.take_events(),
            vec![ControlEvent::Start, ControlEvent::End, ControlEvent::Change]
        );
        assert_eq!(control.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_modifier_swaps_rotate_to_pan() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);

        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        let mut events = vec![Event::PointerPress {
            pointer: PointerId(0),
            button: PointerButton::Left,
            position: (400.0, 400.0),
            modifiers: shift,
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        assert_eq!(control.gesture(), Gesture::Pan);
    }

    #[test]
    fn test_pinch_shrink_dollies_out() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);

        let mut events = vec![
            Event::PointerPress {
                pointer: PointerId(1),
                button: PointerButton::Touch,
                position: (350.0, 400.0),
                modifiers: mods(),
                handled: false,
            },
            Event::PointerPress {
                pointer: PointerId(2),
                button: PointerButton::Touch,
                position: (450.0, 400.0),
                modifiers: mods(),
                handled: false,
            },
        ];
        control.handle_events(&camera, &mut events);
        assert_eq!(control.gesture(), Gesture::TouchDollyPan);

        // Pinch distance shrinks 100 px -> 50 px: dolly scale 0.5, applied
        // as dolly-out, so the radius doubles.
        let mut events = vec![Event::PointerMotion {
            pointer: PointerId(1),
            position: (400.0, 400.0),
            delta: (50.0, 0.0),
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);
        assert!((control.distance() - 20.0).abs() < 1e-3);

        // Lifting one finger restarts the one-finger gesture; lifting the
        // last returns to idle and ends the gesture.
        let mut events = vec![
            Event::PointerRelease {
                pointer: PointerId(2),
                button: PointerButton::Touch,
                position: (400.0, 400.0),
                modifiers: mods(),
                handled: false,
            },
        ];
        control.handle_events(&camera, &mut events);
        assert_eq!(control.gesture(), Gesture::TouchRotate);

        let mut events = vec![Event::PointerRelease {
            pointer: PointerId(1),
            button: PointerButton::Touch,
            position: (400.0, 400.0),
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        assert_eq!(control.gesture(), Gesture::Idle);
        assert!(control.take_events().contains(&ControlEvent::End));
    }

    #[test]
    fn test_auto_rotate_advances_without_timestep() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.auto_rotate = true;

        control.update(&mut camera, None);
        let expected = -(TAU / 3600.0 * control.auto_rotate_speed);
        assert!((control.azimuthal_angle() - expected).abs() < 1e-6);

        // A 1/60 s timestep produces the same increment.
        let mut camera2 = test_camera();
        let mut control2 = OrbitControl::new(&mut camera2, Vec3::ZERO);
        control2.auto_rotate = true;
        control2.update(&mut camera2, Some(1.0 / 60.0));
        assert!((control2.azimuthal_angle() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_key_pan_moves_target() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);

        let mut events = vec![Event::KeyPress {
            key: Key::Up,
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        let changed = control.update(&mut camera, None);

        assert!(changed);
        assert!(control.target.y > 0.0);
    }

    #[test]
    fn test_pan_respects_target_radius_clamp() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.max_target_radius = 1.0;

        for _ in 0..50 {
            let mut events = vec![Event::KeyPress {
                key: Key::Up,
                modifiers: mods(),
                handled: false,
            }];
            control.handle_events(&camera, &mut events);
            control.update(&mut camera, None);
        }

        assert!((control.target - control.cursor).length() <= 1.0 + 1e-5);
    }

    #[test]
    fn test_orthographic_cursor_zoom_keeps_point_fixed() {
        let mut camera = Camera::new_orthographic(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            20.0,
            20.0,
            0.1,
            100.0,
        );
        camera.set_viewport(Viewport {
            x: 0,
            y: 0,
            width: 800,
            height: 800,
        });
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.zoom_to_cursor = true;

        let ndc = Vec3::new(0.5, 0.0, 0.0);
        let before = camera.unproject(ndc);

        let mut events = vec![Event::MouseWheel {
            delta: (0.0, -100.0),
            delta_mode: WheelDeltaMode::Pixel,
            position: (600.0, 400.0),
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);
        control.update(&mut camera, None);

        assert!(camera.zoom > 1.0);
        let after = camera.unproject(ndc);
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn test_disconnect_ignores_input() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.update(&mut camera, None);
        control.take_events();
        control.disconnect();

        let mut events = drag_left_button((400.0, 400.0), (200.0, 400.0));
        control.handle_events(&camera, &mut events);
        let changed = control.update(&mut camera, None);

        assert!(!changed);
        assert_eq!(control.azimuthal_angle(), 0.0);

        control.connect();
        let mut events = drag_left_button((400.0, 400.0), (200.0, 400.0));
        control.handle_events(&camera, &mut events);
        assert!(control.update(&mut camera, None));
    }

    #[test]
    fn test_disabled_action_vetoes_gesture() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.enable_rotate = false;
        control.take_events();

        let mut events = vec![Event::PointerPress {
            pointer: PointerId(0),
            button: PointerButton::Left,
            position: (400.0, 400.0),
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);

        assert_eq!(control.gesture(), Gesture::Idle);
        assert!(control.take_events().is_empty());
    }

    #[test]
    fn test_target_on_anchor_survives_min_target_radius() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.min_target_radius = 1.0;

        // The target starts exactly on the anchor; the radius clamp has
        // no direction to push it along and must leave the pose intact.
        control.update(&mut camera, None);

        assert!(camera.position.is_finite());
        assert_eq!(control.target, Vec3::ZERO);
        assert!((camera.position - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_drag_dolly_zooms_toward_cursor() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.zoom_to_cursor = true;

        // Middle-button drag upward at a point right of center.
        let mut events = vec![
            Event::PointerPress {
                pointer: PointerId(0),
                button: PointerButton::Middle,
                position: (600.0, 400.0),
                modifiers: mods(),
                handled: false,
            },
            Event::PointerMotion {
                pointer: PointerId(0),
                position: (600.0, 300.0),
                delta: (0.0, -100.0),
                modifiers: mods(),
                handled: false,
            },
        ];
        control.handle_events(&camera, &mut events);
        assert_eq!(control.gesture(), Gesture::Dolly);

        control.update(&mut camera, None);

        // Zooming in pulls the camera along the ray through the cursor,
        // which lies right of center, not straight down the view axis.
        assert!(control.distance() < 10.0);
        assert!(camera.position.x > 0.0);
    }

    #[test]
    fn test_vetoed_arrow_key_leaves_event_unhandled() {
        let mut camera = test_camera();
        let mut control = OrbitControl::new(&mut camera, Vec3::ZERO);
        control.enable_pan = false;

        let mut events = vec![Event::KeyPress {
            key: Key::Up,
            modifiers: mods(),
            handled: false,
        }];
        control.handle_events(&camera, &mut events);

        assert!(!events[0].is_handled());
        assert!(!control.update(&mut camera, None));
    }
}
