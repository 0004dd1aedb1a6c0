//! Camera and viewer abstractions
//!
//! Provides camera types for 3D rendering and the derived quantities the
//! orbit controller needs (look-at orientation, NDC unprojection).

use glam::{Mat3, Mat4, Quat, Vec3};

/// Viewport information.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Get the aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Projection mode for a camera.
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Field of view in radians.
        fov: f32,
        /// Aspect ratio (width / height).
        aspect: f32,
        /// Near clipping plane.
        near: f32,
        /// Far clipping plane.
        far: f32,
    },
    /// Orthographic projection.
    Orthographic {
        /// Width of the view.
        width: f32,
        /// Height of the view.
        height: f32,
        /// Near clipping plane.
        near: f32,
        /// Far clipping plane.
        far: f32,
    },
}

impl Projection {
    /// Create a perspective projection.
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::Perspective {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// Create an orthographic projection.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self::Orthographic {
            width,
            height,
            near,
            far,
        }
    }

    /// Get the projection matrix.
    ///
    /// `zoom` scales the orthographic view extents; perspective projection
    /// ignores it (zooming a perspective camera is a distance change).
    pub fn matrix(&self, zoom: f32) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov, aspect, near, far),
            Projection::Orthographic {
                width,
                height,
                near,
                far,
            } => {
                let half_w = width / (2.0 * zoom);
                let half_h = height / (2.0 * zoom);
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, near, far)
            }
        }
    }

    /// Update the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = self {
            *a = aspect;
        }
    }
}

/// Trait for objects that can view a scene.
pub trait Viewer {
    /// Get the camera position.
    fn position(&self) -> Vec3;

    /// Get the view matrix.
    fn view_matrix(&self) -> Mat4;

    /// Get the projection matrix.
    fn projection_matrix(&self) -> Mat4;

    /// Get the combined view-projection matrix.
    fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the viewport.
    fn viewport(&self) -> Viewport;
}

/// A 3D camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Zoom factor. Scales the orthographic view extents; 1.0 is unzoomed.
    pub zoom: f32,
    /// Projection mode.
    pub projection: Projection,
    /// Viewport.
    viewport: Viewport,
}

impl Camera {
    /// Create a new perspective camera.
    pub fn new_perspective(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            zoom: 1.0,
            projection: Projection::perspective(fov_degrees, aspect, near, far),
            viewport: Viewport {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
        }
    }

    /// Create a new orthographic camera.
    pub fn new_orthographic(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            zoom: 1.0,
            projection: Projection::orthographic(width, height, near, far),
            viewport: Viewport {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
        }
    }

    /// Set the viewport and update aspect ratio.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.projection.set_aspect(viewport.aspect());
    }

    /// Get the forward direction (from camera to target).
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Get the right direction.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Get the world-space rotation derived from the look-at basis.
    ///
    /// The camera looks down its local -Z axis, matching the view matrix.
    pub fn orientation(&self) -> Quat {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        Quat::from_mat3(&Mat3::from_cols(right, up, -forward))
    }

    /// Unproject a normalized-device-coordinate point into world space.
    ///
    /// `ndc` is in the `[-1, 1]` square with z picking the depth, 0 at
    /// the near plane and 1 at the far plane.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection_matrix()
            .inverse()
            .project_point3(ndc)
    }
}

impl Viewer for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix(self.zoom)
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// View-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera eye position (w component unused).
    pub eye: [f32; 4],
}

impl CameraUniform {
    /// Create a new camera uniform from a viewer.
    pub fn from_viewer(viewer: &dyn Viewer) -> Self {
        let vp = viewer.view_projection_matrix();
        let pos = viewer.position();
        Self {
            view_proj: vp.to_cols_array_2d(),
            eye: [pos.x, pos.y, pos.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_matches_view_matrix() {
        let camera = Camera::new_perspective(
            Vec3::new(3.0, 4.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            60.0,
            1.5,
            0.1,
            100.0,
        );

        // The view matrix rotation must be the inverse of the world rotation.
        let world = Mat4::from_rotation_translation(camera.orientation(), camera.position);
        let roundtrip = camera.view_matrix() * world;

        let diff = (roundtrip - Mat4::IDENTITY).to_cols_array();
        for v in diff {
            assert!(v.abs() < 1e-5);
        }
    }

    #[test]
    fn test_orthographic_zoom_scales_extents() {
        let mut camera = Camera::new_orthographic(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::ZERO,
            Vec3::Y,
            20.0,
            20.0,
            0.1,
            100.0,
        );

        // A world point halfway to the right edge of the unzoomed view.
        let p = Vec3::new(5.0, 0.0, 0.0);
        let ndc = camera.view_projection_matrix().project_point3(p);
        assert!((ndc.x - 0.5).abs() < 1e-5);

        // Doubling zoom halves the extents, pushing the point to the edge.
        camera.zoom = 2.0;
        let ndc = camera.view_projection_matrix().project_point3(p);
        assert!((ndc.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unproject_roundtrip() {
        let camera = Camera::new_perspective(
            Vec3::new(0.0, 2.0, 8.0),
            Vec3::ZERO,
            Vec3::Y,
            45.0,
            1.0,
            0.1,
            100.0,
        );

        let world = Vec3::new(1.0, -0.5, 2.0);
        let ndc = camera.view_projection_matrix().project_point3(world);
        let back = camera.unproject(ndc);
        assert!((back - world).length() < 1e-3);
    }
}
