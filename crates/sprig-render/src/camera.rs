//! Orthographic 2D camera.

use glam::{Mat4, Vec2, Vec3};

/// Depth range covered by the camera; sprite layers live in `0..FAR_PLANE`.
pub const FAR_PLANE: f32 = 100.0;

/// An orthographic camera looking down -Z.
///
/// `size` is the visible width in world units; the visible height follows
/// from `aspect` (width / height).
///
/// ```
/// use sprig_render::Camera2D;
/// use glam::{Vec2, Vec3};
///
/// let camera = Camera2D::new(Vec2::ZERO, 2.0, 10.0);
/// let clip = camera.view_projection().project_point3(Vec3::new(5.0, 2.5, 0.0));
/// assert!((clip.x - 1.0).abs() < 1e-6 && (clip.y - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub aspect: f32,
    pub size: f32,
}

impl Camera2D {
    pub const fn new(position: Vec2, aspect: f32, size: f32) -> Self {
        Self {
            position,
            aspect,
            size,
        }
    }

    /// Update the aspect ratio after the target was resized.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Half extents of the visible area.
    pub fn half_extents(&self) -> Vec2 {
        let w = self.size / 2.0;
        Vec2::new(w, w / self.aspect)
    }

    pub fn projection(&self) -> Mat4 {
        let half = self.half_extents();
        Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, 0.0, FAR_PLANE)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position.extend(0.0))
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World position under a pixel of a `viewport`-sized target
    /// (origin top-left, +y down).
    pub fn screen_to_world(&self, screen: Vec2, viewport: Vec2) -> Vec2 {
        let ndc = Vec2::new(
            screen.x / viewport.x * 2.0 - 1.0,
            1.0 - screen.y / viewport.y * 2.0,
        );
        let world = self
            .view_projection()
            .inverse()
            .project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        world.truncate()
    }
}
