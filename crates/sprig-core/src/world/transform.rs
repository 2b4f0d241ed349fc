use glam::{Vec2, Vec3};

/// Placement of a drawable: position in world units and the size of the quad.
///
/// `position.z` selects the layer; larger values are further from the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl Transform {
    pub const fn new(position: Vec3, scale: Vec2) -> Self {
        Self { position, scale }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_layer(mut self, z: f32) -> Self {
        self.position.z = z;
        self
    }

    /// Place `self` (a local transform) under `parent`'s world transform.
    ///
    /// Positions accumulate along the chain; scale stays the child's own since
    /// it is a size, not a multiplier.
    pub fn under(self, parent: &Transform) -> Self {
        Self {
            position: parent.position + self.position,
            scale: self.scale,
        }
    }
}
