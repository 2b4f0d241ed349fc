//! Sprites and their quad geometry.

use crate::{
    color::Color,
    vertex::{Quad, Vertex},
};
use glam::Vec2;
use sprig_core::world::Transform;
use sprig_test_utils::TextureId;

/// A textured rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Normalized pivot: `(0, 0)` pins the bottom-left corner to the
    /// transform position, `(0.5, 0.5)` centers the sprite on it.
    pub anchor: Vec2,
    pub color: Color,
    pub texture: TextureId,
}

impl Sprite {
    pub fn new(texture: TextureId) -> Self {
        Self {
            anchor: Vec2::ZERO,
            color: Color::WHITE,
            texture,
        }
    }

    pub fn centered(texture: TextureId) -> Self {
        Self {
            anchor: Vec2::splat(0.5),
            ..Self::new(texture)
        }
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Six vertices covering `transform.scale` world units at `transform.position`,
/// offset by `anchor * scale`. UVs span the whole texture.
pub fn emit_sprite_quad(sprite: &Sprite, transform: &Transform) -> Quad {
    let scale = transform.scale;
    let origin = transform.position.truncate() - sprite.anchor * scale;
    let z = -transform.position.z;
    let color = sprite.color.to_array();

    let corner = |u: f32, v: f32| {
        Vertex::new(
            [origin.x + u * scale.x, origin.y + v * scale.y, z],
            [u, v],
            color,
        )
    };

    Quad::from_corners(
        corner(0.0, 0.0),
        corner(0.0, 1.0),
        corner(1.0, 1.0),
        corner(1.0, 0.0),
    )
}
