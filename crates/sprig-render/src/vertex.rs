//! Vertex data written into the batch's staging buffer.

/// One vertex of a sprite or glyph quad.
///
/// Matches the WGSL `VertexInput` of the sprite shader: position at
/// location 0, uv at 1, color at 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x2,
            2 => Float32x4,
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

/// Vertices per quad: two triangles, no index buffer.
pub const VERTICES_PER_QUAD: u32 = 6;

/// Two triangles covering one textured rectangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quad {
    pub vertices: [Vertex; VERTICES_PER_QUAD as usize],
}

impl Quad {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Build a quad from its four corners, emitted as
    /// `bl, tl, tr` then `bl, tr, br`.
    pub const fn from_corners(bl: Vertex, tl: Vertex, tr: Vertex, br: Vertex) -> Self {
        Self {
            vertices: [bl, tl, tr, bl, tr, br],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(Vertex::layout().array_stride, 36);
    }

    #[test]
    fn test_quad_is_six_packed_vertices() {
        assert_eq!(Quad::SIZE, 6 * 36);
    }

    #[test]
    fn test_from_corners_order() {
        let v = |x: f32| Vertex::new([x, 0.0, 0.0], [0.0; 2], [1.0; 4]);
        let quad = Quad::from_corners(v(0.0), v(1.0), v(2.0), v(3.0));
        let xs: Vec<f32> = quad.vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0]);
    }
}
