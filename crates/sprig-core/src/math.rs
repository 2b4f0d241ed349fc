/// Vector and matrix types used throughout the renderer.
///
/// Re-exports [`glam`], whose `Mat4::orthographic_rh` maps view depth into the
/// `0..1` clip range wgpu expects.
///
/// ```
/// use sprig_core::math::{Mat4, Vec3};
///
/// let view = Mat4::from_translation(-Vec3::new(2.0, 1.0, 0.0));
/// assert_eq!(view.transform_point3(Vec3::new(2.0, 1.0, 0.0)), Vec3::ZERO);
/// ```
pub use glam::*;
