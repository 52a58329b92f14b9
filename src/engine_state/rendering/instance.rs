//! Per-block instance data handed to the render collaborator.

use cgmath::Point3;

use crate::engine_state::voxels::block::palette::Appearance;

/// A single unit cube to draw.
///
/// # Memory Layout
/// - Translation: 3x f32 (12 bytes)
/// - Texture Indices: 6x u32 (24 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockInstance {
    /// World-space position of the lower corner of the cube
    pub translation: [f32; 3],
    /// Texture indices per face, in `BlockSide` order
    pub texture_indices: [u32; 6],
}

impl BlockInstance {
    /// Creates an instance for a cube at `translation` with the given appearance.
    pub fn new(translation: Point3<f32>, appearance: &Appearance) -> Self {
        BlockInstance {
            translation: translation.into(),
            texture_indices: appearance.texture_indices,
        }
    }
}
