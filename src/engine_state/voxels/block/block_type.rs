//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `Air` is the empty sentinel. Every other variant is an opaque identifier
/// whose appearance is resolved through the
/// [`BlockPalette`](super::palette::BlockPalette).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    /// No solid occupant.
    #[default]
    Air,

    /// Generic solid block below the terrain surface.
    Stone,

    /// Surface block placed on top of every terrain column.
    Grass,

    /// Grass with the debug texture, available for placement.
    GrassVariant,
}

impl BlockType {
    /// All solid block types.
    pub const SOLID: [BlockType; 3] = [BlockType::Stone, BlockType::Grass, BlockType::GrassVariant];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Panics
    /// Panics if the input value doesn't correspond to a valid `BlockType`.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        let btype_option = num::FromPrimitive::from_u8(btype);
        btype_option.unwrap()
    }

    /// Whether this type is the empty sentinel.
    pub fn is_air(self) -> bool {
        self == BlockType::Air
    }
}
