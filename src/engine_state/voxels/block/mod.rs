//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the compact block
//! storage type and the appearance palette.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;
pub mod palette;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in a chunk.
///
/// This is a lightweight structure that stores only the block type. Every
/// other property of a block is looked up from its type.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout, and an
/// all-zero block is `BlockType::Air`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// An empty cell.
    pub const AIR: Block = Block {
        block_type: BlockType::Air as BlockTypeSize,
    };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decodes the stored type.
    pub fn block_type(&self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Whether the block has a solid occupant.
    pub fn is_solid(&self) -> bool {
        self.block_type != BlockType::Air as BlockTypeSize
    }
}
