//! # Chunk Creation Module
//!
//! Builder that fills a chunk cell by cell in flat index order (x fastest,
//! then y, then z) and finalizes it with a full visibility pass.

use std::sync::Arc;

use bitvec::vec::BitVec;
use cgmath::{Point2, Point3};

use crate::engine_state::geometry::Aabb;
use crate::engine_state::voxels::block::{block_type::BlockType, palette::BlockPalette, Block};

use super::{Chunk, ChunkDimensions};

/// A builder for populating chunks in storage order.
///
/// The builder only becomes a chunk once every cell has been pushed, so a
/// chunk is never observable in a partially generated state.
pub struct ChunkCreationIterator {
    /// The lattice position of the chunk being created
    position: Point2<i32>,
    /// Extent of the chunk being created
    dimensions: ChunkDimensions,
    /// Blocks pushed so far
    blocks: Vec<Block>,
    /// Number of solid blocks pushed so far
    solid_count: usize,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: Point2<i32>, dimensions: ChunkDimensions) -> Self {
        ChunkCreationIterator {
            position,
            dimensions,
            blocks: Vec::with_capacity(dimensions.volume()),
            solid_count: 0,
        }
    }

    /// Adds a block at the current position and advances the position.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        debug_assert!(self.blocks.len() < self.dimensions.volume());
        if !block_type.is_air() {
            self.solid_count += 1;
        }
        self.blocks.push(Block::new(block_type));
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk` with
    /// its visibility computed.
    ///
    /// # Panics
    /// Panics if fewer blocks than the chunk volume were pushed.
    pub fn return_chunk(self, palette: Arc<BlockPalette>) -> Chunk {
        let volume = self.dimensions.volume();
        assert_eq!(
            self.blocks.len(),
            volume,
            "Chunk {:?} was finalized after {} of {} blocks",
            self.position,
            self.blocks.len(),
            volume
        );

        let origin = Chunk::origin_of(self.position, self.dimensions);
        let bounds = Aabb::new(
            Point3::new(origin.x, 0.0, origin.y),
            Point3::new(
                origin.x + self.dimensions.width as f32,
                self.dimensions.height as f32,
                origin.y + self.dimensions.depth as f32,
            ),
        );

        let mut chunk = Chunk {
            position: self.position,
            dimensions: self.dimensions,
            blocks: self.blocks,
            visible: BitVec::repeat(false, volume),
            visible_indices: Vec::with_capacity(self.solid_count),
            bounds,
            palette,
        };
        chunk.update_visibility();

        log::trace!(
            "Created chunk {:?} with {} solid and {} visible blocks",
            chunk.position,
            self.solid_count,
            chunk.visible_count()
        );

        chunk
    }
}
