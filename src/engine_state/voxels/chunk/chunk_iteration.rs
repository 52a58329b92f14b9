//! # Chunk Iteration Module
//!
//! Iteration over the visible blocks of a chunk. Only the cached visible list
//! is walked, so hidden and empty cells cost nothing.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::Chunk;

/// An iterator over all visible blocks in a chunk, in draw order.
///
/// Yields the local position of each block together with its type.
pub struct VisibleBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Current position in the visible list
    cursor: usize,
}

impl<'a> VisibleBlockIterator<'a> {
    /// Creates a new `VisibleBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        VisibleBlockIterator {
            chunk_ref,
            cursor: 0,
        }
    }
}

impl Iterator for VisibleBlockIterator<'_> {
    type Item = (Point3<i32>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.chunk_ref.visible_indices.get(self.cursor)?;
        self.cursor += 1;
        let position = self.chunk_ref.dimensions.position_of(index);
        Some((position, self.chunk_ref.blocks[index].block_type()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_ref.visible_indices.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for VisibleBlockIterator<'_> {}
