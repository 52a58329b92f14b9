//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense, fixed-size 3D grid of
//! blocks placed at a world-aligned origin. A chunk owns its blocks, the cached
//! visibility of every cell and the list of currently visible cells.
//!
//! ## Storage
//!
//! - `blocks`: one `Block` per cell, flattened with x varying fastest, then y,
//!   then z
//! - `visible`: a bit vector with one bit per cell, in the same order
//! - `visible_indices`: the flat indices of all set bits, kept sorted
//!
//! The sorted visible list is the canonical draw order and is the only set of
//! cells ever considered for drawing and picking.
//!
//! ## Visibility
//!
//! A cell is visible iff it is solid and at least one of its six neighbours is
//! empty. Cells outside the chunk count as empty, so the outer faces of a
//! chunk are always drawn.

use std::sync::Arc;

use anyhow::{Context, Result};
use bitvec::prelude::BitVec;
use cgmath::{Point2, Point3};
use serde::{Deserialize, Serialize};

use chunk_creation::ChunkCreationIterator;
use chunk_iteration::VisibleBlockIterator;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::palette::BlockPalette;
use super::block::Block;
use super::terrain::HeightSource;
use crate::engine_state::geometry::Aabb;
use crate::engine_state::rendering::{BlockInstance, RenderSubmitter};

mod chunk_creation;
pub mod chunk_hit;
pub mod chunk_iteration;

pub use chunk_hit::{neighbor_position, ChunkHit};

/// The default dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: usize = 16;

/// Scaling factor applied to world coordinates when sampling the height source.
pub const HEIGHT_SCALE_FACTOR: f64 = 0.02;

/// Extent of a chunk along each axis, in blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDimensions {
    /// Extent along x
    pub width: usize,
    /// Extent along y
    pub height: usize,
    /// Extent along z
    pub depth: usize,
}

impl ChunkDimensions {
    /// Creates a new set of dimensions.
    pub const fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of cells.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Number of cells in one xy plane.
    pub fn plane_size(&self) -> usize {
        self.width * self.height
    }

    /// Whether the local position lies inside the chunk.
    pub fn contains(&self, pos: Point3<i32>) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
            && (pos.z as usize) < self.depth
    }

    /// Flat index of a local position. The position must lie inside the chunk.
    pub fn index_of(&self, pos: Point3<i32>) -> usize {
        debug_assert!(self.contains(pos));
        pos.x as usize + self.width * pos.y as usize + self.plane_size() * pos.z as usize
    }

    /// Local position of a flat index.
    pub fn position_of(&self, index: usize) -> Point3<i32> {
        let z = index / self.plane_size();
        let rest = index % self.plane_size();
        let y = rest / self.width;
        let x = rest % self.width;
        Point3::new(x as i32, y as i32, z as i32)
    }
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        Self::new(CHUNK_DIMENSION, CHUNK_DIMENSION, CHUNK_DIMENSION)
    }
}

/// The state of one cell as seen from outside the chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The block occupying the cell
    pub block_type: BlockType,
    /// Whether the cell is drawn and can be picked
    pub visible: bool,
}

/// A fixed-size grid of blocks at a position in the chunk lattice.
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (x and z).
    position: Point2<i32>,

    /// Extent of the grid.
    dimensions: ChunkDimensions,

    /// One block per cell, x fastest, then y, then z.
    blocks: Vec<Block>,

    /// Cached visibility bit per cell, same order as `blocks`.
    visible: BitVec,

    /// Flat indices of all visible cells, ascending.
    visible_indices: Vec<usize>,

    /// World-space bounds, fixed for the lifetime of the chunk.
    bounds: Aabb,

    /// Shared, read-only appearance lookup.
    palette: Arc<BlockPalette>,
}

impl Chunk {
    /// Creates a chunk whose columns are filled up to heights sampled from
    /// `height_source`.
    ///
    /// For the column at world position `(wx, wz)` the height is
    /// `h = sample(wx * scale, wz * scale) * height` and `top = floor(h)`. The
    /// cell at `y = top - 1` becomes grass, every cell below it stone and
    /// everything from `top` upwards stays empty. A column with `top == 0` is
    /// empty.
    ///
    /// Generation is atomic: all columns are sampled before the chunk is
    /// built, so a failing sample leaves nothing behind.
    ///
    /// # Errors
    /// Returns an error if the height source fails or yields a value outside
    /// `[0, 1)`.
    pub fn generate(
        position: Point2<i32>,
        dimensions: ChunkDimensions,
        palette: Arc<BlockPalette>,
        height_source: &dyn HeightSource,
        scale: f64,
    ) -> Result<Self> {
        let origin = Self::origin_of(position, dimensions);
        let mut column_tops = Vec::with_capacity(dimensions.width * dimensions.depth);

        for k in 0..dimensions.depth {
            for i in 0..dimensions.width {
                let world_x = origin.x as f64 + i as f64;
                let world_z = origin.y as f64 + k as f64;
                let sample = height_source
                    .sample_checked(world_x * scale, world_z * scale)
                    .with_context(|| {
                        format!(
                            "Failed to sample terrain height for column ({}, {}) of chunk {:?}",
                            world_x, world_z, position
                        )
                    })?;
                let top = ((sample * dimensions.height as f64).floor() as usize)
                    .min(dimensions.height);
                column_tops.push(top);
            }
        }

        let mut cci = ChunkCreationIterator::new(position, dimensions);
        for index in 0..dimensions.volume() {
            let pos = dimensions.position_of(index);
            let top = column_tops[pos.x as usize + dimensions.width * pos.z as usize];
            cci.push_block_type(Self::column_block_type(pos.y as usize, top));
        }

        Ok(cci.return_chunk(palette))
    }

    /// The block type of cell `y` in a column whose first empty cell is `top`.
    fn column_block_type(y: usize, top: usize) -> BlockType {
        if y >= top {
            BlockType::Air
        } else if y + 1 == top {
            BlockType::Grass
        } else {
            BlockType::Stone
        }
    }

    /// Creates a new, completely empty chunk.
    pub fn empty(position: Point2<i32>, dimensions: ChunkDimensions, palette: Arc<BlockPalette>) -> Self {
        Self::from_fn(position, dimensions, palette, |_| BlockType::Air)
    }

    /// Creates a new chunk filled with stone.
    pub fn solid(position: Point2<i32>, dimensions: ChunkDimensions, palette: Arc<BlockPalette>) -> Self {
        Self::from_fn(position, dimensions, palette, |_| BlockType::Stone)
    }

    /// Creates a new chunk with a 3D checkerboard of stone and air.
    pub fn checkerboard(
        position: Point2<i32>,
        dimensions: ChunkDimensions,
        palette: Arc<BlockPalette>,
    ) -> Self {
        Self::from_fn(position, dimensions, palette, |pos| {
            if (pos.x + pos.y + pos.z) % 2 == 0 {
                BlockType::Stone
            } else {
                BlockType::Air
            }
        })
    }

    /// Creates a chunk by evaluating `block_at` for every local position.
    pub fn from_fn(
        position: Point2<i32>,
        dimensions: ChunkDimensions,
        palette: Arc<BlockPalette>,
        mut block_at: impl FnMut(Point3<i32>) -> BlockType,
    ) -> Self {
        let mut cci = ChunkCreationIterator::new(position, dimensions);
        for index in 0..dimensions.volume() {
            cci.push_block_type(block_at(dimensions.position_of(index)));
        }
        cci.return_chunk(palette)
    }

    /// World-space (x, z) origin of the chunk at `position`.
    pub fn origin_of(position: Point2<i32>, dimensions: ChunkDimensions) -> Point2<f32> {
        Point2::new(
            position.x as f32 * dimensions.width as f32,
            position.y as f32 * dimensions.depth as f32,
        )
    }

    /// The chunk's position in the chunk lattice.
    pub fn position(&self) -> Point2<i32> {
        self.position
    }

    /// The world-space (x, z) position of local cell (0, 0, 0).
    pub fn origin(&self) -> Point2<f32> {
        Self::origin_of(self.position, self.dimensions)
    }

    /// Extent of the grid.
    pub fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// World-space bounds of the chunk.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// World-space position of the lower corner of a local cell.
    pub fn world_position(&self, local: Point3<i32>) -> Point3<f32> {
        let origin = self.origin();
        Point3::new(
            origin.x + local.x as f32,
            local.y as f32,
            origin.y + local.z as f32,
        )
    }

    /// Flat indices of all visible cells, in draw order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Number of visible cells.
    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }

    /// Iterates the visible blocks in draw order.
    pub fn visible_blocks(&self) -> VisibleBlockIterator<'_> {
        VisibleBlockIterator::new(self)
    }

    /// Returns the type and visibility of the cell at `pos`.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the chunk.
    pub fn cell(&self, pos: Point3<i32>) -> Cell {
        let index = self.checked_index(pos);
        Cell {
            block_type: self.blocks[index].block_type(),
            visible: self.visible[index],
        }
    }

    /// Returns the block type at `pos`.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the chunk.
    pub fn block_type_at(&self, pos: Point3<i32>) -> BlockType {
        self.cell(pos).block_type
    }

    /// Checks if the block at `pos` is solid. Positions outside the chunk are
    /// treated as empty.
    pub fn is_block_solid(&self, pos: Point3<i32>) -> bool {
        self.dimensions.contains(pos) && self.blocks[self.dimensions.index_of(pos)].is_solid()
    }

    /// Removes the block at `pos`.
    ///
    /// Returns the removed type, or `None` if the cell was already empty, in
    /// which case nothing changes.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the chunk.
    pub fn remove_block(&mut self, pos: Point3<i32>) -> Option<BlockType> {
        let index = self.checked_index(pos);
        let block = self.blocks[index];
        if !block.is_solid() {
            return None;
        }
        self.blocks[index] = Block::AIR;
        self.update_block_visibility(pos);
        Some(block.block_type())
    }

    /// Places a block of `block_type` at `pos`.
    ///
    /// Returns `false` without changing anything if the cell is occupied.
    ///
    /// # Panics
    /// Panics if `pos` lies outside the chunk or if `block_type` is air.
    pub fn place_block(&mut self, pos: Point3<i32>, block_type: BlockType) -> bool {
        assert!(!block_type.is_air(), "Tried to place air at {:?}", pos);
        let index = self.checked_index(pos);
        if self.blocks[index].is_solid() {
            return false;
        }
        self.blocks[index] = Block::new(block_type);
        self.update_block_visibility(pos);
        true
    }

    /// Submits every visible block to `submitter`, in draw order.
    ///
    /// # Errors
    /// Returns an error if the palette has no appearance for a visible block.
    pub fn draw(&self, submitter: &mut impl RenderSubmitter) -> Result<()> {
        for (pos, block_type) in self.visible_blocks() {
            let appearance = self.palette.lookup(block_type).with_context(|| {
                format!("Failed to draw block {:?} of chunk {:?}", pos, self.position)
            })?;
            submitter.submit(BlockInstance::new(self.world_position(pos), appearance));
        }
        Ok(())
    }

    /// Recomputes the visibility of every cell and rebuilds the visible list.
    pub fn update_visibility(&mut self) {
        self.visible_indices.clear();
        for index in 0..self.dimensions.volume() {
            let pos = self.dimensions.position_of(index);
            let is_visible = self.compute_visibility(pos);
            self.visible.set(index, is_visible);
            if is_visible {
                self.visible_indices.push(index);
            }
        }
    }

    /// Recomputes the visibility of the cell at `pos` and its six neighbours.
    ///
    /// The visible list stays sorted, so the result is identical to a full
    /// [`update_visibility`](Self::update_visibility) pass.
    pub fn update_block_visibility(&mut self, pos: Point3<i32>) {
        let affected = std::iter::once(pos).chain(BlockSide::all().map(|side| side.neighbor_of(pos)));

        for affected_pos in affected {
            if !self.dimensions.contains(affected_pos) {
                continue;
            }
            let index = self.dimensions.index_of(affected_pos);
            let is_visible = self.compute_visibility(affected_pos);
            if self.visible[index] == is_visible {
                continue;
            }
            self.visible.set(index, is_visible);
            match self.visible_indices.binary_search(&index) {
                Ok(slot) if !is_visible => {
                    self.visible_indices.remove(slot);
                }
                Err(slot) if is_visible => self.visible_indices.insert(slot, index),
                _ => {}
            }
        }
    }

    /// A cell is visible if it is solid and any neighbour is empty.
    fn compute_visibility(&self, pos: Point3<i32>) -> bool {
        self.is_block_solid(pos)
            && BlockSide::all()
                .iter()
                .any(|side| !self.is_block_solid(side.neighbor_of(pos)))
    }

    fn checked_index(&self, pos: Point3<i32>) -> usize {
        assert!(
            self.dimensions.contains(pos),
            "Block position {:?} lies outside chunk of dimensions {:?}",
            pos,
            self.dimensions
        );
        self.dimensions.index_of(pos)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine_state::rendering::InstanceCollector;
    use crate::engine_state::voxels::terrain::ConstantHeightSource;

    fn palette() -> Arc<BlockPalette> {
        Arc::new(BlockPalette::default())
    }

    fn small() -> ChunkDimensions {
        ChunkDimensions::new(4, 4, 4)
    }

    fn assert_visibility_consistent(chunk: &Chunk) {
        let dims = chunk.dimensions();
        let mut expected = Vec::new();
        for index in 0..dims.volume() {
            let pos = dims.position_of(index);
            let cell = chunk.cell(pos);
            let exposed = BlockSide::all()
                .iter()
                .any(|side| !chunk.is_block_solid(side.neighbor_of(pos)));
            let should_be_visible = !cell.block_type.is_air() && exposed;
            assert_eq!(cell.visible, should_be_visible, "cell {:?}", pos);
            if should_be_visible {
                expected.push(index);
            }
        }
        assert_eq!(chunk.visible_indices(), expected.as_slice());
    }

    #[test]
    fn index_and_position_are_inverse() {
        let dims = ChunkDimensions::new(3, 5, 2);
        for index in 0..dims.volume() {
            assert_eq!(dims.index_of(dims.position_of(index)), index);
        }
        assert_eq!(dims.index_of(Point3::new(1, 0, 0)), 1);
        assert_eq!(dims.index_of(Point3::new(0, 1, 0)), 3);
        assert_eq!(dims.index_of(Point3::new(0, 0, 1)), 15);
    }

    #[test]
    fn contains_rejects_negative_and_too_large_positions() {
        let dims = small();
        assert!(dims.contains(Point3::new(0, 3, 3)));
        assert!(!dims.contains(Point3::new(-1, 0, 0)));
        assert!(!dims.contains(Point3::new(0, 4, 0)));
    }

    #[test]
    fn empty_cells_are_never_visible_after_generation() {
        for height in [0.0, 0.1, 0.5, 0.74, 0.99] {
            let chunk = Chunk::generate(
                Point2::new(0, 0),
                small(),
                palette(),
                &ConstantHeightSource(height),
                HEIGHT_SCALE_FACTOR,
            )
            .unwrap();
            for index in 0..small().volume() {
                let cell = chunk.cell(small().position_of(index));
                if cell.block_type.is_air() {
                    assert!(!cell.visible);
                }
            }
            assert_visibility_consistent(&chunk);
        }
    }

    #[test]
    fn generation_with_half_height_builds_grass_over_stone() {
        let chunk = Chunk::generate(
            Point2::new(0, 0),
            small(),
            palette(),
            &ConstantHeightSource(0.5),
            HEIGHT_SCALE_FACTOR,
        )
        .unwrap();
        for x in 0..4 {
            for z in 0..4 {
                assert_eq!(chunk.block_type_at(Point3::new(x, 0, z)), BlockType::Stone);
                assert_eq!(chunk.block_type_at(Point3::new(x, 1, z)), BlockType::Grass);
                assert_eq!(chunk.block_type_at(Point3::new(x, 2, z)), BlockType::Air);
                assert_eq!(chunk.block_type_at(Point3::new(x, 3, z)), BlockType::Air);
                assert!(chunk.cell(Point3::new(x, 1, z)).visible);
            }
        }
    }

    #[test]
    fn column_below_one_block_stays_empty() {
        let chunk = Chunk::generate(
            Point2::new(2, -3),
            small(),
            palette(),
            &ConstantHeightSource(0.2),
            HEIGHT_SCALE_FACTOR,
        )
        .unwrap();
        assert_eq!(chunk.visible_count(), 0);
    }

    #[test]
    fn failing_height_source_fails_generation() {
        let result = Chunk::generate(
            Point2::new(0, 0),
            small(),
            palette(),
            &ConstantHeightSource(1.5),
            HEIGHT_SCALE_FACTOR,
        );
        assert!(result.is_err());
    }

    #[test]
    fn solid_chunk_only_shows_its_outer_shell() {
        let chunk = Chunk::solid(Point2::new(0, 0), small(), palette());
        // 64 cells minus the 2x2x2 interior
        assert_eq!(chunk.visible_count(), 56);
        assert!(!chunk.cell(Point3::new(1, 1, 1)).visible);
        assert!(!chunk.cell(Point3::new(2, 2, 2)).visible);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn exposed_interior_cell_reveals_exactly_its_neighbours() {
        let dims = ChunkDimensions::new(5, 5, 5);
        let mut chunk = Chunk::solid(Point2::new(0, 0), dims, palette());
        let hidden_before = chunk.cell(Point3::new(2, 1, 2)).visible;
        assert!(!hidden_before);

        let center = Point3::new(2, 2, 2);
        assert_eq!(chunk.remove_block(center), Some(BlockType::Stone));

        for side in BlockSide::all() {
            assert!(chunk.cell(side.neighbor_of(center)).visible);
        }
        assert!(!chunk.cell(center).visible);
        // Shell of a 5^3 cube plus the six newly exposed interior cells
        assert_eq!(chunk.visible_count(), 125 - 27 + 6);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn checkerboard_shows_every_solid_cell() {
        let chunk = Chunk::checkerboard(Point2::new(0, 0), small(), palette());
        assert_eq!(chunk.visible_count(), 32);
        assert_visibility_consistent(&chunk);
    }

    #[test]
    fn removing_twice_fails_the_second_time_without_changes() {
        let mut chunk = Chunk::solid(Point2::new(0, 0), small(), palette());
        let pos = Point3::new(1, 3, 1);
        assert_eq!(chunk.remove_block(pos), Some(BlockType::Stone));

        let visible_before = chunk.visible_indices().to_vec();
        assert_eq!(chunk.remove_block(pos), None);
        assert_eq!(chunk.visible_indices(), visible_before.as_slice());
        assert_eq!(chunk.block_type_at(pos), BlockType::Air);
    }

    #[test]
    fn placing_on_occupied_cell_fails() {
        let mut chunk = Chunk::solid(Point2::new(0, 0), small(), palette());
        assert!(!chunk.place_block(Point3::new(0, 0, 0), BlockType::Grass));
        assert_eq!(chunk.block_type_at(Point3::new(0, 0, 0)), BlockType::Stone);
    }

    #[test]
    fn place_then_remove_restores_visibility() {
        let mut chunk = Chunk::generate(
            Point2::new(0, 0),
            small(),
            palette(),
            &ConstantHeightSource(0.5),
            HEIGHT_SCALE_FACTOR,
        )
        .unwrap();
        let pos = Point3::new(1, 2, 1);
        let neighborhood: Vec<_> = std::iter::once(pos)
            .chain(BlockSide::all().map(|side| side.neighbor_of(pos)))
            .filter(|p| small().contains(*p))
            .collect();
        let before: Vec<_> = neighborhood.iter().map(|p| chunk.cell(*p)).collect();
        let visible_before = chunk.visible_indices().to_vec();

        assert!(chunk.place_block(pos, BlockType::GrassVariant));
        assert!(chunk.cell(pos).visible);
        assert_visibility_consistent(&chunk);

        assert_eq!(chunk.remove_block(pos), Some(BlockType::GrassVariant));
        let after: Vec<_> = neighborhood.iter().map(|p| chunk.cell(*p)).collect();
        assert_eq!(before, after);
        assert_eq!(chunk.visible_indices(), visible_before.as_slice());
    }

    #[test]
    fn incremental_updates_match_full_scan() {
        let dims = ChunkDimensions::new(6, 5, 4);
        let mut chunk = Chunk::checkerboard(Point2::new(0, 0), dims, palette());
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..300 {
            let pos = dims.position_of(rng.usize(0..dims.volume()));
            if rng.bool() {
                chunk.remove_block(pos);
            } else {
                chunk.place_block(pos, BlockType::Stone);
            }
            let incremental = chunk.visible_indices().to_vec();
            chunk.update_visibility();
            assert_eq!(chunk.visible_indices(), incremental.as_slice());
        }
        assert_visibility_consistent(&chunk);
    }

    #[test]
    #[should_panic]
    fn removing_outside_chunk_panics() {
        let mut chunk = Chunk::empty(Point2::new(0, 0), small(), palette());
        chunk.remove_block(Point3::new(0, 4, 0));
    }

    #[test]
    fn draw_submits_visible_blocks_at_world_positions() {
        let mut chunk = Chunk::empty(Point2::new(1, -1), small(), palette());
        assert!(chunk.place_block(Point3::new(1, 2, 3), BlockType::Grass));

        let mut collector = InstanceCollector::new();
        chunk.draw(&mut collector).unwrap();

        assert_eq!(collector.len(), 1);
        assert_eq!(collector.instances()[0].translation, [5.0, 2.0, -1.0]);
        assert_eq!(collector.instances()[0].texture_indices, [2, 2, 1, 3, 2, 2]);
    }

    #[test]
    fn draw_fails_for_unregistered_block_type() {
        let mut chunk = Chunk::empty(Point2::new(0, 0), small(), Arc::new(BlockPalette::empty()));
        chunk.place_block(Point3::new(0, 0, 0), BlockType::Stone);
        let mut collector = InstanceCollector::new();
        assert!(chunk.draw(&mut collector).is_err());
    }

    #[test]
    fn bounds_follow_chunk_position() {
        let chunk = Chunk::empty(Point2::new(-2, 3), small(), palette());
        assert_eq!(chunk.bounds().min(), Point3::new(-8.0, 0.0, 12.0));
        assert_eq!(chunk.bounds().max(), Point3::new(-4.0, 4.0, 16.0));
    }
}
