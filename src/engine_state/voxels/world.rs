//! # World Module
//!
//! This module provides the `World` struct which owns every loaded chunk and
//! streams chunks in and out around a moving observer.
//!
//! ## Streaming
//!
//! Each call to [`World::update`] reconciles the set of loaded chunks with the
//! square of chunk coordinates within `render_distance` (Chebyshev distance)
//! of the observer's chunk:
//! - missing coordinates are generated and inserted
//! - coordinates that left the square are dropped
//! - coordinates in both sets are left untouched, so edits survive
//!
//! A chunk that fails to generate is not inserted and is simply retried on the
//! next update, since it is still in range.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use cgmath::{Point2, Point3};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::palette::BlockPalette;
use super::chunk::{Chunk, ChunkDimensions, HEIGHT_SCALE_FACTOR};
use super::terrain::HeightSource;
use crate::engine_state::geometry::Ray;
use crate::engine_state::rendering::RenderSubmitter;

/// Largest supported render distance, in chunks on each side of the observer.
pub const MAX_RENDER_DISTANCE: u32 = 32;

/// World configuration parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Extent of every chunk
    pub chunk_dimensions: ChunkDimensions,
    /// Number of chunks kept loaded on each side of the observer's chunk, at
    /// most [`MAX_RENDER_DISTANCE`]
    pub render_distance: u32,
    /// Scale applied to world coordinates before sampling terrain heights
    pub height_scale: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_dimensions: ChunkDimensions::default(),
            render_distance: 3,
            height_scale: HEIGHT_SCALE_FACTOR,
        }
    }
}

/// What a call to [`World::update`] changed.
#[derive(Debug)]
pub struct StreamingReport {
    /// Chunk coordinate of the observer
    pub observer_chunk: Point2<i32>,
    /// Newly generated chunks
    pub loaded: Vec<Point2<i32>>,
    /// Chunks dropped because they left the render distance
    pub unloaded: Vec<Point2<i32>>,
    /// Chunks that should be loaded but failed to generate
    pub failed: Vec<(Point2<i32>, anyhow::Error)>,
}

impl StreamingReport {
    /// Whether the set of loaded chunks changed.
    pub fn has_changes(&self) -> bool {
        !self.loaded.is_empty() || !self.unloaded.is_empty()
    }
}

/// The closest visible block across all loaded chunks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldHit {
    /// Coordinate of the chunk holding the struck block
    pub chunk: Point2<i32>,
    /// World block position of the struck block
    pub block: Point3<i32>,
    /// World block position of the cell the ray came from
    pub neighbor: Point3<i32>,
    /// The face that was struck
    pub side: BlockSide,
    /// Parametric hit time along the ray
    pub time: f32,
}

/// Whether `coordinate` is within Chebyshev distance `radius` of `center`.
fn in_square(center: Point2<i32>, coordinate: Point2<i32>, radius: i32) -> bool {
    (coordinate.x - center.x).abs() <= radius && (coordinate.y - center.y).abs() <= radius
}

/// Registry of loaded chunks, keyed by chunk coordinate.
///
/// The world is the sole owner of its chunks. Chunks are boxed so that a chunk
/// keeps its address for as long as it stays loaded.
pub struct World {
    chunks: HashMap<Point2<i32>, Box<Chunk>>,
    config: WorldConfig,
    palette: Arc<BlockPalette>,
    height_source: Box<dyn HeightSource>,
}

impl World {
    /// Creates a world without any loaded chunks.
    pub fn new(
        config: WorldConfig,
        palette: Arc<BlockPalette>,
        height_source: Box<dyn HeightSource>,
    ) -> Self {
        if config.render_distance > MAX_RENDER_DISTANCE {
            log::warn!(
                "Render distance {} exceeds {}, clamping",
                config.render_distance,
                MAX_RENDER_DISTANCE
            );
        }
        World {
            chunks: HashMap::new(),
            config,
            palette,
            height_source,
        }
    }

    /// The world configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Extent of every chunk.
    pub fn chunk_dimensions(&self) -> ChunkDimensions {
        self.config.chunk_dimensions
    }

    /// The chunk coordinate containing a world-space position.
    pub fn chunk_coordinate(&self, position: Point3<f32>) -> Point2<i32> {
        let dims = self.config.chunk_dimensions;
        Point2::new(
            (position.x / dims.width as f32).floor() as i32,
            (position.z / dims.depth as f32).floor() as i32,
        )
    }

    /// Splits a world block position into its chunk coordinate and the local
    /// position within that chunk.
    pub fn locate_block(&self, block: Point3<i32>) -> (Point2<i32>, Point3<i32>) {
        let width = self.config.chunk_dimensions.width as i32;
        let depth = self.config.chunk_dimensions.depth as i32;
        (
            Point2::new(block.x.div_euclid(width), block.z.div_euclid(depth)),
            Point3::new(block.x.rem_euclid(width), block.y, block.z.rem_euclid(depth)),
        )
    }

    /// The world block position of a local position in chunk `chunk`.
    pub fn world_block(&self, chunk: Point2<i32>, local: Point3<i32>) -> Point3<i32> {
        let width = self.config.chunk_dimensions.width as i32;
        let depth = self.config.chunk_dimensions.depth as i32;
        Point3::new(chunk.x * width + local.x, local.y, chunk.y * depth + local.z)
    }

    /// The effective render distance, clamped to [`MAX_RENDER_DISTANCE`].
    pub fn render_distance(&self) -> i32 {
        // Lossless: the clamped value fits an i32
        self.config.render_distance.min(MAX_RENDER_DISTANCE) as i32
    }

    /// Whether `coordinate` lies within the render distance of `center`.
    pub fn is_in_range(&self, center: Point2<i32>, coordinate: Point2<i32>) -> bool {
        in_square(center, coordinate, self.render_distance())
    }

    /// All coordinates within the render distance of `center`, x-major.
    pub fn desired_coordinates(&self, center: Point2<i32>) -> Vec<Point2<i32>> {
        let radius = self.render_distance();
        let side = (2 * radius + 1) as usize;
        let mut coordinates = Vec::with_capacity(side * side);
        for x in -radius..=radius {
            for z in -radius..=radius {
                coordinates.push(Point2::new(center.x + x, center.y + z));
            }
        }
        coordinates
    }

    /// Streams chunks around the observer at `observer`.
    ///
    /// After the call the loaded chunks are exactly the in-range coordinates,
    /// minus any that failed to generate.
    pub fn update(&mut self, observer: Point3<f32>) -> StreamingReport {
        let start = Instant::now();
        let observer_chunk = self.chunk_coordinate(observer);
        let mut report = StreamingReport {
            observer_chunk,
            loaded: Vec::new(),
            unloaded: Vec::new(),
            failed: Vec::new(),
        };

        for coordinate in self.desired_coordinates(observer_chunk) {
            if self.chunks.contains_key(&coordinate) {
                continue;
            }
            match Chunk::generate(
                coordinate,
                self.config.chunk_dimensions,
                self.palette.clone(),
                self.height_source.as_ref(),
                self.config.height_scale,
            ) {
                Ok(chunk) => {
                    log::debug!(
                        "Loaded chunk {:?} with {} visible blocks",
                        coordinate,
                        chunk.visible_count()
                    );
                    self.chunks.insert(coordinate, Box::new(chunk));
                    report.loaded.push(coordinate);
                }
                Err(error) => {
                    log::warn!("Failed to load chunk {:?}: {:#}", coordinate, error);
                    report.failed.push((coordinate, error));
                }
            }
        }

        let radius = self.render_distance();
        let unloaded = &mut report.unloaded;
        self.chunks.retain(|coordinate, _| {
            let keep = in_square(observer_chunk, *coordinate, radius);
            if !keep {
                unloaded.push(*coordinate);
            }
            keep
        });
        report.unloaded.sort_by_key(|coordinate| (coordinate.x, coordinate.y));

        if report.has_changes() {
            log::info!(
                "Streamed around chunk {:?}: {} loaded, {} unloaded, {} resident ({:?})",
                observer_chunk,
                report.loaded.len(),
                report.unloaded.len(),
                self.chunks.len(),
                start.elapsed()
            );
        }

        report
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Whether the chunk at `coordinate` is loaded.
    pub fn contains(&self, coordinate: Point2<i32>) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    /// The loaded chunk at `coordinate`.
    pub fn get_chunk_at(&self, coordinate: Point2<i32>) -> Option<&Chunk> {
        self.chunks.get(&coordinate).map(|chunk| chunk.as_ref())
    }

    /// Mutable access to the loaded chunk at `coordinate`.
    pub fn get_chunk_at_mut(&mut self, coordinate: Point2<i32>) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coordinate).map(|chunk| chunk.as_mut())
    }

    /// Coordinates of all loaded chunks, sorted by x, then z.
    pub fn coordinates(&self) -> Vec<Point2<i32>> {
        let mut coordinates: Vec<_> = self.chunks.keys().copied().collect();
        coordinates.sort_by_key(|coordinate| (coordinate.x, coordinate.y));
        coordinates
    }

    /// Iterates the loaded chunks in sorted coordinate order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.coordinates()
            .into_iter()
            .filter_map(move |coordinate| self.get_chunk_at(coordinate))
    }

    /// Finds the closest visible block along `ray` across all loaded chunks.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<WorldHit> {
        let mut closest: Option<WorldHit> = None;
        for chunk in self.chunks() {
            let t_limit = closest.map_or(t_max, |best| best.time);
            if let Some(hit) = chunk.hit(ray, t_min, t_limit) {
                if closest.map_or(true, |best| hit.time < best.time) {
                    closest = Some(WorldHit {
                        chunk: chunk.position(),
                        block: self.world_block(chunk.position(), hit.block),
                        neighbor: self.world_block(chunk.position(), hit.neighbor),
                        side: hit.side,
                        time: hit.time,
                    });
                }
            }
        }
        closest
    }

    /// Removes the block at a world block position.
    ///
    /// Returns the removed type, or `None` if the cell is empty, outside the
    /// vertical range of the world or in a chunk that is not loaded.
    pub fn remove_block(&mut self, block: Point3<i32>) -> Option<BlockType> {
        let (coordinate, local) = self.locate_block(block);
        if !self.config.chunk_dimensions.contains(local) {
            return None;
        }
        self.get_chunk_at_mut(coordinate)?.remove_block(local)
    }

    /// Places a block at a world block position.
    ///
    /// Returns `false` if the cell is occupied, outside the vertical range of
    /// the world or in a chunk that is not loaded.
    pub fn place_block(&mut self, block: Point3<i32>, block_type: BlockType) -> bool {
        let (coordinate, local) = self.locate_block(block);
        if !self.config.chunk_dimensions.contains(local) {
            return false;
        }
        match self.get_chunk_at_mut(coordinate) {
            Some(chunk) => chunk.place_block(local, block_type),
            None => false,
        }
    }

    /// Submits the visible blocks of every loaded chunk.
    ///
    /// # Errors
    /// Returns an error if a visible block has no registered appearance.
    pub fn draw(&self, submitter: &mut impl RenderSubmitter) -> Result<()> {
        for chunk in self.chunks() {
            chunk.draw(submitter)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::bail;
    use cgmath::Vector3;

    use super::*;
    use crate::engine_state::rendering::InstanceCollector;
    use crate::engine_state::voxels::terrain::ConstantHeightSource;

    struct FlakyHeightSource {
        failing: Arc<AtomicBool>,
    }

    impl HeightSource for FlakyHeightSource {
        fn sample(&self, x: f64, _z: f64) -> Result<f64> {
            if x < 0.0 && self.failing.load(Ordering::SeqCst) {
                bail!("Noise backend unavailable");
            }
            Ok(0.5)
        }
    }

    fn config(render_distance: u32) -> WorldConfig {
        WorldConfig {
            chunk_dimensions: ChunkDimensions::new(4, 4, 4),
            render_distance,
            height_scale: 1.0,
        }
    }

    fn flat_world(render_distance: u32) -> World {
        World::new(
            config(render_distance),
            Arc::new(BlockPalette::default()),
            Box::new(ConstantHeightSource(0.5)),
        )
    }

    #[test]
    fn chunk_coordinate_floors_negative_positions() {
        let world = flat_world(1);
        assert_eq!(world.chunk_coordinate(Point3::new(0.0, 9.0, 3.9)), Point2::new(0, 0));
        assert_eq!(world.chunk_coordinate(Point3::new(-0.1, 0.0, 4.0)), Point2::new(-1, 1));
        assert_eq!(world.chunk_coordinate(Point3::new(-4.0, 0.0, -4.1)), Point2::new(-1, -2));
    }

    #[test]
    fn locate_block_round_trips_negative_positions() {
        let world = flat_world(1);
        let block = Point3::new(-1, 2, -5);
        let (chunk, local) = world.locate_block(block);
        assert_eq!(chunk, Point2::new(-1, -2));
        assert_eq!(local, Point3::new(3, 2, 3));
        assert_eq!(world.world_block(chunk, local), block);
    }

    #[test]
    fn first_update_loads_full_square() {
        let mut world = flat_world(2);
        let report = world.update(Point3::new(1.0, 3.0, 1.0));
        assert_eq!(report.loaded.len(), 25);
        assert!(report.unloaded.is_empty());
        assert!(report.failed.is_empty());
        assert_eq!(world.len(), 25);
        for coordinate in world.coordinates() {
            assert!(world.is_in_range(Point2::new(0, 0), coordinate));
        }
    }

    #[test]
    fn oversized_render_distance_is_clamped() {
        let mut world = flat_world(u32::MAX);
        assert_eq!(world.render_distance(), MAX_RENDER_DISTANCE as i32);

        world.update(Point3::new(1.0, 3.0, 1.0));
        let side = 2 * MAX_RENDER_DISTANCE as usize + 1;
        assert_eq!(world.len(), side * side);
        assert!(world.contains(Point2::new(0, 0)));
        assert!(world.contains(Point2::new(32, -32)));
        assert!(!world.contains(Point2::new(33, 0)));
    }

    #[test]
    fn range_check_matches_retained_chunks() {
        let mut world = flat_world(1);
        world.update(Point3::new(1.0, 3.0, 1.0));
        world.update(Point3::new(5.0, 3.0, 1.0));
        let center = Point2::new(1, 0);
        for coordinate in world.coordinates() {
            assert!(world.is_in_range(center, coordinate));
        }
        assert!(!world.is_in_range(center, Point2::new(-1, 0)));
        assert!(!world.contains(Point2::new(-1, 0)));
        assert!(in_square(center, Point2::new(2, -1), 1));
        assert!(!in_square(center, Point2::new(3, 0), 1));
    }

    #[test]
    fn update_without_moving_chunks_changes_nothing() {
        let mut world = flat_world(1);
        world.update(Point3::new(1.0, 3.0, 1.0));
        let report = world.update(Point3::new(3.5, 0.0, 2.0));
        assert!(!report.has_changes());
        assert_eq!(world.len(), 9);
    }

    #[test]
    fn failed_chunks_are_skipped_and_retried() {
        let failing = Arc::new(AtomicBool::new(true));
        let mut world = World::new(
            config(1),
            Arc::new(BlockPalette::default()),
            Box::new(FlakyHeightSource {
                failing: failing.clone(),
            }),
        );

        let report = world.update(Point3::new(0.5, 0.0, 0.5));
        assert_eq!(report.failed.len(), 3);
        assert_eq!(report.loaded.len(), 6);
        assert_eq!(world.len(), 6);
        for (coordinate, _) in &report.failed {
            assert_eq!(coordinate.x, -1);
            assert!(!world.contains(*coordinate));
        }

        failing.store(false, Ordering::SeqCst);
        let report = world.update(Point3::new(0.5, 0.0, 0.5));
        assert_eq!(report.loaded.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(world.len(), 9);
    }

    #[test]
    fn hit_finds_closest_block_across_chunks() {
        let mut world = flat_world(1);
        world.update(Point3::new(0.5, 0.0, 0.5));

        // Terrain surface is at y = 1; aim down at world block (-3, 1, 6)
        let ray = Ray::new(Point3::new(-2.5, 10.0, 6.5), Vector3::new(0.0, -1.0, 0.0));
        let hit = world.hit(&ray, 0.0, 100.0).unwrap();
        assert_eq!(hit.chunk, Point2::new(-1, 1));
        assert_eq!(hit.block, Point3::new(-3, 1, 6));
        assert_eq!(hit.neighbor, Point3::new(-3, 2, 6));
        assert_eq!(hit.side, BlockSide::TOP);
    }

    #[test]
    fn horizontal_hit_prefers_nearer_chunk() {
        let mut world = flat_world(1);
        world.update(Point3::new(0.5, 0.0, 0.5));

        // Skimming through the grass layer towards +x from outside the loaded square
        let ray = Ray::new(Point3::new(-10.0, 1.5, 0.5), Vector3::new(1.0, 0.0, 0.0));
        let hit = world.hit(&ray, 0.0, 100.0).unwrap();
        assert_eq!(hit.block, Point3::new(-4, 1, 0));
        assert_eq!(hit.neighbor, Point3::new(-5, 1, 0));
    }

    #[test]
    fn world_edits_route_to_owning_chunk() {
        let mut world = flat_world(1);
        world.update(Point3::new(0.5, 0.0, 0.5));

        assert!(world.place_block(Point3::new(-1, 2, 0), BlockType::GrassVariant));
        let chunk = world.get_chunk_at(Point2::new(-1, 0)).unwrap();
        assert_eq!(chunk.block_type_at(Point3::new(3, 2, 0)), BlockType::GrassVariant);

        assert_eq!(world.remove_block(Point3::new(-1, 2, 0)), Some(BlockType::GrassVariant));
        assert_eq!(world.remove_block(Point3::new(-1, 2, 0)), None);
    }

    #[test]
    fn world_edits_outside_loaded_range_are_rejected() {
        let mut world = flat_world(1);
        world.update(Point3::new(0.5, 0.0, 0.5));

        assert!(!world.place_block(Point3::new(0, 4, 0), BlockType::Stone));
        assert!(!world.place_block(Point3::new(0, -1, 0), BlockType::Stone));
        assert!(!world.place_block(Point3::new(100, 2, 0), BlockType::Stone));
        assert_eq!(world.remove_block(Point3::new(100, 0, 0)), None);
    }

    #[test]
    fn draw_submits_all_visible_blocks() {
        let mut world = flat_world(1);
        world.update(Point3::new(0.5, 0.0, 0.5));

        let expected: usize = world.chunks().map(|chunk| chunk.visible_count()).sum();
        let mut collector = InstanceCollector::new();
        world.draw(&mut collector).unwrap();
        assert_eq!(collector.len(), expected);
        // Every column shows its grass and, through the open bottom, its stone
        assert_eq!(expected, 9 * 16 * 2);
    }
}
