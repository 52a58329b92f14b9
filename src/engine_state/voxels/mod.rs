//! # Voxel World Core
//!
//! This module contains the voxel data model: how blocks are stored, how the
//! terrain is generated, how visibility is tracked and how chunks are streamed
//! around the observer.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces, the compact per-cell storage type and the
//!   appearance palette
//! * **Chunk**: fixed-size 3D grids of blocks with cached visibility, edits
//!   and ray picking
//! * **Terrain**: deterministic height sources feeding chunk generation
//! * **World**: the registry of loaded chunks, keyed by chunk coordinate
//!
//! ## Data Flow
//!
//! 1. The world is told where the observer is and loads/unloads chunks
//! 2. New chunks sample the height source once per column
//! 3. Edits go to the owning chunk, which patches its visible list in place
//! 4. Drawing walks the visible list of every chunk and submits instances
//!
//! ## Ownership
//!
//! The world owns its chunks outright. The palette is shared read-only by all
//! chunks through an `Arc`, and the height source is owned by the world.

pub mod block;
pub mod chunk;
pub mod terrain;
pub mod world;
