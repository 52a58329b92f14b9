//! # Voxel World Entry Point
//!
//! Runs the scripted demo of the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() -> anyhow::Result<()> {
    voxel_world::run()
}
