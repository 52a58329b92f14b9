//! Render submission for the voxel engine.
//!
//! The engine never talks to the GPU itself. Each frame it hands one
//! [`BlockInstance`] per visible block to a [`RenderSubmitter`], which owns all
//! GPU-level state: buffers, pipelines and uniform binding.

mod instance;

pub use instance::BlockInstance;

/// Receives the visible blocks of a frame.
pub trait RenderSubmitter {
    /// Queues one unit cube for drawing.
    fn submit(&mut self, instance: BlockInstance);
}

/// A submitter that simply records every instance, in submission order.
///
/// The recorded slice can be uploaded as an instance buffer with
/// `bytemuck::cast_slice`.
#[derive(Debug, Default)]
pub struct InstanceCollector {
    instances: Vec<BlockInstance>,
}

impl InstanceCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instances submitted since the last [`clear`](Self::clear).
    pub fn instances(&self) -> &[BlockInstance] {
        &self.instances
    }

    /// The recorded instances as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Number of recorded instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Forgets all recorded instances, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl RenderSubmitter for InstanceCollector {
    fn submit(&mut self, instance: BlockInstance) {
        self.instances.push(instance);
    }
}
