//! # Block Palette
//!
//! Maps solid block types to their appearance. The palette is built once at
//! start-up and then shared read-only by every chunk.

use std::collections::HashMap;

use anyhow::{bail, Result};

use super::{block_side::BlockSide, block_type::BlockType};

/// Renderable handle for a block type: one texture atlas index per face,
/// in [`BlockSide`] order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Appearance {
    /// Texture indices in the order [Front, Back, Bottom, Top, Left, Right]
    pub texture_indices: [u32; 6],
}

impl Appearance {
    /// An appearance using the same texture on every face.
    pub const fn uniform(texture_index: u32) -> Self {
        Self {
            texture_indices: [texture_index; 6],
        }
    }

    /// The texture index of a single face.
    pub fn texture_index(&self, side: BlockSide) -> u32 {
        self.texture_indices[side as usize]
    }
}

/// Registry of appearances for all solid block types.
#[derive(Clone, Debug)]
pub struct BlockPalette {
    appearances: HashMap<BlockType, Appearance>,
}

impl BlockPalette {
    /// Creates a palette without any registered block types.
    pub fn empty() -> Self {
        Self {
            appearances: HashMap::new(),
        }
    }

    /// Registers the appearance of `block_type`, replacing any earlier entry.
    ///
    /// # Errors
    /// Returns an error if `block_type` is `BlockType::Air`, which is never drawn.
    pub fn register(&mut self, block_type: BlockType, appearance: Appearance) -> Result<()> {
        if block_type.is_air() {
            bail!("Tried to register an appearance for air");
        }
        self.appearances.insert(block_type, appearance);
        Ok(())
    }

    /// Looks up the appearance of a solid block type.
    ///
    /// # Errors
    /// Returns an error if no appearance is registered for `block_type`.
    pub fn lookup(&self, block_type: BlockType) -> Result<&Appearance> {
        match self.appearances.get(&block_type) {
            Some(appearance) => Ok(appearance),
            None => bail!("No appearance registered for block type {:?}", block_type),
        }
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.appearances.len()
    }

    /// Whether no block type has been registered.
    pub fn is_empty(&self) -> bool {
        self.appearances.is_empty()
    }
}

impl Default for BlockPalette {
    /// The stock palette: stone, grass (grass on top, dirt at the bottom, grass
    /// edge on the sides) and the debug grass.
    fn default() -> Self {
        let mut appearances = HashMap::new();
        appearances.insert(BlockType::Stone, Appearance::uniform(0));
        appearances.insert(
            BlockType::Grass,
            Appearance {
                texture_indices: [2, 2, 1, 3, 2, 2],
            },
        );
        appearances.insert(BlockType::GrassVariant, Appearance::uniform(4));
        Self { appearances }
    }
}
