//! # Configuration
//!
//! Engine configuration is a single JSON document. Every field is optional;
//! missing fields take their default value. The file is located through the
//! [`CONFIG_PATH_ENV`] environment variable, and without it the defaults are
//! used as is.
//!
//! ```json
//! {
//!     "world": { "render_distance": 2, "chunk_dimensions": { "width": 16, "height": 32, "depth": 16 } },
//!     "reach": 6.0,
//!     "place_block_type": "grass_variant",
//!     "seed": 42
//! }
//! ```

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine_state::{
    camera_state::CameraConfig,
    voxels::block::block_type::BlockType,
    voxels::world::{WorldConfig, MAX_RENDER_DISTANCE},
};

/// Environment variable holding the path of the JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "VOXEL_WORLD_CONFIG";

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunk layout and streaming
    pub world: WorldConfig,
    /// Initial camera placement and controls
    pub camera: CameraConfig,
    /// Maximum targeting distance along the view ray
    pub reach: f32,
    /// Block type placed by the place action
    pub place_block_type: BlockType,
    /// Terrain seed; picked at random when absent
    pub seed: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            camera: CameraConfig::default(),
            reach: 8.0,
            place_block_type: BlockType::Grass,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Loads the configuration from the file named by [`CONFIG_PATH_ENV`], or
    /// returns the defaults if the variable is not set.
    ///
    /// # Errors
    /// Returns an error if the file can not be read, parsed or validated.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                log::info!("{} not set, using default configuration", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    /// Returns an error if the file can not be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = Self::from_json_str(&json)
            .with_context(|| format!("Invalid configuration file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would make the engine misbehave.
    ///
    /// # Errors
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let dims = self.world.chunk_dimensions;
        if dims.width == 0 || dims.height == 0 || dims.depth == 0 {
            bail!("Chunk dimensions must be non-zero, got {:?}", dims);
        }
        if self.world.render_distance > MAX_RENDER_DISTANCE {
            bail!(
                "Render distance must be at most {}, got {}",
                MAX_RENDER_DISTANCE,
                self.world.render_distance
            );
        }
        if !(self.world.height_scale.is_finite() && self.world.height_scale > 0.0) {
            bail!("Height scale must be positive, got {}", self.world.height_scale);
        }
        if !(self.reach.is_finite() && self.reach >= 0.0) {
            bail!("Reach must be non-negative, got {}", self.reach);
        }
        if self.place_block_type.is_air() {
            bail!("The placement block type must be solid");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.world.chunk_dimensions, ChunkDimensions::new(16, 16, 16));
        assert_eq!(config.world.render_distance, 3);
        assert_eq!(config.place_block_type, BlockType::Grass);
        assert!(config.seed.is_none());
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let config = EngineConfig::from_json_str(
            r#"{ "world": { "render_distance": 1 }, "place_block_type": "grass_variant", "seed": 9 }"#,
        )
        .unwrap();
        assert_eq!(config.world.render_distance, 1);
        assert_eq!(config.world.chunk_dimensions, ChunkDimensions::default());
        assert_eq!(config.place_block_type, BlockType::GrassVariant);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(EngineConfig::from_json_str(r#"{ "place_block_type": "air" }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "reach": -1.0 }"#).is_err());
        assert!(EngineConfig::from_json_str(
            r#"{ "world": { "chunk_dimensions": { "width": 0, "height": 4, "depth": 4 } } }"#
        )
        .is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn oversized_render_distance_is_rejected() {
        assert!(EngineConfig::from_json_str(r#"{ "world": { "render_distance": 50000 } }"#).is_err());
        let json = format!(r#"{{ "world": {{ "render_distance": {} }} }}"#, u32::MAX);
        assert!(EngineConfig::from_json_str(&json).is_err());

        let json = format!(r#"{{ "world": {{ "render_distance": {} }} }}"#, MAX_RENDER_DISTANCE);
        let config = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(config.world.render_distance, MAX_RENDER_DISTANCE);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(EngineConfig::from_file(Path::new("/nonexistent/voxel-world.json")).is_err());
    }
}
