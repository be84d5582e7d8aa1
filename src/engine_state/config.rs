//! # Configuration
//!
//! Runtime settings for the pipeline, read from an optional JSON file. Every field has a
//! default, so a file only needs the values it changes:
//!
//! ```json
//! { "seed": 42, "view_radius": 3, "terrain": { "base_height": 50 } }
//! ```

use std::{fs, path::Path, time::Duration};

use log::info;
use serde::Deserialize;

use crate::engine_state::error::ConfigError;

/// Top level pipeline settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seed for the terrain noise.
    pub seed: u32,
    /// How long an idle worker sleeps before re-checking its queue and run flag.
    pub worker_poll_interval_ms: u64,
    /// Where the block name to ID mapping is persisted.
    pub block_cache_path: String,
    /// Chunk radius around the origin that the demo loop requests.
    pub view_radius: i32,
    /// Terrain shape.
    pub terrain: TerrainConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            seed: 0,
            worker_poll_interval_ms: 200,
            block_cache_path: "cache/block_cache.json".to_string(),
            view_radius: 2,
            terrain: TerrainConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config: PipelineConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Worker poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.worker_poll_interval_ms)
    }
}

/// Height map and layer settings for terrain generation.
///
/// The surface height of a column is
/// `((noise(x * frequency, z * frequency) + noise_offset) * height_scale) as i32 + base_height`.
/// Below the surface the generator writes `stone_depth` layers of soil before stone starts,
/// the top `grass_depth` of which are grass.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Height added after scaling the noise.
    pub base_height: i32,
    /// Multiplier applied to the offset noise value.
    pub height_scale: f64,
    /// Added to the raw noise value before scaling.
    pub noise_offset: f64,
    /// Noise sampling frequency per world block.
    pub frequency: f64,
    /// Layers between the surface and the first stone layer.
    pub stone_depth: i32,
    /// Layers of grass at the top of the soil.
    pub grass_depth: i32,
    /// Registry name of the stone block.
    pub stone_block: String,
    /// Registry name of the dirt block.
    pub dirt_block: String,
    /// Registry name of the grass block.
    pub grass_block: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            base_height: 40,
            height_scale: 20.0,
            noise_offset: 0.5,
            frequency: 0.01,
            stone_depth: 6,
            grass_depth: 1,
            stone_block: "crafter:stone".to_string(),
            dirt_block: "crafter:dirt".to_string(),
            grass_block: "crafter:grass".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "seed": 42, "terrain": { "base_height": 50 } }"#).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.terrain.base_height, 50);
        assert_eq!(config.terrain.stone_depth, 6);
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.block_cache_path, "cache/block_cache.json");
    }

    #[test]
    fn missing_files_are_config_errors() {
        let path = std::env::temp_dir().join(format!("voxel-pipeline-missing-{}.json", fastrand::u64(..)));
        assert!(matches!(PipelineConfig::load(path), Err(ConfigError::Io(_))));
    }
}
