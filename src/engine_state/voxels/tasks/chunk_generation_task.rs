//! # Chunk Generation Task
//!
//! The terrain worker job. For each requested column it samples a 2D height map at every
//! (x, z) of the chunk and fills the column from the bottom up:
//!
//! ```text
//! y <  height - stone_depth    stone
//! y <  height - grass_depth    dirt
//! y <  height                  grass
//! otherwise                    air
//! ```
//!
//! Heights are a pure function of world (x, z) and the seed, so a column always generates
//! to the same bits.

use log::debug;
use noise::{NoiseFn, Simplex};

use crate::engine_state::{
    config::TerrainConfig,
    error::{ChunkError, EngineError, RegistryError},
    task_management::WorkerJob,
    voxels::{
        block::{
            atlas::{GridAtlas, TextureAtlas},
            BlockDefinition, BlockRegistry,
        },
        chunk::{BlockData, Chunk, ChunkPosition, CHUNK_ARRAY_SIZE, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
    },
};

/// Source of terrain surface heights.
pub trait HeightSampler: Send {
    /// Surface height of the world column at (`world_x`, `world_z`). Cells below it are solid.
    fn surface_height(&self, world_x: i32, world_z: i32) -> i32;
}

/// Simplex noise height map.
pub struct SimplexHeightMap {
    noise: Simplex,
    frequency: f64,
    noise_offset: f64,
    height_scale: f64,
    base_height: i32,
}

impl SimplexHeightMap {
    /// Builds the height map described by `config` for `seed`.
    pub fn new(seed: u32, config: &TerrainConfig) -> Self {
        SimplexHeightMap {
            noise: Simplex::new(seed),
            frequency: config.frequency,
            noise_offset: config.noise_offset,
            height_scale: config.height_scale,
            base_height: config.base_height,
        }
    }
}

impl HeightSampler for SimplexHeightMap {
    fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let sample = self.noise.get([
            world_x as f64 * self.frequency,
            world_z as f64 * self.frequency,
        ]);
        ((sample + self.noise_offset) * self.height_scale) as i32 + self.base_height
    }
}

/// The same height everywhere. Handy for flat worlds.
pub struct ConstantHeight(pub i32);

impl HeightSampler for ConstantHeight {
    fn surface_height(&self, _world_x: i32, _world_z: i32) -> i32 {
        self.0
    }
}

/// Fills chunks from a height map. Runs on the terrain worker thread.
pub struct TerrainGenerator {
    registry: BlockRegistry,
    sampler: Box<dyn HeightSampler>,
    stone: BlockData,
    dirt: BlockData,
    grass: BlockData,
    stone_depth: i32,
    grass_depth: i32,
}

impl TerrainGenerator {
    /// Takes a duplicate of `registry` and resolves the configured block names against it.
    ///
    /// # Errors
    /// [`RegistryError::NotLocked`] if `registry` still accepts registrations, and
    /// [`RegistryError::MissingName`] if any of the three blocks is not registered. Both are
    /// startup configuration errors, so they surface before the worker starts.
    pub fn new(
        registry: &BlockRegistry,
        config: &TerrainConfig,
        sampler: Box<dyn HeightSampler>,
    ) -> Result<Self, EngineError> {
        let registry = registry.thread_safe_duplicate()?;
        let resolve = |name: &str| -> Result<BlockData, EngineError> {
            let id = registry.get_id(name)?;
            Ok(BlockData::from_id(id)?)
        };

        let stone = resolve(&config.stone_block)?;
        let dirt = resolve(&config.dirt_block)?;
        let grass = resolve(&config.grass_block)?;
        Ok(TerrainGenerator {
            registry,
            sampler,
            stone,
            dirt,
            grass,
            stone_depth: config.stone_depth,
            grass_depth: config.grass_depth,
        })
    }

    /// Generates the full chunk for `position`.
    pub fn generate(&self, position: ChunkPosition) -> Result<Chunk, ChunkError> {
        let origin_x = position.x * CHUNK_WIDTH;
        let origin_z = position.y * CHUNK_DEPTH;

        let mut heights = Vec::with_capacity((CHUNK_WIDTH * CHUNK_DEPTH) as usize);
        for z in 0..CHUNK_DEPTH {
            for x in 0..CHUNK_WIDTH {
                heights.push(self.sampler.surface_height(origin_x + x, origin_z + z));
            }
        }

        let mut data = Vec::with_capacity(CHUNK_ARRAY_SIZE);
        for y in 0..CHUNK_HEIGHT {
            for &height in &heights {
                data.push(self.layer_at(y, height));
            }
        }
        Chunk::from_block_data(position, data)
    }

    fn layer_at(&self, y: i32, height: i32) -> BlockData {
        if y < height - self.stone_depth {
            self.stone
        } else if y < height - self.grass_depth {
            self.dirt
        } else if y < height {
            self.grass
        } else {
            BlockData::AIR
        }
    }
}

impl WorkerJob for TerrainGenerator {
    type Request = ChunkPosition;
    type Output = Chunk;
    const NAME: &'static str = "chunk generator";

    fn startup_message(&self) -> String {
        format!(
            "{} started with blocks {:?}",
            Self::NAME,
            self.registry.all_block_names()
        )
    }

    fn process(&mut self, position: ChunkPosition) -> Result<Chunk, EngineError> {
        let chunk = self.generate(position)?;
        debug!("Generated chunk ({}, {})", position.x, position.y);
        Ok(chunk)
    }
}

/// Registry names the generator needs, for callers assembling a registry by hand.
pub fn required_block_names(config: &TerrainConfig) -> [&str; 3] {
    [
        config.stone_block.as_str(),
        config.dirt_block.as_str(),
        config.grass_block.as_str(),
    ]
}

/// Texture files used by [`register_terrain_blocks`].
pub const TERRAIN_TEXTURES: [&str; 4] = ["stone.png", "dirt.png", "grass.png", "grass_side.png"];

/// Atlas holding [`TERRAIN_TEXTURES`].
pub fn terrain_atlas() -> GridAtlas {
    GridAtlas::new(16, TERRAIN_TEXTURES)
}

/// Registers the stone, dirt and grass blocks named in `config`.
///
/// Grass uses its side texture on the four walls, dirt underneath and grass on top.
pub fn register_terrain_blocks(
    registry: &mut BlockRegistry,
    atlas: &dyn TextureAtlas,
    config: &TerrainConfig,
) -> Result<(), RegistryError> {
    let stone = BlockDefinition::new(config.stone_block.as_str())
        .with_readable_name("Stone")
        .with_textures(["stone.png"; 6])?;
    let dirt = BlockDefinition::new(config.dirt_block.as_str())
        .with_readable_name("Dirt")
        .with_textures(["dirt.png"; 6])?;
    let grass = BlockDefinition::new(config.grass_block.as_str())
        .with_readable_name("Grass")
        .with_textures([
            "grass_side.png",
            "grass_side.png",
            "grass_side.png",
            "grass_side.png",
            "dirt.png",
            "grass.png",
        ])?;

    for definition in [stone, dirt, grass] {
        registry.register(definition, atlas)?;
    }
    Ok(())
}
