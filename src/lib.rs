#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Pipeline
//!
//! The chunk pipeline of a voxel engine: packed 16x128x16 chunk columns, a terrain worker
//! that fills them from simplex noise, and a mesh worker that turns each 16-layer stack into
//! face-culled triangle geometry.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives used across threads
//! * `engine_state` - The pipeline itself: voxels, workers, meshing and geometry binding
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(error) = voxel_pipeline::run(None) {
//!         eprintln!("{error}");
//!     }
//! }
//! ```
//!
//! ## Threads
//!
//! The main thread owns the registry, the chunk store and the bound geometry. The terrain and
//! mesh workers are long-lived threads fed through FIFO queues; the mesh worker reads chunks
//! only through snapshots and holds its own read-only copy of the registry.

use std::{thread, time::Duration};

use cgmath::Point2;
use log::info;
use web_time::Instant;

use engine_state::{
    config::PipelineConfig,
    error::EngineError,
    rendering::geometry_store::HeadlessBackend,
    voxels::{
        block::{id_cache::BlockIdCache, BlockRegistry},
        chunk::STACK_COUNT,
        tasks::chunk_generation_task::{register_terrain_blocks, terrain_atlas},
    },
    ChunkPipeline,
};

pub mod core;
pub mod engine_state;

/// How long the demo loop sleeps between polls of the pipeline.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Generates and meshes every chunk within the configured view radius, then shuts down.
///
/// Initialises `env_logger` (stdout, filter from `RUST_LOG`), reads the config at
/// `config_path` if given, builds the block registry from the persisted ID cache and runs
/// the pipeline until every requested stack has a bound mesh.
pub fn run(config_path: Option<&str>) -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let started = Instant::now();
    let config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let atlas = terrain_atlas();
    let mut registry = BlockRegistry::new(BlockIdCache::load(&config.block_cache_path)?);
    register_terrain_blocks(&mut registry, &atlas, &config.terrain)?;
    registry.lock()?;

    let mut pipeline = ChunkPipeline::start(&registry, &config, HeadlessBackend::new())?;
    let requested = pipeline.request_chunks_around(Point2::new(0, 0), config.view_radius)?;
    info!("Requested {requested} chunks");

    let mut frames = 0u64;
    while !pipeline.is_idle() {
        pipeline.process_updates()?;
        frames += 1;
        thread::sleep(FRAME_INTERVAL);
    }

    let analytics = pipeline.geometry().backend().analytics();
    info!(
        "Meshed {} chunks into {} of {} stacks over {frames} frames in {:?}",
        pipeline.store().len(),
        pipeline.geometry().len(),
        pipeline.store().len() * STACK_COUNT as usize,
        started.elapsed()
    );
    info!(
        "Geometry uses {} bytes after {} uploads and {} releases",
        analytics.used_memory, analytics.times_created, analytics.times_destroyed
    );

    pipeline.stop()
}
