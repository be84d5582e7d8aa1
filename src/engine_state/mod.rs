//! # Engine State Module
//!
//! The chunk pipeline and the subsystems it coordinates.
//!
//! ## Key Components
//!
//! * [`ChunkPipeline`] - Main-thread director of the two workers
//! * `config` - Runtime settings
//! * `error` - Error types for every subsystem
//! * `rendering` - Meshing, the mesh worker job and geometry binding
//! * `task_management` - Long-lived background workers
//! * `voxels` - Blocks, chunks, the chunk store and terrain generation
//!
//! ## Architecture
//!
//! Three threads take part: the main thread, the terrain worker and the mesh worker. Only the
//! main thread writes to the [`ChunkStore`]; the mesh worker reads it through snapshots. All
//! other data crosses threads by value through the worker queues.
//!
//! ```text
//! request_chunk --> terrain worker --> process_updates: store chunk,
//!                                         request 8 stacks (+ neighbours)
//!                                              |
//!                   mesh worker <--------------+
//!                        |
//!                        +--> process_updates: bind mesh to its stack
//! ```
//!
//! Every worker or data error is fatal. Before [`ChunkPipeline::process_updates`] or any
//! request method returns such an error, both workers are stopped and joined. A block ID the
//! registry does not know is refused by [`ChunkPipeline::set_block`] and leaves the pipeline
//! running.

use std::collections::HashSet;

use cgmath::{Point2, Point3};
use log::{debug, error, info, warn};

use config::PipelineConfig;
use error::EngineError;
use rendering::{
    geometry_store::{GeometryStore, RenderBackend},
    meshing::mesher::NeighborChunks,
    tasks::chunk_mesh_generation_task::{MeshGenerator, MeshOutcome, MeshRequest},
};
use task_management::Worker;
use voxels::{
    block::BlockRegistry,
    chunk::{
        world_to_chunk_position, world_to_local, BlockData, ChunkPosition, CHUNK_DEPTH,
        CHUNK_WIDTH, STACK_COUNT, STACK_HEIGHT,
    },
    tasks::chunk_generation_task::{HeightSampler, SimplexHeightMap, TerrainGenerator},
    world::ChunkStore,
};

pub mod config;
pub mod error;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What one call to [`ChunkPipeline::process_updates`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineUpdate {
    /// Chunks moved from the terrain queue into the store.
    pub chunks_stored: usize,
    /// Mesh records bound to their stack.
    pub meshes_bound: usize,
    /// Mesh records discarded because their chunk was no longer stored.
    pub meshes_dropped: usize,
}

/// Owns the chunk store, both workers and the geometry store.
///
/// # Examples
///
/// ```no_run
/// use cgmath::Point2;
/// use voxel_pipeline::engine_state::{
///     config::PipelineConfig, rendering::geometry_store::HeadlessBackend, ChunkPipeline,
/// };
/// # fn demo(registry: &voxel_pipeline::engine_state::voxels::block::BlockRegistry)
/// #     -> Result<(), voxel_pipeline::engine_state::error::EngineError> {
/// let mut pipeline = ChunkPipeline::start(registry, &PipelineConfig::default(), HeadlessBackend::new())?;
/// pipeline.request_chunk(Point2::new(0, 0))?;
/// while !pipeline.is_idle() {
///     pipeline.process_updates()?;
/// }
/// pipeline.stop()?;
/// # Ok(())
/// # }
/// ```
pub struct ChunkPipeline<B: RenderBackend> {
    registry: BlockRegistry,
    store: ChunkStore,
    chunk_generator: Worker<TerrainGenerator>,
    mesh_generator: Worker<MeshGenerator>,
    geometry: GeometryStore<B>,
    pending_columns: HashSet<ChunkPosition>,
    meshes_in_flight: usize,
}

impl<B: RenderBackend> ChunkPipeline<B> {
    /// Starts both workers with simplex terrain seeded from `config`.
    ///
    /// # Errors
    /// The registry must be locked and must contain the configured terrain blocks. Thread
    /// spawn failures are returned after stopping whichever worker already started.
    pub fn start(
        registry: &BlockRegistry,
        config: &PipelineConfig,
        backend: B,
    ) -> Result<Self, EngineError> {
        let sampler = SimplexHeightMap::new(config.seed, &config.terrain);
        Self::start_with_sampler(registry, config, Box::new(sampler), backend)
    }

    /// Like [`start`](Self::start) with a custom height map.
    pub fn start_with_sampler(
        registry: &BlockRegistry,
        config: &PipelineConfig,
        sampler: Box<dyn HeightSampler>,
        backend: B,
    ) -> Result<Self, EngineError> {
        let registry = registry.thread_safe_duplicate()?;
        let store = ChunkStore::new();
        let terrain = TerrainGenerator::new(&registry, &config.terrain, sampler)?;
        let mesher = MeshGenerator::new(&registry, store.clone())?;

        let mut chunk_generator = Worker::new(terrain, config.poll_interval());
        let mut mesh_generator = Worker::new(mesher, config.poll_interval());

        chunk_generator.start()?;
        if let Err(start_error) = mesh_generator.start() {
            if let Err(stop_error) = chunk_generator.stop() {
                warn!("Terrain worker failed while stopping: {stop_error}");
            }
            return Err(start_error.into());
        }

        info!(
            "Chunk pipeline started with {} registered blocks",
            registry.len()
        );
        Ok(ChunkPipeline {
            registry,
            store,
            chunk_generator,
            mesh_generator,
            geometry: GeometryStore::new(backend),
            pending_columns: HashSet::new(),
            meshes_in_flight: 0,
        })
    }

    /// Asks the terrain worker for the column at `position`.
    ///
    /// Returns `false` if the column is already stored or on its way.
    pub fn request_chunk(&mut self, position: ChunkPosition) -> Result<bool, EngineError> {
        if self.store.has_position(position) || self.pending_columns.contains(&position) {
            return Ok(false);
        }
        if let Err(push_error) = self.chunk_generator.push_request(position) {
            return self.fail(push_error.into());
        }
        self.pending_columns.insert(position);
        Ok(true)
    }

    /// Requests every column within `radius` of `center` on both axes.
    ///
    /// Returns how many new requests were queued.
    pub fn request_chunks_around(
        &mut self,
        center: ChunkPosition,
        radius: i32,
    ) -> Result<usize, EngineError> {
        let mut queued = 0;
        for x in -radius..=radius {
            for z in -radius..=radius {
                if self.request_chunk(Point2::new(center.x + x, center.y + z))? {
                    queued += 1;
                }
            }
        }
        Ok(queued)
    }

    /// Drains both worker queues without blocking.
    ///
    /// New chunks go into the store and get all 8 stacks queued for meshing, along with the
    /// stacks of every stored lateral neighbour. Mesh records are bound to their stack while
    /// their chunk is stored and dropped otherwise.
    ///
    /// # Errors
    /// Any worker or data error. Both workers are stopped before it is returned.
    pub fn process_updates(&mut self) -> Result<PipelineUpdate, EngineError> {
        match self.drain_queues() {
            Ok(update) => Ok(update),
            Err(drain_error) => self.fail(drain_error),
        }
    }

    /// Writes a cell at a world coordinate and re-meshes every stack that can see it.
    ///
    /// # Errors
    /// [`RegistryError::MissingId`](error::RegistryError::MissingId) if the block ID is not
    /// registered; nothing is written and the workers keep running. Otherwise
    /// [`ChunkError::Missing`](error::ChunkError::Missing) if the column is not stored, or
    /// a bounds error for `y` outside the column.
    pub fn set_block(&mut self, world: Point3<i32>, block: BlockData) -> Result<(), EngineError> {
        if let Err(unknown) = self.registry.get_definition(block.id()) {
            warn!(
                "Refusing block {} at ({}, {}, {}): {unknown}",
                block.id(),
                world.x,
                world.y,
                world.z
            );
            return Err(unknown.into());
        }
        if let Err(store_error) = self.store.set_block_at(world, block) {
            return self.fail(store_error.into());
        }

        let column = world_to_chunk_position(world.x, world.z);
        let local = world_to_local(world);
        let stack = (local.y / STACK_HEIGHT) as u8;
        let layer = local.y % STACK_HEIGHT;

        let mut requests = vec![MeshRequest::new(column, stack)];
        if layer == 0 && stack > 0 {
            requests.push(MeshRequest::new(column, stack - 1));
        }
        if layer == STACK_HEIGHT - 1 && stack + 1 < STACK_COUNT {
            requests.push(MeshRequest::new(column, stack + 1));
        }
        let lateral = [
            (local.z == 0, Point2::new(column.x, column.y - 1)),
            (local.z == CHUNK_DEPTH - 1, Point2::new(column.x, column.y + 1)),
            (local.x == 0, Point2::new(column.x - 1, column.y)),
            (local.x == CHUNK_WIDTH - 1, Point2::new(column.x + 1, column.y)),
        ];
        for (on_edge, neighbor) in lateral {
            if on_edge && self.store.has_position(neighbor) {
                requests.push(MeshRequest::new(neighbor, stack));
            }
        }

        for request in requests {
            if let Err(push_error) = self.push_mesh_request(request) {
                return self.fail(push_error);
            }
        }
        Ok(())
    }

    /// Removes a column from the store and releases its geometry.
    ///
    /// Stored lateral neighbours are re-meshed so the faces that bordered the column show
    /// again. Meshes for the removed column that are still in flight are dropped when they
    /// arrive. Returns `false` if the column was not stored.
    ///
    /// # Errors
    /// Any error queueing the neighbour stacks. Both workers are stopped before it is returned.
    pub fn unload_chunk(&mut self, position: ChunkPosition) -> Result<bool, EngineError> {
        let removed = self.store.remove(position).is_some();
        let released = self.geometry.release_column(position);
        if !removed {
            return Ok(false);
        }
        debug!(
            "Unloaded chunk ({}, {}) and released {released} meshes",
            position.x, position.y
        );

        if let Err(push_error) = self.request_neighbor_stacks(position) {
            return self.fail(push_error);
        }
        Ok(true)
    }

    /// `true` once every requested column is stored and every queued mesh has come back.
    pub fn is_idle(&self) -> bool {
        self.pending_columns.is_empty() && self.meshes_in_flight == 0
    }

    /// Number of columns requested but not yet stored.
    pub fn pending_chunk_count(&self) -> usize {
        self.pending_columns.len()
    }

    /// Number of mesh requests not yet answered.
    pub fn meshes_in_flight(&self) -> usize {
        self.meshes_in_flight
    }

    /// The shared chunk store.
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Bound meshes per stack.
    pub fn geometry(&self) -> &GeometryStore<B> {
        &self.geometry
    }

    /// Stops and joins both workers. Queued requests are discarded.
    ///
    /// # Errors
    /// The first error that ended either worker thread.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let terrain = self.chunk_generator.stop();
        let meshing = self.mesh_generator.stop();
        info!("Chunk pipeline stopped");
        terrain.and(meshing)
    }

    fn drain_queues(&mut self) -> Result<PipelineUpdate, EngineError> {
        self.chunk_generator.ensure_running()?;
        self.mesh_generator.ensure_running()?;

        let mut update = PipelineUpdate::default();

        while self.chunk_generator.has_update() {
            let chunk = self.chunk_generator.take_update()?;
            let position = chunk.position();
            self.pending_columns.remove(&position);
            self.store.add_or_update(chunk)?;
            update.chunks_stored += 1;

            self.request_stacks(position)?;
            self.request_neighbor_stacks(position)?;
        }

        while self.mesh_generator.has_update() {
            let outcome = self.mesh_generator.take_update()?;
            self.meshes_in_flight = self.meshes_in_flight.saturating_sub(1);
            match outcome {
                MeshOutcome::Built(record) if self.store.has_position(record.position()) => {
                    self.geometry.bind(&record);
                    update.meshes_bound += 1;
                }
                MeshOutcome::Built(record) => {
                    debug!(
                        "Dropping mesh for unloaded chunk ({}, {})",
                        record.position().x,
                        record.position().y
                    );
                    update.meshes_dropped += 1;
                }
                MeshOutcome::ChunkMissing(_) => update.meshes_dropped += 1,
            }
        }

        Ok(update)
    }

    fn request_stacks(&mut self, position: ChunkPosition) -> Result<(), EngineError> {
        for stack in 0..STACK_COUNT {
            self.push_mesh_request(MeshRequest::new(position, stack))?;
        }
        Ok(())
    }

    fn request_neighbor_stacks(&mut self, position: ChunkPosition) -> Result<(), EngineError> {
        for (dx, dz) in NeighborChunks::OFFSETS {
            let neighbor = Point2::new(position.x + dx, position.y + dz);
            if self.store.has_position(neighbor) {
                self.request_stacks(neighbor)?;
            }
        }
        Ok(())
    }

    fn push_mesh_request(&mut self, request: MeshRequest) -> Result<(), EngineError> {
        self.mesh_generator.push_request(request)?;
        self.meshes_in_flight += 1;
        Ok(())
    }

    fn fail<T>(&mut self, cause: EngineError) -> Result<T, EngineError> {
        error!("Chunk pipeline failed: {cause}");
        if let Err(stop_error) = self.stop() {
            warn!("Worker also failed while stopping: {stop_error}");
        }
        Err(cause)
    }
}
