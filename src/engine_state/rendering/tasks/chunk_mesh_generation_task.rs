//! Worker job that turns (column, stack) requests into mesh records.
//!
//! The job owns a read-only duplicate of the block registry and a handle to the shared chunk
//! store. For each request it clones the target chunk and whichever lateral neighbours exist,
//! then meshes the stack from those snapshots without holding any lock.
//!
//! A column unloaded between the request and its turn in the queue is reported back as
//! [`MeshOutcome::ChunkMissing`] instead of ending the worker.

use log::debug;
use web_time::Instant;

use crate::engine_state::{
    error::{EngineError, RegistryError, WorkerError},
    rendering::meshing::{
        mesher::{mesh_stack, NeighborChunks},
        MeshRecord, MeshToken,
    },
    task_management::WorkerJob,
    voxels::{
        block::BlockRegistry,
        chunk::{Chunk, ChunkPosition, STACK_COUNT},
        world::ChunkStore,
    },
};

/// One stack of one column to mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshRequest {
    /// Column of the chunk.
    pub position: ChunkPosition,
    /// Stack index, `0..8`.
    pub stack: u8,
}

impl MeshRequest {
    /// Requests `stack` of the chunk at `position`.
    pub fn new(position: ChunkPosition, stack: u8) -> Self {
        MeshRequest { position, stack }
    }
}

/// What the mesh worker hands back for one request.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshOutcome {
    /// Geometry for the requested stack.
    Built(MeshRecord),
    /// The column was no longer stored when the request was processed.
    ChunkMissing(MeshRequest),
}

/// Mesh worker state.
pub struct MeshGenerator {
    registry: BlockRegistry,
    store: ChunkStore,
    next_token: u64,
}

impl MeshGenerator {
    /// Builds a generator reading from `store` with a private duplicate of `registry`.
    ///
    /// # Errors
    /// [`RegistryError::NotLocked`] if `registry` is still accepting registrations.
    pub fn new(registry: &BlockRegistry, store: ChunkStore) -> Result<Self, RegistryError> {
        let registry = registry.thread_safe_duplicate()?;
        Ok(MeshGenerator {
            registry,
            store,
            next_token: 1,
        })
    }

    /// Meshes one stack from the current store contents.
    ///
    /// # Errors
    /// [`ChunkError::Missing`](crate::engine_state::error::ChunkError::Missing) if the target
    /// column is not stored, or any error from meshing.
    pub fn generate(&mut self, request: MeshRequest) -> Result<MeshRecord, EngineError> {
        let chunk = self.store.thread_safe_chunk_clone(request.position)?;
        self.mesh_snapshot(request, &chunk)
    }

    fn mesh_snapshot(&mut self, request: MeshRequest, chunk: &Chunk) -> Result<MeshRecord, EngineError> {
        let MeshRequest { position, stack } = request;
        let started = Instant::now();

        let neighbors = NeighborChunks::gather(position, |column| {
            self.store.try_thread_safe_chunk_clone(column)
        });
        let buffers = mesh_stack(chunk, &neighbors, stack, &self.registry)?;

        let token = MeshToken::new(self.next_token);
        self.next_token += 1;
        let record = buffers.into_record(token, position, stack);

        debug!(
            "Meshed stack {stack} of chunk ({}, {}): {} vertices in {:?}",
            position.x,
            position.y,
            record.vertex_count(),
            started.elapsed()
        );
        Ok(record)
    }
}

impl WorkerJob for MeshGenerator {
    type Request = MeshRequest;
    type Output = MeshOutcome;
    const NAME: &'static str = "chunk mesh generator";

    fn startup_message(&self) -> String {
        format!(
            "{} started with blocks {:?}",
            Self::NAME,
            self.registry.all_block_names()
        )
    }

    fn validate(request: &MeshRequest) -> Result<(), WorkerError> {
        if request.stack >= STACK_COUNT {
            return Err(WorkerError::InvalidStack(request.stack));
        }
        Ok(())
    }

    fn process(&mut self, request: MeshRequest) -> Result<MeshOutcome, EngineError> {
        match self.store.try_thread_safe_chunk_clone(request.position) {
            Some(chunk) => self.mesh_snapshot(request, &chunk).map(MeshOutcome::Built),
            None => {
                debug!(
                    "Skipping stack {} of unloaded chunk ({}, {})",
                    request.stack, request.position.x, request.position.y
                );
                Ok(MeshOutcome::ChunkMissing(request))
            }
        }
    }
}
