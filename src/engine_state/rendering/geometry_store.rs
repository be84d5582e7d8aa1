//! # Geometry Store Module
//!
//! Main-thread bookkeeping of which mesh is bound to each (column, stack).
//!
//! The store does not own any render resources itself. It forwards create and destroy calls to
//! a [`RenderBackend`] and remembers the [`MeshToken`] currently bound per stack, so that
//! binding a new record for a stack always releases the geometry it replaces.
//!
//! [`HeadlessBackend`] keeps the uploaded bytes in memory along with simple usage analytics.
//! It stands in for a GPU when running without a window and in tests.

use std::collections::HashMap;

use bytemuck::NoUninit;
use log::debug;

use crate::engine_state::voxels::chunk::ChunkPosition;

use super::meshing::{MeshRecord, MeshToken};

/// Types that can be viewed as raw bytes for upload.
pub trait AsBytes {
    /// The value as a byte slice.
    fn as_bytes(&self) -> &[u8];
}

impl<T> AsBytes for [T]
where
    T: NoUninit,
{
    fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self)
    }
}

/// Receiver of geometry create/destroy calls.
pub trait RenderBackend {
    /// Uploads the arrays of `record` under its token.
    fn create_geometry(&mut self, record: &MeshRecord);

    /// Releases the geometry uploaded under `token`.
    fn destroy_geometry(&mut self, token: MeshToken);
}

/// Byte copies of one uploaded mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryBuffers {
    /// Vertex positions as bytes.
    pub positions: Vec<u8>,
    /// Texture coordinates as bytes.
    pub texture_coordinates: Vec<u8>,
    /// Indices as bytes.
    pub indices: Vec<u8>,
}

impl GeometryBuffers {
    /// Total size in bytes.
    pub fn byte_len(&self) -> usize {
        self.positions.len() + self.texture_coordinates.len() + self.indices.len()
    }
}

/// Usage counters of a [`HeadlessBackend`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendAnalytics {
    /// Bytes currently held.
    pub used_memory: u64,
    /// Geometry uploads so far.
    pub times_created: u64,
    /// Geometry releases so far.
    pub times_destroyed: u64,
}

/// In-memory backend.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    geometry: HashMap<MeshToken, GeometryBuffers>,
    analytics: BackendAnalytics,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry uploaded under `token`, if still alive.
    pub fn geometry(&self, token: MeshToken) -> Option<&GeometryBuffers> {
        self.geometry.get(&token)
    }

    /// Number of live uploads.
    pub fn live_count(&self) -> usize {
        self.geometry.len()
    }

    /// Usage counters.
    pub fn analytics(&self) -> BackendAnalytics {
        self.analytics
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_geometry(&mut self, record: &MeshRecord) {
        let buffers = GeometryBuffers {
            positions: record.positions().as_bytes().to_vec(),
            texture_coordinates: record.texture_coordinates().as_bytes().to_vec(),
            indices: record.indices().as_bytes().to_vec(),
        };
        self.analytics.used_memory += buffers.byte_len() as u64;
        self.analytics.times_created += 1;
        self.geometry.insert(record.token(), buffers);
    }

    fn destroy_geometry(&mut self, token: MeshToken) {
        if let Some(buffers) = self.geometry.remove(&token) {
            self.analytics.used_memory -= buffers.byte_len() as u64;
            self.analytics.times_destroyed += 1;
        }
    }
}

/// Tracks the bound mesh of every chunk stack.
pub struct GeometryStore<B: RenderBackend> {
    backend: B,
    bound: HashMap<(ChunkPosition, u8), MeshToken>,
}

impl<B: RenderBackend> GeometryStore<B> {
    /// Creates an empty store over `backend`.
    pub fn new(backend: B) -> Self {
        GeometryStore {
            backend,
            bound: HashMap::new(),
        }
    }

    /// Binds `record` to its stack, destroying whatever was bound there before.
    ///
    /// Returns the replaced token, if any.
    pub fn bind(&mut self, record: &MeshRecord) -> Option<MeshToken> {
        self.backend.create_geometry(record);
        let previous = self
            .bound
            .insert((record.position(), record.stack()), record.token());
        if let Some(previous) = previous {
            self.backend.destroy_geometry(previous);
        }
        debug!(
            "Bound mesh {} to stack {} of chunk ({}, {})",
            record.token().value(),
            record.stack(),
            record.position().x,
            record.position().y
        );
        previous
    }

    /// Destroys every mesh bound to the chunk at `position`. Returns how many were released.
    pub fn release_column(&mut self, position: ChunkPosition) -> usize {
        let stacks: Vec<(ChunkPosition, u8)> = self
            .bound
            .keys()
            .filter(|(column, _)| *column == position)
            .copied()
            .collect();
        for key in &stacks {
            if let Some(token) = self.bound.remove(key) {
                self.backend.destroy_geometry(token);
            }
        }
        stacks.len()
    }

    /// Token bound to `stack` of the chunk at `position`.
    pub fn bound_token(&self, position: ChunkPosition, stack: u8) -> Option<MeshToken> {
        self.bound.get(&(position, stack)).copied()
    }

    /// Number of stacks of `position` with a bound mesh.
    pub fn bound_stack_count(&self, position: ChunkPosition) -> usize {
        self.bound.keys().filter(|(column, _)| *column == position).count()
    }

    /// Number of bound stacks across all columns.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// The backend receiving create/destroy calls.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
