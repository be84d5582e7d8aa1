//! # Meshing Module
//!
//! Turns chunk stacks into triangle geometry.
//!
//! * [`face`] - static per-face vertex templates and the face stamping routine
//! * [`mesher`] - per-voxel face culling over one stack
//!
//! The output of a mesh job is a [`MeshRecord`]: three flat, immutable arrays sized exactly to
//! the emitted geometry, tagged with a unique [`MeshToken`] and the (column, stack) it belongs to.

use crate::engine_state::voxels::chunk::ChunkPosition;

pub mod face;
pub mod mesher;

/// Identity of one generated mesh, used to track its render-side resources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshToken(u64);

impl MeshToken {
    /// Wraps a raw token value.
    pub const fn new(value: u64) -> Self {
        MeshToken(value)
    }

    /// The raw token value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Growable buffers a mesh is assembled into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    /// xyz triples, one per vertex.
    pub positions: Vec<f32>,
    /// uv pairs, one per vertex.
    pub texture_coordinates: Vec<f32>,
    /// Triangle list indices into the vertices.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Vertices emitted so far.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Freezes the buffers into a record for `position`/`stack`.
    pub fn into_record(self, token: MeshToken, position: ChunkPosition, stack: u8) -> MeshRecord {
        MeshRecord {
            token,
            position,
            stack,
            positions: self.positions.into_boxed_slice(),
            texture_coordinates: self.texture_coordinates.into_boxed_slice(),
            indices: self.indices.into_boxed_slice(),
        }
    }
}

/// Finished geometry for one stack of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshRecord {
    token: MeshToken,
    position: ChunkPosition,
    stack: u8,
    positions: Box<[f32]>,
    texture_coordinates: Box<[f32]>,
    indices: Box<[u32]>,
}

impl MeshRecord {
    /// Unique token of this mesh.
    pub fn token(&self) -> MeshToken {
        self.token
    }

    /// Column the mesh belongs to.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// Stack within the column.
    pub fn stack(&self) -> u8 {
        self.stack
    }

    /// Vertex positions, xyz per vertex, in chunk-local block units.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Texture coordinates, uv per vertex.
    pub fn texture_coordinates(&self) -> &[f32] {
        &self.texture_coordinates
    }

    /// Triangle list indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// `true` if the stack produced no visible faces.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
