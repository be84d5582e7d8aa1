//! # Face Culling Mesher
//!
//! Emits a face for every side of a solid cell whose neighbour is not itself an opaque cube.
//! Work is per voxel; no faces are merged.
//!
//! ## Neighbour Lookup
//!
//! Steps that stay inside the chunk read the chunk itself. Steps past the top or bottom of the
//! column count as air. Steps across a lateral edge read the matching neighbour snapshot:
//!
//! ```text
//!            back (z + 1)
//!                 |
//! left (x - 1) - self - right (x + 1)
//!                 |
//!            front (z - 1)
//! ```
//!
//! An absent neighbour counts as air, so chunk edges stay closed until the neighbour arrives
//! and the edge is re-meshed.
//!
//! ## Draw Types
//!
//! Only [`DrawType::BLOCK`] produces geometry. Cells of any other non-air draw type are
//! counted and reported in the log; they have no geometry rule yet.

use cgmath::{Point2, Point3};
use log::warn;

use crate::engine_state::{
    error::EngineError,
    voxels::{
        block::{block_side::BlockSide, draw_type::DrawType, BlockRegistry},
        chunk::{
            chunk_iteration::StackIterator, BlockData, Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH,
        },
    },
};

use super::{face::attach_face, MeshBuffers};

/// Snapshots of the four lateral neighbours of a chunk, where present.
#[derive(Clone, Debug, Default)]
pub struct NeighborChunks {
    /// Column at z - 1.
    pub front: Option<Chunk>,
    /// Column at z + 1.
    pub back: Option<Chunk>,
    /// Column at x - 1.
    pub left: Option<Chunk>,
    /// Column at x + 1.
    pub right: Option<Chunk>,
}

impl NeighborChunks {
    /// Column offsets of the four neighbours, in field order.
    pub const OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

    /// Collects neighbours of `center` using `lookup` for each column.
    pub fn gather(center: Point2<i32>, mut lookup: impl FnMut(Point2<i32>) -> Option<Chunk>) -> Self {
        let mut at = |(dx, dz): (i32, i32)| lookup(Point2::new(center.x + dx, center.y + dz));
        NeighborChunks {
            front: at(Self::OFFSETS[0]),
            back: at(Self::OFFSETS[1]),
            left: at(Self::OFFSETS[2]),
            right: at(Self::OFFSETS[3]),
        }
    }

    /// Cell at a local coordinate that may lie one step outside `chunk` laterally.
    ///
    /// `None` means the cell is treated as air.
    fn resolve(&self, chunk: &Chunk, position: Point3<i32>) -> Result<Option<BlockData>, EngineError> {
        let Point3 { x, y, z } = position;
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return Ok(None);
        }

        let (source, local) = if z < 0 {
            (self.front.as_ref(), Point3::new(x, y, z + CHUNK_DEPTH))
        } else if z >= CHUNK_DEPTH {
            (self.back.as_ref(), Point3::new(x, y, z - CHUNK_DEPTH))
        } else if x < 0 {
            (self.left.as_ref(), Point3::new(x + CHUNK_WIDTH, y, z))
        } else if x >= CHUNK_WIDTH {
            (self.right.as_ref(), Point3::new(x - CHUNK_WIDTH, y, z))
        } else {
            (Some(chunk), position)
        };

        match source {
            Some(source) => Ok(Some(source.get_block(local)?)),
            None => Ok(None),
        }
    }
}

/// `true` if the cell hides the faces of cells next to it.
fn is_opaque(cell: Option<BlockData>, registry: &BlockRegistry) -> Result<bool, EngineError> {
    match cell {
        Some(cell) if !cell.is_air() => {
            Ok(registry.get_definition(cell.id())?.draw_type().is_opaque_cube())
        }
        _ => Ok(false),
    }
}

/// Builds the geometry of one stack of `chunk`.
///
/// # Errors
/// A stack outside `0..8`, a cell whose ID is not registered, or a block lacking a face UV.
pub fn mesh_stack(
    chunk: &Chunk,
    neighbors: &NeighborChunks,
    stack: u8,
    registry: &BlockRegistry,
) -> Result<MeshBuffers, EngineError> {
    let mut buffers = MeshBuffers::default();
    let mut unsupported = 0usize;

    for (position, cell) in StackIterator::new(chunk, stack)? {
        if cell.is_air() {
            continue;
        }
        let definition = registry.get_definition(cell.id())?;
        match definition.draw_type() {
            DrawType::AIR => continue,
            DrawType::BLOCK => {}
            _ => {
                unsupported += 1;
                continue;
            }
        }

        for side in BlockSide::all() {
            let neighbor = neighbors.resolve(chunk, position + side.offset())?;
            if !is_opaque(neighbor, registry)? {
                attach_face(&mut buffers, side, definition, position)?;
            }
        }
    }

    if unsupported > 0 {
        let column = chunk.position();
        warn!(
            "Stack {stack} of chunk ({}, {}) has {unsupported} cells with draw types that are not meshed yet",
            column.x, column.y
        );
    }
    Ok(buffers)
}
