//! # Chunk Module
//!
//! This module provides the packed [`Chunk`]: a 16x128x16 column of voxel cells addressed by a
//! 2D column coordinate.
//!
//! ## Memory Layout
//!
//! Cells live in one flat array of [`BlockData`] words with Y as the outermost stride:
//!
//! ```text
//! index = y * 256 + z * 16 + x
//! ```
//!
//! The array always has exactly [`CHUNK_ARRAY_SIZE`] entries. Nothing ever resizes it; bulk
//! replacement checks the length and every coordinate or index access is bounds checked and
//! fails instead of clamping.
//!
//! ## Stacks
//!
//! For meshing the column is split into [`STACK_COUNT`] vertical stacks of [`STACK_HEIGHT`]
//! layers each. The split is purely logical; see [`chunk_iteration::StackIterator`].
//!
//! ## Snapshots
//!
//! `Clone` is a deep copy of both the position and the cell array. Worker threads only ever see
//! such clones, so a clone never observes later edits to its original.

use cgmath::{Point2, Point3};

use crate::engine_state::error::ChunkError;

pub mod block_data;
pub mod chunk_iteration;

pub use block_data::BlockData;

/// Width of a chunk along X, in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Height of a chunk along Y, in blocks.
pub const CHUNK_HEIGHT: i32 = 128;
/// Depth of a chunk along Z, in blocks.
pub const CHUNK_DEPTH: i32 = 16;
/// Number of cells in one horizontal layer.
pub const CHUNK_LAYER_SIZE: usize = (CHUNK_WIDTH * CHUNK_DEPTH) as usize;
/// Number of cells in a chunk.
pub const CHUNK_ARRAY_SIZE: usize = CHUNK_LAYER_SIZE * CHUNK_HEIGHT as usize;
/// Layers per mesh stack.
pub const STACK_HEIGHT: i32 = 16;
/// Mesh stacks per chunk.
pub const STACK_COUNT: u8 = (CHUNK_HEIGHT / STACK_HEIGHT) as u8;

/// Column coordinate of a chunk. `x` is the world X column, `y` is the world Z column.
pub type ChunkPosition = Point2<i32>;

/// A 16x128x16 column of packed voxel cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    position: ChunkPosition,
    data: Box<[BlockData]>,
}

impl Chunk {
    /// Creates a chunk filled with air.
    pub fn new(position: ChunkPosition) -> Self {
        Chunk {
            position,
            data: vec![BlockData::AIR; CHUNK_ARRAY_SIZE].into_boxed_slice(),
        }
    }

    /// Creates a chunk from a complete cell array in index order.
    ///
    /// # Errors
    /// [`ChunkError::StreamLength`] unless `data` holds exactly [`CHUNK_ARRAY_SIZE`] cells.
    pub fn from_block_data(position: ChunkPosition, data: Vec<BlockData>) -> Result<Self, ChunkError> {
        if data.len() != CHUNK_ARRAY_SIZE {
            return Err(ChunkError::StreamLength(data.len()));
        }
        Ok(Chunk {
            position,
            data: data.into_boxed_slice(),
        })
    }

    /// The column this chunk occupies.
    pub fn position(&self) -> ChunkPosition {
        self.position
    }

    /// `true` if the local coordinate lies inside the chunk volume.
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_DEPTH).contains(&z)
    }

    /// Converts a local coordinate to its flat index.
    ///
    /// # Errors
    /// [`ChunkError::PositionOutOfBounds`] if the coordinate is outside the chunk.
    pub fn position_to_index(position: Point3<i32>) -> Result<usize, ChunkError> {
        let Point3 { x, y, z } = position;
        if !Self::in_bounds(x, y, z) {
            return Err(ChunkError::PositionOutOfBounds { x, y, z });
        }
        Ok(y as usize * CHUNK_LAYER_SIZE + (z * CHUNK_WIDTH + x) as usize)
    }

    /// Converts a flat index back to its local coordinate.
    ///
    /// # Errors
    /// [`ChunkError::IndexOutOfBounds`] if `index >= CHUNK_ARRAY_SIZE`.
    pub fn index_to_position(index: usize) -> Result<Point3<i32>, ChunkError> {
        if index >= CHUNK_ARRAY_SIZE {
            return Err(ChunkError::IndexOutOfBounds(index));
        }
        let index = index as i32;
        Ok(Point3::new(
            index % CHUNK_WIDTH,
            index / CHUNK_LAYER_SIZE as i32,
            (index / CHUNK_WIDTH) % CHUNK_DEPTH,
        ))
    }

    /// Reads the packed cell at a local coordinate.
    pub fn get_block(&self, position: Point3<i32>) -> Result<BlockData, ChunkError> {
        Ok(self.data[Self::position_to_index(position)?])
    }

    /// Reads the packed cell at a flat index.
    pub fn get_block_at_index(&self, index: usize) -> Result<BlockData, ChunkError> {
        self.data
            .get(index)
            .copied()
            .ok_or(ChunkError::IndexOutOfBounds(index))
    }

    /// Overwrites the packed cell at a local coordinate.
    pub fn set_block(&mut self, position: Point3<i32>, block: BlockData) -> Result<(), ChunkError> {
        let index = Self::position_to_index(position)?;
        self.data[index] = block;
        Ok(())
    }

    /// Block ID at a local coordinate.
    pub fn get_block_id(&self, position: Point3<i32>) -> Result<u32, ChunkError> {
        Ok(self.get_block(position)?.id())
    }

    /// Replaces the block ID at a local coordinate, keeping light and state.
    pub fn set_block_id(&mut self, position: Point3<i32>, id: u32) -> Result<(), ChunkError> {
        let index = Self::position_to_index(position)?;
        self.data[index] = self.data[index].with_id(id)?;
        Ok(())
    }

    /// Light level at a local coordinate.
    pub fn get_light(&self, position: Point3<i32>) -> Result<u32, ChunkError> {
        Ok(self.get_block(position)?.light())
    }

    /// Replaces the light level at a local coordinate, keeping ID and state.
    pub fn set_light(&mut self, position: Point3<i32>, light: u32) -> Result<(), ChunkError> {
        let index = Self::position_to_index(position)?;
        self.data[index] = self.data[index].with_light(light)?;
        Ok(())
    }

    /// Block state at a local coordinate.
    pub fn get_state(&self, position: Point3<i32>) -> Result<u32, ChunkError> {
        Ok(self.get_block(position)?.state())
    }

    /// Replaces the block state at a local coordinate, keeping ID and light.
    pub fn set_state(&mut self, position: Point3<i32>, state: u32) -> Result<(), ChunkError> {
        let index = Self::position_to_index(position)?;
        self.data[index] = self.data[index].with_state(state)?;
        Ok(())
    }

    /// Replaces every cell in place. The chunk keeps its identity and position.
    ///
    /// # Errors
    /// [`ChunkError::StreamLength`] unless `data` holds exactly [`CHUNK_ARRAY_SIZE`] cells; the
    /// chunk is left untouched in that case.
    pub fn stream_new_block_data(&mut self, data: &[BlockData]) -> Result<(), ChunkError> {
        if data.len() != CHUNK_ARRAY_SIZE {
            return Err(ChunkError::StreamLength(data.len()));
        }
        self.data.copy_from_slice(data);
        Ok(())
    }

    /// Borrowed view of the packed cells in index order.
    pub fn block_data(&self) -> &[BlockData] {
        &self.data
    }

    /// Copy of the raw 32 bit words.
    pub fn raw_data(&self) -> Vec<u32> {
        bytemuck::cast_slice::<BlockData, u32>(&self.data).to_vec()
    }
}

/// Column containing a world block coordinate. Uses floor division so negative coordinates
/// land in the column to their left.
pub fn world_to_chunk_position(world_x: i32, world_z: i32) -> ChunkPosition {
    Point2::new(world_x.div_euclid(CHUNK_WIDTH), world_z.div_euclid(CHUNK_DEPTH))
}

/// Local coordinate of a world block coordinate inside its column. Y passes through unchanged.
pub fn world_to_local(world: Point3<i32>) -> Point3<i32> {
    Point3::new(
        world.x.rem_euclid(CHUNK_WIDTH),
        world.y,
        world.z.rem_euclid(CHUNK_DEPTH),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_position_round_trip_over_the_whole_chunk() {
        for index in 0..CHUNK_ARRAY_SIZE {
            let position = Chunk::index_to_position(index).unwrap();
            assert_eq!(Chunk::position_to_index(position).unwrap(), index);
        }
    }

    #[test]
    fn index_layout_puts_y_outermost() {
        assert_eq!(Chunk::position_to_index(Point3::new(1, 0, 0)).unwrap(), 1);
        assert_eq!(Chunk::position_to_index(Point3::new(0, 0, 1)).unwrap(), 16);
        assert_eq!(Chunk::position_to_index(Point3::new(0, 1, 0)).unwrap(), 256);
        assert_eq!(
            Chunk::position_to_index(Point3::new(15, 127, 15)).unwrap(),
            CHUNK_ARRAY_SIZE - 1
        );
    }

    #[test]
    fn out_of_range_access_fails_instead_of_clamping() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        assert!(matches!(
            chunk.get_block(Point3::new(16, 0, 0)),
            Err(ChunkError::PositionOutOfBounds { x: 16, .. })
        ));
        assert!(chunk.get_block(Point3::new(0, -1, 0)).is_err());
        assert!(chunk.set_block_id(Point3::new(0, 128, 0), 1).is_err());
        assert!(chunk.get_block_at_index(CHUNK_ARRAY_SIZE).is_err());
        assert!(matches!(
            Chunk::index_to_position(CHUNK_ARRAY_SIZE),
            Err(ChunkError::IndexOutOfBounds(_))
        ));
    }

    #[test]
    fn positional_setters_keep_other_fields() {
        let mut chunk = Chunk::new(Point2::new(2, -3));
        let at = Point3::new(4, 70, 9);
        chunk.set_light(at, 12).unwrap();
        chunk.set_block_id(at, 300).unwrap();
        chunk.set_state(at, 6).unwrap();

        assert_eq!(chunk.get_block_id(at).unwrap(), 300);
        assert_eq!(chunk.get_light(at).unwrap(), 12);
        assert_eq!(chunk.get_state(at).unwrap(), 6);
        assert!(chunk.set_light(at, 16).is_err());
        assert_eq!(chunk.get_light(at).unwrap(), 12);
    }

    #[test]
    fn clone_is_isolated_from_later_edits() {
        let mut original = Chunk::new(Point2::new(0, 0));
        let origin = Point3::new(0, 0, 0);
        original.set_block_id(origin, 5).unwrap();

        let snapshot = original.clone();
        original.set_block_id(origin, 9).unwrap();

        assert_eq!(snapshot.get_block_id(origin).unwrap(), 5);
        assert_eq!(original.get_block_id(origin).unwrap(), 9);
        assert_eq!(snapshot.position(), original.position());
    }

    #[test]
    fn raw_data_is_a_copy() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.set_block_id(Point3::new(1, 0, 0), 2).unwrap();
        let raw = chunk.raw_data();
        chunk.set_block_id(Point3::new(1, 0, 0), 3).unwrap();
        assert_eq!(raw.len(), CHUNK_ARRAY_SIZE);
        assert_eq!(raw[1], 2 << 16);
    }

    #[test]
    fn streamed_data_must_fill_the_chunk() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        assert!(matches!(
            chunk.stream_new_block_data(&[BlockData::AIR; 10]),
            Err(ChunkError::StreamLength(10))
        ));

        let filled = vec![BlockData::from_id(7).unwrap(); CHUNK_ARRAY_SIZE];
        chunk.stream_new_block_data(&filled).unwrap();
        assert!(chunk.block_data().iter().all(|cell| cell.id() == 7));
    }

    #[test]
    fn world_coordinates_floor_into_columns() {
        assert_eq!(world_to_chunk_position(0, 15), Point2::new(0, 0));
        assert_eq!(world_to_chunk_position(16, -1), Point2::new(1, -1));
        assert_eq!(world_to_chunk_position(-17, -16), Point2::new(-2, -1));
        assert_eq!(world_to_local(Point3::new(-1, 40, 17)), Point3::new(15, 40, 1));
    }
}
