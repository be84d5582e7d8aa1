//! # World Module
//!
//! This module provides the [`ChunkStore`], the authoritative map from column coordinate to
//! [`Chunk`].
//!
//! ## Ownership
//!
//! The main thread is the only writer. The mesh worker holds a clone of the store handle and
//! reads exclusively through [`ChunkStore::thread_safe_chunk_clone`], which copies the chunk
//! while holding the lock. A clone is a snapshot as of lock acquisition, so later edits by the
//! main thread are never partially visible to it.
//!
//! Updating a column that already exists streams the new cells into the stored chunk instead
//! of swapping the object, so the column keeps a single identity for its whole life.

use std::collections::HashMap;

use cgmath::Point3;

use crate::{
    core::MtResource,
    engine_state::error::ChunkError,
};

use super::chunk::{world_to_chunk_position, world_to_local, BlockData, Chunk, ChunkPosition};

/// Shared handle to the column map. Cloning the handle does not copy any chunk.
#[derive(Clone, Default)]
pub struct ChunkStore {
    chunks: MtResource<HashMap<ChunkPosition, Chunk>>,
}

impl ChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `chunk`, or replaces the cells of the chunk already stored at its column.
    pub fn add_or_update(&self, chunk: Chunk) -> Result<(), ChunkError> {
        let mut chunks = self.chunks.get_mut();
        match chunks.get_mut(&chunk.position()) {
            Some(existing) => existing.stream_new_block_data(chunk.block_data()),
            None => {
                chunks.insert(chunk.position(), chunk);
                Ok(())
            }
        }
    }

    /// Removes and returns the chunk stored at `position`.
    pub fn remove(&self, position: ChunkPosition) -> Option<Chunk> {
        self.chunks.get_mut().remove(&position)
    }

    /// `true` if a chunk is stored at `position`.
    pub fn has_position(&self, position: ChunkPosition) -> bool {
        self.chunks.get().contains_key(&position)
    }

    /// Runs `f` against the stored chunk under the read lock.
    ///
    /// # Errors
    /// [`ChunkError::Missing`] if no chunk is stored at `position`.
    pub fn with_chunk<R>(
        &self,
        position: ChunkPosition,
        f: impl FnOnce(&Chunk) -> R,
    ) -> Result<R, ChunkError> {
        let chunks = self.chunks.get();
        let chunk = chunks.get(&position).ok_or(missing(position))?;
        Ok(f(chunk))
    }

    /// Runs `f` against the stored chunk under the write lock.
    ///
    /// # Errors
    /// [`ChunkError::Missing`] if no chunk is stored at `position`.
    pub fn with_chunk_mut<R>(
        &self,
        position: ChunkPosition,
        f: impl FnOnce(&mut Chunk) -> R,
    ) -> Result<R, ChunkError> {
        let mut chunks = self.chunks.get_mut();
        let chunk = chunks.get_mut(&position).ok_or(missing(position))?;
        Ok(f(chunk))
    }

    /// A deep copy of the stored chunk, taken under the lock.
    ///
    /// # Errors
    /// [`ChunkError::Missing`] if no chunk is stored at `position`.
    pub fn thread_safe_chunk_clone(&self, position: ChunkPosition) -> Result<Chunk, ChunkError> {
        self.try_thread_safe_chunk_clone(position)
            .ok_or(missing(position))
    }

    /// Like [`thread_safe_chunk_clone`](Self::thread_safe_chunk_clone), but `None` when absent.
    pub fn try_thread_safe_chunk_clone(&self, position: ChunkPosition) -> Option<Chunk> {
        self.chunks.get().get(&position).cloned()
    }

    /// Packed cell at a world block coordinate.
    pub fn get_block_at(&self, world: Point3<i32>) -> Result<BlockData, ChunkError> {
        let column = world_to_chunk_position(world.x, world.z);
        self.with_chunk(column, |chunk| chunk.get_block(world_to_local(world)))?
    }

    /// Overwrites the cell at a world block coordinate.
    pub fn set_block_at(&self, world: Point3<i32>, block: BlockData) -> Result<(), ChunkError> {
        let column = world_to_chunk_position(world.x, world.z);
        self.with_chunk_mut(column, |chunk| chunk.set_block(world_to_local(world), block))?
    }

    /// Columns currently stored, in no particular order.
    pub fn positions(&self) -> Vec<ChunkPosition> {
        self.chunks.get().keys().copied().collect()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.chunks.get().len()
    }

    /// `true` if no chunk is stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.get().is_empty()
    }
}

fn missing(position: ChunkPosition) -> ChunkError {
    ChunkError::Missing {
        x: position.x,
        z: position.y,
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_ARRAY_SIZE;

    fn filled(position: ChunkPosition, id: u32) -> Chunk {
        Chunk::from_block_data(position, vec![BlockData::from_id(id).unwrap(); CHUNK_ARRAY_SIZE])
            .unwrap()
    }

    #[test]
    fn missing_columns_are_errors() {
        let store = ChunkStore::new();
        let column = Point2::new(3, -4);
        assert!(!store.has_position(column));
        assert!(matches!(
            store.thread_safe_chunk_clone(column),
            Err(ChunkError::Missing { x: 3, z: -4 })
        ));
        assert!(store.with_chunk(column, |_| ()).is_err());
        assert!(store.try_thread_safe_chunk_clone(column).is_none());
        assert!(store.remove(column).is_none());
    }

    #[test]
    fn removed_columns_are_gone() {
        let store = ChunkStore::new();
        let column = Point2::new(1, 1);
        store.add_or_update(filled(column, 3)).unwrap();

        let removed = store.remove(column).unwrap();
        assert_eq!(removed.position(), column);
        assert!(!store.has_position(column));
        assert!(store.is_empty());
    }

    #[test]
    fn updating_a_column_streams_into_the_stored_chunk() {
        let store = ChunkStore::new();
        let column = Point2::new(0, 0);
        store.add_or_update(filled(column, 1)).unwrap();
        store.add_or_update(filled(column, 2)).unwrap();

        assert_eq!(store.len(), 1);
        let ids = store
            .with_chunk(column, |chunk| chunk.get_block_id(Point3::new(5, 5, 5)))
            .unwrap()
            .unwrap();
        assert_eq!(ids, 2);
    }

    #[test]
    fn clones_are_snapshots() {
        let store = ChunkStore::new();
        let column = Point2::new(0, 0);
        store.add_or_update(Chunk::new(column)).unwrap();
        store
            .set_block_at(Point3::new(0, 0, 0), BlockData::from_id(5).unwrap())
            .unwrap();

        let snapshot = store.thread_safe_chunk_clone(column).unwrap();
        store
            .set_block_at(Point3::new(0, 0, 0), BlockData::from_id(9).unwrap())
            .unwrap();

        assert_eq!(snapshot.get_block_id(Point3::new(0, 0, 0)).unwrap(), 5);
        assert_eq!(store.get_block_at(Point3::new(0, 0, 0)).unwrap().id(), 9);
    }

    #[test]
    fn world_coordinates_resolve_to_the_right_column() {
        let store = ChunkStore::new();
        store.add_or_update(Chunk::new(Point2::new(-1, 0))).unwrap();
        store
            .set_block_at(Point3::new(-1, 64, 3), BlockData::from_id(4).unwrap())
            .unwrap();

        let id = store
            .with_chunk(Point2::new(-1, 0), |chunk| chunk.get_block_id(Point3::new(15, 64, 3)))
            .unwrap()
            .unwrap();
        assert_eq!(id, 4);
        assert!(store.get_block_at(Point3::new(16, 0, 0)).is_err());
    }

    #[test]
    fn readers_on_other_threads_see_whole_chunks() {
        let store = ChunkStore::new();
        let column = Point2::new(0, 0);
        store.add_or_update(filled(column, 1)).unwrap();

        let reader = store.clone();
        let handle = thread::spawn(move || {
            (0..50)
                .map(|_| reader.thread_safe_chunk_clone(column).unwrap())
                .all(|chunk| {
                    let first = chunk.block_data()[0];
                    chunk.block_data().iter().all(|cell| *cell == first)
                })
        });
        for id in 2..50 {
            store.add_or_update(filled(column, id)).unwrap();
        }

        assert!(handle.join().unwrap());
    }
}
