//! # Chunk Iteration Module
//!
//! Walks the cells of one mesh stack in storage order: y outermost, then z, with x innermost.
//! Because that matches the flat index layout, the iterator just advances an index through a
//! contiguous 4096 cell window of the chunk array and derives coordinates from it.

use cgmath::Point3;

use crate::engine_state::error::WorkerError;

use super::{BlockData, Chunk, CHUNK_DEPTH, CHUNK_LAYER_SIZE, CHUNK_WIDTH, STACK_COUNT, STACK_HEIGHT};

const STACK_SIZE: usize = CHUNK_LAYER_SIZE * STACK_HEIGHT as usize;

/// An iterator over every cell of one vertical stack, air included.
pub struct StackIterator<'a> {
    cells: &'a [BlockData],
    base_y: i32,
    offset: usize,
}

impl<'a> StackIterator<'a> {
    /// Creates an iterator over stack `stack` of `chunk`.
    ///
    /// # Errors
    /// [`WorkerError::InvalidStack`] if `stack >= STACK_COUNT`.
    pub fn new(chunk: &'a Chunk, stack: u8) -> Result<Self, WorkerError> {
        if stack >= STACK_COUNT {
            return Err(WorkerError::InvalidStack(stack));
        }
        let start = stack as usize * STACK_SIZE;
        Ok(StackIterator {
            cells: &chunk.block_data()[start..start + STACK_SIZE],
            base_y: stack as i32 * STACK_HEIGHT,
            offset: 0,
        })
    }
}

impl Iterator for StackIterator<'_> {
    type Item = (Point3<i32>, BlockData);

    fn next(&mut self) -> Option<Self::Item> {
        let cell = *self.cells.get(self.offset)?;
        let offset = self.offset as i32;
        self.offset += 1;

        let position = Point3::new(
            offset % CHUNK_WIDTH,
            self.base_y + offset / CHUNK_LAYER_SIZE as i32,
            (offset / CHUNK_WIDTH) % CHUNK_DEPTH,
        );
        Some((position, cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells.len() - self.offset;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;

    #[test]
    fn visits_x_innermost_then_z_then_y() {
        let chunk = Chunk::new(Point2::new(0, 0));
        let positions: Vec<_> = StackIterator::new(&chunk, 2)
            .unwrap()
            .map(|(position, _)| position)
            .collect();

        assert_eq!(positions.len(), STACK_SIZE);
        assert_eq!(positions[0], Point3::new(0, 32, 0));
        assert_eq!(positions[1], Point3::new(1, 32, 0));
        assert_eq!(positions[16], Point3::new(0, 32, 1));
        assert_eq!(positions[256], Point3::new(0, 33, 0));
        assert_eq!(*positions.last().unwrap(), Point3::new(15, 47, 15));
    }

    #[test]
    fn yields_the_stored_cells() {
        let mut chunk = Chunk::new(Point2::new(0, 0));
        chunk.set_block_id(Point3::new(3, 117, 8), 42).unwrap();
        let found: Vec<_> = StackIterator::new(&chunk, 7)
            .unwrap()
            .filter(|(_, cell)| !cell.is_air())
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Point3::new(3, 117, 8));
        assert_eq!(found[0].1.id(), 42);
    }

    #[test]
    fn rejects_stacks_past_the_top() {
        let chunk = Chunk::new(Point2::new(0, 0));
        assert!(matches!(
            StackIterator::new(&chunk, STACK_COUNT),
            Err(WorkerError::InvalidStack(8))
        ));
    }
}
