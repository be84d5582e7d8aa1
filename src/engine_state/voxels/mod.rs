//! # Voxels Module
//!
//! Voxel data and its producers.
//!
//! * **Block**: block kinds, the registry and its name/ID cache
//! * **Chunk**: packed 16x128x16 columns of cells
//! * **World**: the shared chunk store
//! * **Tasks**: the terrain generation worker job
//!
//! ## Data Flow
//!
//! 1. The main thread asks the terrain worker for a column
//! 2. The worker fills a fresh chunk from noise and queues it
//! 3. The main thread drains finished chunks into the [`world::ChunkStore`]
//! 4. Mesh requests for the new column read snapshots from that store

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod world;
