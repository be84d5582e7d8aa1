//! Background jobs that produce voxel data.

pub mod chunk_generation_task;
