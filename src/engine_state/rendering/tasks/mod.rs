//! Background jobs owned by the rendering subsystem.

pub mod chunk_mesh_generation_task;
