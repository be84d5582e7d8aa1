//! # Rendering Module
//!
//! The CPU side of chunk rendering: face-culled meshing of chunk stacks, the background job
//! that runs it, and the main-thread store that binds finished meshes to a render backend.
//!
//! ## Components
//!
//! * [`meshing`] - Mesh buffers, the face table and the culling mesher
//! * [`tasks`] - The mesh worker job
//! * [`geometry_store`] - Per-stack mesh binding and the [`RenderBackend`](geometry_store::RenderBackend) seam

pub mod geometry_store;
pub mod meshing;
pub mod tasks;
