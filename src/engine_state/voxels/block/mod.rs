//! # Block Module
//!
//! Everything that describes what a block *is*, as opposed to where it sits:
//!
//! * [`definition`] - per-kind properties and textures
//! * [`registry`] - the lockable name/ID catalog of definitions
//! * [`id_cache`] - persisted name to ID assignments
//! * [`atlas`] - the texture atlas seam used to attach face UVs
//! * [`block_side`] and [`draw_type`] - small enums shared by meshing and the registry

pub mod atlas;
pub mod block_side;
pub mod definition;
pub mod draw_type;
pub mod id_cache;
pub mod registry;

pub use definition::BlockDefinition;
pub use registry::BlockRegistry;
