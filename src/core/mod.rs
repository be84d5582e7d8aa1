//! # Core Module
//!
//! Shared-ownership primitives used by the pipeline. Today that is [`MtResource`], the
//! lock-guarded handle the chunk store is built on.

pub mod mt_resource;

pub use mt_resource::MtResource;
