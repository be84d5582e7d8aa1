//! # Error Types
//!
//! Every failure in the chunk pipeline is one of a handful of fatal categories: bounds and
//! consistency violations in chunk data, registry authoring mistakes, a corrupt name/ID cache,
//! misuse of a worker's queue API, or an unreadable configuration file. Each subsystem has its
//! own enum; [`EngineError`] unifies them for callers that drive the whole pipeline.

use std::io;

use thiserror::Error;

/// Errors raised by packed chunk data and the chunk store.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// A local block coordinate fell outside the 16x128x16 chunk volume.
    #[error("position ({x}, {y}, {z}) is outside the chunk bounds")]
    PositionOutOfBounds {
        /// Local x coordinate.
        x: i32,
        /// Local y coordinate.
        y: i32,
        /// Local z coordinate.
        z: i32,
    },

    /// A flat index fell outside `[0, 32768)`.
    #[error("index {0} is outside the chunk bounds")]
    IndexOutOfBounds(usize),

    /// A bit-field setter received a value wider than its field.
    #[error("{field} value {value} is larger than the maximum of {max}")]
    FieldOverflow {
        /// Name of the packed field (`id`, `light` or `state`).
        field: &'static str,
        /// Rejected value.
        value: u32,
        /// Largest value the field can hold.
        max: u32,
    },

    /// A bulk data replacement did not contain exactly one word per cell.
    #[error("block data stream holds {0} words, a chunk needs exactly 32768")]
    StreamLength(usize),

    /// The chunk store has no chunk at the requested column.
    #[error("no chunk is stored at column ({x}, {z})")]
    Missing {
        /// Column x coordinate.
        x: i32,
        /// Column z coordinate.
        z: i32,
    },
}

/// Errors raised while loading or extending the persisted name to ID mapping.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("block cache io failure: {0}")]
    Io(#[from] io::Error),

    /// The cache file is not valid JSON.
    #[error("block cache is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    /// The top level JSON value is not an object.
    #[error("block cache must be a flat json object")]
    NotAnObject,

    /// A cached value is negative, fractional or not a number at all.
    #[error("block cache entry `{name}` has non-integral id {value}")]
    NotInteger {
        /// Block name owning the corrupt entry.
        name: String,
        /// The offending JSON value, rendered.
        value: String,
    },

    /// A cached ID does not fit in the 16 bit ID field.
    #[error("block cache entry `{name}` has id {id}, which does not fit in 16 bits")]
    IdOutOfRange {
        /// Block name owning the entry.
        name: String,
        /// Offending ID.
        id: u64,
    },

    /// Two names map to the same ID.
    #[error("block cache maps both `{first}` and `{second}` to id {id}")]
    Collision {
        /// Shared ID.
        id: u32,
        /// First name seen with that ID.
        first: String,
        /// Second name seen with that ID.
        second: String,
    },

    /// The cache gives air an ID other than 0.
    #[error("block cache gives `air` id {0}, but air is always 0")]
    AirNotZero(u32),

    /// Every 16 bit ID is already assigned.
    #[error("no free block ids remain for `{0}`")]
    Exhausted(String),
}

/// Errors raised by block definitions and the block registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registration was attempted after the registry was locked.
    #[error("registry is locked, `{0}` cannot be registered")]
    Locked(String),

    /// A worker-side duplicate was asked to change.
    #[error("registry duplicates are read only")]
    ReadOnlyDuplicate,

    /// A duplicate was requested before the registry was locked.
    #[error("registry must be locked before it can be duplicated")]
    NotLocked,

    /// The name is already registered.
    #[error("block `{0}` is already registered")]
    DuplicateName(String),

    /// The ID assigned to a new block already belongs to another block.
    #[error("block id {id} for `{name}` is already taken by `{existing}`")]
    DuplicateId {
        /// Colliding ID.
        id: u32,
        /// Block being registered.
        name: String,
        /// Block that already owns the ID.
        existing: String,
    },

    /// No block is registered with this name.
    #[error("no block named `{0}` is registered")]
    MissingName(String),

    /// No block is registered with this ID.
    #[error("no block with id {0} is registered")]
    MissingId(u32),

    /// A texture list did not have exactly one texture per face.
    #[error("block `{name}` needs 6 textures, got {count}")]
    TextureCount {
        /// Block name.
        name: String,
        /// Number of textures supplied.
        count: usize,
    },

    /// Textures were assigned twice.
    #[error("block `{0}` already has textures")]
    TexturesAlreadySet(String),

    /// A visible block was registered without textures.
    #[error("block `{0}` is drawn but has no textures")]
    MissingTextures(String),

    /// A texture name is not present in the texture atlas.
    #[error("block `{name}` uses texture `{texture}`, which is not in the atlas")]
    MissingTexture {
        /// Block name.
        name: String,
        /// Texture file name.
        texture: String,
    },

    /// A face has no UV quad attached.
    #[error("block `{name}` has no uv quad for its {face} face")]
    MissingFace {
        /// Block name.
        name: String,
        /// Face name.
        face: &'static str,
    },

    /// An optional property was given a value outside its allowed range.
    #[error("block `{name}` has {property} = {value}, allowed range is {range}")]
    InvalidProperty {
        /// Block name.
        name: String,
        /// Property name.
        property: &'static str,
        /// Rejected value.
        value: i64,
        /// Human readable allowed range.
        range: &'static str,
    },

    /// An integer does not correspond to any draw type.
    #[error("{0} is not a valid draw type")]
    InvalidDrawType(i32),

    /// The name/ID cache rejected an assignment.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors raised by misuse of a background worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Queue operations were used before the worker was started.
    #[error("{0} is not running")]
    NotRunning(&'static str),

    /// The worker was started twice, or restarted after stopping.
    #[error("{0} was already started")]
    AlreadyStarted(&'static str),

    /// The worker thread has exited while it was expected to be running.
    #[error("{0} thread has died")]
    ThreadDied(&'static str),

    /// An update was taken while the output queue was empty.
    #[error("{0} has no update ready")]
    NoUpdate(&'static str),

    /// The operating system refused to spawn the worker thread.
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        /// Worker name.
        name: &'static str,
        /// Underlying spawn failure.
        source: io::Error,
    },

    /// The worker thread panicked.
    #[error("{0} thread panicked")]
    Panicked(&'static str),

    /// A mesh request named a stack outside `0..8`.
    #[error("stack {0} is outside the 8 vertical stacks of a chunk")]
    InvalidStack(u8),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid JSON for [`PipelineConfig`](super::config::PipelineConfig).
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any error the chunk pipeline can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Chunk data or chunk store error.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Block registry error.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Name/ID cache error.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Worker usage error.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used across the pipeline.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
