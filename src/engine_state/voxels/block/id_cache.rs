//! # Block ID Cache
//!
//! Keeps block IDs stable across runs by persisting the name to ID assignment as a flat JSON
//! object:
//!
//! ```json
//! { "air": 0, "crafter:stone": 1, "crafter:dirt": 2 }
//! ```
//!
//! Loading validates that every value is a non-negative integer that fits in 16 bits and that
//! no two names share an ID. New names receive the next integer after the largest one seen.
//! `air` is always ID 0 whether or not the file mentions it.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde_json::Value;

use crate::engine_state::{
    error::CacheError,
    voxels::chunk::block_data::MAX_BLOCK_ID,
};

use super::definition::AIR_NAME;

/// Name to ID mapping backed by an optional JSON file.
#[derive(Clone, Debug)]
pub struct BlockIdCache {
    path: Option<PathBuf>,
    ids: HashMap<String, u32>,
    next_free: u32,
}

impl BlockIdCache {
    /// A cache that never touches the filesystem.
    pub fn in_memory() -> Self {
        let mut ids = HashMap::new();
        ids.insert(AIR_NAME.to_string(), 0);
        BlockIdCache {
            path: None,
            ids,
            next_free: 1,
        }
    }

    /// Loads the cache file at `path`. A missing file yields an empty cache that will be
    /// written to `path` on [`save`](Self::save).
    ///
    /// # Errors
    /// Any [`CacheError`] describing unreadable or corrupt contents.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let mut cache = BlockIdCache::in_memory();
        cache.path = Some(path.to_path_buf());

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!("No block cache at {}, starting fresh", path.display());
                return Ok(cache);
            }
            Err(error) => return Err(error.into()),
        };

        cache.absorb(&contents)?;
        info!(
            "Loaded {} cached block ids from {}",
            cache.ids.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Parses cache contents without a backing file.
    pub fn from_json(contents: &str) -> Result<Self, CacheError> {
        let mut cache = BlockIdCache::in_memory();
        cache.absorb(contents)?;
        Ok(cache)
    }

    fn absorb(&mut self, contents: &str) -> Result<(), CacheError> {
        let Value::Object(entries) = serde_json::from_str::<Value>(contents)? else {
            return Err(CacheError::NotAnObject);
        };

        let mut owners: HashMap<u32, String> = HashMap::new();
        owners.insert(0, AIR_NAME.to_string());

        for (name, value) in entries {
            let id = value.as_u64().ok_or_else(|| CacheError::NotInteger {
                name: name.clone(),
                value: value.to_string(),
            })?;
            if id > MAX_BLOCK_ID as u64 {
                return Err(CacheError::IdOutOfRange { name, id });
            }
            let id = id as u32;

            if name == AIR_NAME {
                if id != 0 {
                    return Err(CacheError::AirNotZero(id));
                }
                continue;
            }
            if let Some(first) = owners.insert(id, name.clone()) {
                return Err(CacheError::Collision {
                    id,
                    first,
                    second: name,
                });
            }

            self.next_free = self.next_free.max(id + 1);
            self.ids.insert(name, id);
        }
        Ok(())
    }

    /// The cached ID for `name`, if one was ever assigned.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// The cached ID for `name`, assigning the next free one if it is new.
    ///
    /// # Errors
    /// [`CacheError::Exhausted`] once every 16 bit ID is in use.
    pub fn get_or_assign(&mut self, name: &str) -> Result<u32, CacheError> {
        if let Some(id) = self.get(name) {
            return Ok(id);
        }
        if self.next_free > MAX_BLOCK_ID {
            return Err(CacheError::Exhausted(name.to_string()));
        }

        let id = self.next_free;
        self.next_free += 1;
        self.ids.insert(name.to_string(), id);
        debug!("Assigned new block id {id} to {name}");
        Ok(id)
    }

    /// Number of names with an ID, air included.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`; air is permanently present.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// A copy with the same assignments and no backing file.
    pub fn detached(&self) -> Self {
        BlockIdCache {
            path: None,
            ..self.clone()
        }
    }

    /// Writes the mapping back to its file, creating parent folders as needed. Does nothing for
    /// an in-memory cache.
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let sorted: BTreeMap<&str, u32> = self
            .ids
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
            .collect();
        fs::write(path, serde_json::to_string_pretty(&sorted)?)?;
        debug!("Saved {} block ids to {}", sorted.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("voxel-pipeline-cache-{}", fastrand::u64(..)))
            .join("block_cache.json")
    }

    #[test]
    fn fresh_cache_reserves_zero_for_air() {
        let mut cache = BlockIdCache::in_memory();
        assert_eq!(cache.get_or_assign(AIR_NAME).unwrap(), 0);
        assert_eq!(cache.get_or_assign("crafter:stone").unwrap(), 1);
        assert_eq!(cache.get_or_assign("crafter:dirt").unwrap(), 2);
        assert_eq!(cache.get_or_assign("crafter:stone").unwrap(), 1);
    }

    #[test]
    fn next_id_follows_the_largest_cached_one() {
        let mut cache = BlockIdCache::from_json(r#"{"a": 3, "b": 10}"#).unwrap();
        assert_eq!(cache.get("a"), Some(3));
        assert_eq!(cache.get_or_assign("c").unwrap(), 11);
    }

    #[test]
    fn corrupt_values_are_rejected() {
        assert!(matches!(
            BlockIdCache::from_json(r#"{"a": 1.5}"#),
            Err(CacheError::NotInteger { .. })
        ));
        assert!(matches!(
            BlockIdCache::from_json(r#"{"a": -1}"#),
            Err(CacheError::NotInteger { .. })
        ));
        assert!(matches!(
            BlockIdCache::from_json(r#"{"a": "2"}"#),
            Err(CacheError::NotInteger { .. })
        ));
        assert!(matches!(
            BlockIdCache::from_json(r#"{"a": 70000}"#),
            Err(CacheError::IdOutOfRange { .. })
        ));
        assert!(matches!(
            BlockIdCache::from_json("[1, 2]"),
            Err(CacheError::NotAnObject)
        ));
    }

    #[test]
    fn colliding_ids_are_rejected() {
        assert!(matches!(
            BlockIdCache::from_json(r#"{"a": 4, "b": 4}"#),
            Err(CacheError::Collision { id: 4, .. })
        ));
        assert!(BlockIdCache::from_json(r#"{"a": 0}"#).is_err());
        assert!(matches!(
            BlockIdCache::from_json(r#"{"air": 2}"#),
            Err(CacheError::AirNotZero(2))
        ));
    }

    #[test]
    fn saved_ids_survive_a_reload() {
        let path = scratch_path();
        let mut cache = BlockIdCache::load(&path).unwrap();
        cache.get_or_assign("crafter:grass").unwrap();
        cache.get_or_assign("crafter:sand").unwrap();
        cache.save().unwrap();

        let mut reloaded = BlockIdCache::load(&path).unwrap();
        assert_eq!(reloaded.get("crafter:grass"), Some(1));
        assert_eq!(reloaded.get("crafter:sand"), Some(2));
        assert_eq!(reloaded.get_or_assign("crafter:ice").unwrap(), 3);

        if let Some(folder) = path.parent() {
            let _ = fs::remove_dir_all(folder);
        }
    }
}
