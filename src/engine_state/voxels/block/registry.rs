//! # Block Registry Module
//!
//! The catalog of every block kind. It is filled once at startup on the main thread, then
//! locked. After locking, each worker thread takes its own [`BlockRegistry::thread_safe_duplicate`]
//! and reads from it for its whole lifetime without any synchronisation.
//!
//! ## Registration
//!
//! 1. The name must be new and the registry writable.
//! 2. An ID is taken from the [`BlockIdCache`] so it matches previous runs.
//! 3. Drawn blocks must carry six textures, each present in the atlas.
//! 4. The UV quad of every face is looked up and frozen into the definition.
//!
//! ## Duplicates
//!
//! A duplicate is a structural copy of the locked registry flagged read-only. Any attempt to
//! register into it or lock it again fails.

use std::collections::HashMap;

use log::{debug, info};

use crate::engine_state::error::RegistryError;

use super::{
    atlas::TextureAtlas,
    block_side::BlockSide,
    definition::{BlockDefinition, AIR_NAME},
    draw_type::DrawType,
    id_cache::BlockIdCache,
};

/// Name and ID indexed catalog of block definitions.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    definitions: HashMap<u32, BlockDefinition>,
    ids_by_name: HashMap<String, u32>,
    cache: BlockIdCache,
    locked: bool,
    duplicate: bool,
}

impl BlockRegistry {
    /// Creates an empty, writable registry that draws IDs from `cache`.
    pub fn new(cache: BlockIdCache) -> Self {
        BlockRegistry {
            definitions: HashMap::new(),
            ids_by_name: HashMap::new(),
            cache,
            locked: false,
            duplicate: false,
        }
    }

    /// Registers a block and returns its ID.
    ///
    /// # Errors
    /// Fails if the registry is locked or a duplicate, the name or ID is taken, textures are
    /// missing or unknown to `atlas`, or the cache cannot hand out an ID.
    pub fn register(
        &mut self,
        mut definition: BlockDefinition,
        atlas: &dyn TextureAtlas,
    ) -> Result<u32, RegistryError> {
        if self.duplicate {
            return Err(RegistryError::ReadOnlyDuplicate);
        }
        let name = definition.internal_name().to_string();
        if self.locked {
            return Err(RegistryError::Locked(name));
        }
        if self.ids_by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if name == AIR_NAME && definition.draw_type() != DrawType::AIR {
            return Err(RegistryError::InvalidProperty {
                name,
                property: "draw_type",
                value: definition.draw_type() as i64,
                range: "AIR",
            });
        }

        let id = self.cache.get_or_assign(&name)?;
        if let Some(existing) = self.definitions.get(&id) {
            return Err(RegistryError::DuplicateId {
                id,
                name,
                existing: existing.internal_name().to_string(),
            });
        }

        if definition.draw_type() != DrawType::AIR {
            Self::attach_faces(&mut definition, atlas)?;
        }
        definition.set_id(id);

        debug!("Registered block {name} with id {id}");
        self.ids_by_name.insert(name, id);
        self.definitions.insert(id, definition);
        Ok(id)
    }

    fn attach_faces(
        definition: &mut BlockDefinition,
        atlas: &dyn TextureAtlas,
    ) -> Result<(), RegistryError> {
        let textures = definition
            .textures()
            .cloned()
            .ok_or_else(|| RegistryError::MissingTextures(definition.internal_name().to_string()))?;

        for side in BlockSide::all() {
            let texture = &textures[side as usize];
            let quad = atlas
                .uv_quad(texture)
                .filter(|_| atlas.file_name_exists(texture))
                .ok_or_else(|| RegistryError::MissingTexture {
                    name: definition.internal_name().to_string(),
                    texture: texture.clone(),
                })?;
            definition.set_face_uv(side, quad);
        }
        Ok(())
    }

    /// Forbids further registration and persists the ID cache. Air is added first if it was
    /// never registered explicitly. Locking twice is a no-op.
    pub fn lock(&mut self) -> Result<(), RegistryError> {
        if self.duplicate {
            return Err(RegistryError::ReadOnlyDuplicate);
        }
        if self.locked {
            return Ok(());
        }
        if !self.ids_by_name.contains_key(AIR_NAME) {
            let mut air = BlockDefinition::air();
            air.set_id(0);
            self.ids_by_name.insert(AIR_NAME.to_string(), 0);
            self.definitions.insert(0, air);
        }

        self.cache.save()?;
        self.locked = true;
        info!(
            "Block registry locked with {} blocks: {:?}",
            self.definitions.len(),
            self.all_block_names()
        );
        Ok(())
    }

    /// A read-only structural copy for a worker thread.
    ///
    /// # Errors
    /// [`RegistryError::NotLocked`] before [`lock`](Self::lock).
    pub fn thread_safe_duplicate(&self) -> Result<BlockRegistry, RegistryError> {
        if !self.locked {
            return Err(RegistryError::NotLocked);
        }
        Ok(BlockRegistry {
            definitions: self.definitions.clone(),
            ids_by_name: self.ids_by_name.clone(),
            cache: self.cache.detached(),
            locked: true,
            duplicate: true,
        })
    }

    /// Looks a definition up by ID.
    pub fn get_definition(&self, id: u32) -> Result<&BlockDefinition, RegistryError> {
        self.definitions.get(&id).ok_or(RegistryError::MissingId(id))
    }

    /// Looks a definition up by internal name.
    pub fn get_definition_by_name(&self, name: &str) -> Result<&BlockDefinition, RegistryError> {
        let id = self.get_id(name)?;
        self.get_definition(id)
    }

    /// ID registered for `name`.
    pub fn get_id(&self, name: &str) -> Result<u32, RegistryError> {
        self.ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::MissingName(name.to_string()))
    }

    /// `true` if `name` is registered.
    pub fn contains_name(&self, name: &str) -> bool {
        self.ids_by_name.contains_key(name)
    }

    /// Every registered name, ordered by ID.
    pub fn all_block_names(&self) -> Vec<&str> {
        let mut entries: Vec<_> = self.definitions.iter().collect();
        entries.sort_by_key(|(id, _)| **id);
        entries
            .into_iter()
            .map(|(_, definition)| definition.internal_name())
            .collect()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// `true` once [`lock`](Self::lock) succeeded.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// `true` for copies made by [`thread_safe_duplicate`](Self::thread_safe_duplicate).
    pub fn is_duplicate(&self) -> bool {
        self.duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::atlas::GridAtlas;

    fn atlas() -> GridAtlas {
        GridAtlas::new(16, ["stone.png", "dirt.png"])
    }

    fn stone() -> BlockDefinition {
        BlockDefinition::new("game:stone")
            .with_textures(["stone.png"; 6])
            .unwrap()
    }

    #[test]
    fn air_then_stone_gives_stone_the_first_id() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());

        assert_eq!(registry.register(BlockDefinition::air(), &atlas).unwrap(), 0);
        assert_eq!(registry.register(stone(), &atlas).unwrap(), 1);
        assert!(matches!(
            registry.register(stone(), &atlas),
            Err(RegistryError::DuplicateName(name)) if name == "game:stone"
        ));
    }

    #[test]
    fn faces_receive_their_atlas_quads() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());
        let definition = BlockDefinition::new("game:mixed")
            .with_textures(["stone.png", "stone.png", "stone.png", "stone.png", "dirt.png", "stone.png"])
            .unwrap();
        let id = registry.register(definition, &atlas).unwrap();

        let stored = registry.get_definition(id).unwrap();
        assert_eq!(stored.id(), id);
        assert_eq!(stored.face_uv(BlockSide::BOTTOM), atlas.uv_quad("dirt.png").as_ref());
        assert_eq!(stored.face_uv(BlockSide::TOP), atlas.uv_quad("stone.png").as_ref());
    }

    #[test]
    fn drawn_blocks_need_known_textures() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());

        assert!(matches!(
            registry.register(BlockDefinition::new("game:bare"), &atlas),
            Err(RegistryError::MissingTextures(_))
        ));

        let unknown = BlockDefinition::new("game:gold")
            .with_textures(["gold.png"; 6])
            .unwrap();
        assert!(matches!(
            registry.register(unknown, &atlas),
            Err(RegistryError::MissingTexture { texture, .. }) if texture == "gold.png"
        ));
    }

    #[test]
    fn cached_ids_are_reused() {
        let atlas = atlas();
        let cache = BlockIdCache::from_json(r#"{"game:dirt": 1, "game:stone": 7}"#).unwrap();
        let mut registry = BlockRegistry::new(cache);

        assert_eq!(registry.register(stone(), &atlas).unwrap(), 7);
        let glass = BlockDefinition::new("game:glass")
            .with_textures(["dirt.png"; 6])
            .unwrap()
            .with_draw_type(DrawType::GLASS);
        assert_eq!(registry.register(glass, &atlas).unwrap(), 8);
    }

    #[test]
    fn air_must_keep_the_air_draw_type() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());
        let solid_air = BlockDefinition::new(AIR_NAME)
            .with_textures(["stone.png"; 6])
            .unwrap();
        assert!(matches!(
            registry.register(solid_air, &atlas),
            Err(RegistryError::InvalidProperty { property: "draw_type", .. })
        ));
    }

    #[test]
    fn locking_adds_air_and_stops_registration() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());
        registry.register(stone(), &atlas).unwrap();
        registry.lock().unwrap();

        assert_eq!(registry.get_definition(0).unwrap().draw_type(), DrawType::AIR);
        assert_eq!(registry.all_block_names(), vec!["air", "game:stone"]);
        assert!(matches!(
            registry.register(BlockDefinition::new("game:late"), &atlas),
            Err(RegistryError::Locked(_))
        ));
    }

    #[test]
    fn duplicates_require_a_lock_and_are_read_only() {
        let atlas = atlas();
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());
        registry.register(stone(), &atlas).unwrap();
        assert!(matches!(
            registry.thread_safe_duplicate(),
            Err(RegistryError::NotLocked)
        ));

        registry.lock().unwrap();
        let mut duplicate = registry.thread_safe_duplicate().unwrap();
        assert!(duplicate.is_duplicate());
        assert_eq!(
            duplicate.get_definition_by_name("game:stone").unwrap(),
            registry.get_definition_by_name("game:stone").unwrap()
        );
        assert!(matches!(
            duplicate.register(BlockDefinition::air(), &atlas),
            Err(RegistryError::ReadOnlyDuplicate)
        ));
        assert!(duplicate.lock().is_err());
    }

    #[test]
    fn lookups_fail_for_unknown_blocks() {
        let registry = BlockRegistry::new(BlockIdCache::in_memory());
        assert!(matches!(registry.get_definition(7), Err(RegistryError::MissingId(7))));
        assert!(matches!(
            registry.get_definition_by_name("game:none"),
            Err(RegistryError::MissingName(_))
        ));
    }
}
