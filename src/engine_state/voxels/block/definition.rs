//! # Block Definition Module
//!
//! A [`BlockDefinition`] is assembled with chained setters, then handed to the
//! [`BlockRegistry`](super::registry::BlockRegistry), which assigns its ID and attaches one UV
//! quad per face from the texture atlas.
//!
//! ```
//! use voxel_pipeline::engine_state::voxels::block::{definition::BlockDefinition, draw_type::DrawType};
//!
//! let glass = BlockDefinition::new("crafter:glass")
//!     .with_readable_name("Glass")
//!     .with_textures(["glass.png"; 6])
//!     .unwrap()
//!     .with_draw_type(DrawType::GLASS)
//!     .with_light(4)
//!     .unwrap();
//! assert_eq!(glass.internal_name(), "crafter:glass");
//! ```

use std::collections::HashMap;

use crate::engine_state::error::RegistryError;

use super::{block_side::BlockSide, draw_type::DrawType};

/// Static description of one kind of block.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDefinition {
    internal_name: String,
    readable_name: String,
    id: u32,
    textures: Option<[String; 6]>,
    draw_type: DrawType,
    walkable: bool,
    liquid: bool,
    liquid_flow: Option<u8>,
    liquid_viscosity: Option<u8>,
    climbable: bool,
    sneak_jump_climbable: bool,
    falling: bool,
    clear: bool,
    damage_per_second: Option<u32>,
    light: Option<u8>,
    face_uvs: HashMap<BlockSide, [f32; 8]>,
}

impl BlockDefinition {
    /// Starts a definition with defaults: drawn as [`DrawType::BLOCK`], walkable, no textures.
    pub fn new(internal_name: impl Into<String>) -> Self {
        let internal_name = internal_name.into();
        BlockDefinition {
            readable_name: internal_name.clone(),
            internal_name,
            id: 0,
            textures: None,
            draw_type: DrawType::BLOCK,
            walkable: true,
            liquid: false,
            liquid_flow: None,
            liquid_viscosity: None,
            climbable: false,
            sneak_jump_climbable: false,
            falling: false,
            clear: false,
            damage_per_second: None,
            light: None,
            face_uvs: HashMap::new(),
        }
    }

    /// The always present empty block.
    pub fn air() -> Self {
        BlockDefinition::new(AIR_NAME)
            .with_readable_name("Air")
            .with_draw_type(DrawType::AIR)
            .with_walkable(false)
    }

    /// Display name.
    pub fn with_readable_name(mut self, readable_name: impl Into<String>) -> Self {
        self.readable_name = readable_name.into();
        self
    }

    /// Assigns one texture per face in the order front, back, left, right, bottom, top.
    ///
    /// # Errors
    /// [`RegistryError::TexturesAlreadySet`] on a second call, [`RegistryError::TextureCount`]
    /// unless exactly six textures are given.
    pub fn with_textures<I, S>(mut self, textures: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.textures.is_some() {
            return Err(RegistryError::TexturesAlreadySet(self.internal_name));
        }
        let textures: Vec<String> = textures.into_iter().map(Into::into).collect();
        let count = textures.len();
        let textures: [String; 6] = textures.try_into().map_err(|_| RegistryError::TextureCount {
            name: self.internal_name.clone(),
            count,
        })?;
        self.textures = Some(textures);
        Ok(self)
    }

    /// Rendering category.
    pub fn with_draw_type(mut self, draw_type: DrawType) -> Self {
        self.draw_type = draw_type;
        self
    }

    /// Whether entities collide with this block.
    pub fn with_walkable(mut self, walkable: bool) -> Self {
        self.walkable = walkable;
        self
    }

    /// Marks the block as a liquid.
    pub fn with_liquid(mut self, liquid: bool) -> Self {
        self.liquid = liquid;
        self
    }

    /// How far the liquid spreads, `1..=8`.
    pub fn with_liquid_flow(mut self, flow: i64) -> Result<Self, RegistryError> {
        self.liquid_flow = Some(self.ranged("liquid_flow", flow, 1, 8, "1..=8")? as u8);
        Ok(self)
    }

    /// How slowly the liquid spreads, `1..=8`.
    pub fn with_liquid_viscosity(mut self, viscosity: i64) -> Result<Self, RegistryError> {
        self.liquid_viscosity = Some(self.ranged("liquid_viscosity", viscosity, 1, 8, "1..=8")? as u8);
        Ok(self)
    }

    /// Whether entities can climb the block.
    pub fn with_climbable(mut self, climbable: bool) -> Self {
        self.climbable = climbable;
        self
    }

    /// Whether sneaking and jumping climbs the block.
    pub fn with_sneak_jump_climbable(mut self, sneak_jump_climbable: bool) -> Self {
        self.sneak_jump_climbable = sneak_jump_climbable;
        self
    }

    /// Whether the block falls when unsupported.
    pub fn with_falling(mut self, falling: bool) -> Self {
        self.falling = falling;
        self
    }

    /// Whether light passes through the block.
    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Damage dealt per second to entities inside the block, must be positive.
    pub fn with_damage_per_second(mut self, damage: i64) -> Result<Self, RegistryError> {
        self.damage_per_second =
            Some(self.ranged("damage_per_second", damage, 1, u32::MAX as i64, "1..")? as u32);
        Ok(self)
    }

    /// Light emitted by the block, `1..=15`.
    pub fn with_light(mut self, light: i64) -> Result<Self, RegistryError> {
        self.light = Some(self.ranged("light", light, 1, 15, "1..=15")? as u8);
        Ok(self)
    }

    fn ranged(
        &self,
        property: &'static str,
        value: i64,
        min: i64,
        max: i64,
        range: &'static str,
    ) -> Result<i64, RegistryError> {
        if value < min || value > max {
            return Err(RegistryError::InvalidProperty {
                name: self.internal_name.clone(),
                property,
                value,
                range,
            });
        }
        Ok(value)
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub(crate) fn set_face_uv(&mut self, side: BlockSide, quad: [f32; 8]) {
        self.face_uvs.insert(side, quad);
    }

    /// Unique namespaced name, e.g. `crafter:stone`.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Display name.
    pub fn readable_name(&self) -> &str {
        &self.readable_name
    }

    /// Registry ID. Zero until registered (and for air).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Texture names in face order, if any were set.
    pub fn textures(&self) -> Option<&[String; 6]> {
        self.textures.as_ref()
    }

    /// Texture assigned to one face.
    pub fn texture_for(&self, side: BlockSide) -> Option<&str> {
        self.textures
            .as_ref()
            .map(|textures| textures[side as usize].as_str())
    }

    /// Rendering category.
    pub fn draw_type(&self) -> DrawType {
        self.draw_type
    }

    /// Whether entities collide with the block.
    pub fn is_walkable(&self) -> bool {
        self.walkable
    }

    /// Whether the block is a liquid.
    pub fn is_liquid(&self) -> bool {
        self.liquid
    }

    /// Liquid spread distance.
    pub fn liquid_flow(&self) -> Option<u8> {
        self.liquid_flow
    }

    /// Liquid viscosity.
    pub fn liquid_viscosity(&self) -> Option<u8> {
        self.liquid_viscosity
    }

    /// Whether entities can climb the block.
    pub fn is_climbable(&self) -> bool {
        self.climbable
    }

    /// Whether sneak-jumping climbs the block.
    pub fn is_sneak_jump_climbable(&self) -> bool {
        self.sneak_jump_climbable
    }

    /// Whether the block falls when unsupported.
    pub fn is_falling(&self) -> bool {
        self.falling
    }

    /// Whether light passes through the block.
    pub fn is_clear(&self) -> bool {
        self.clear
    }

    /// Damage per second dealt to entities inside.
    pub fn damage_per_second(&self) -> Option<u32> {
        self.damage_per_second
    }

    /// Emitted light level.
    pub fn light(&self) -> Option<u8> {
        self.light
    }

    /// UV quad attached to one face at registration.
    pub fn face_uv(&self, side: BlockSide) -> Option<&[f32; 8]> {
        self.face_uvs.get(&side)
    }
}

/// Internal name of the empty block, always ID 0.
pub const AIR_NAME: &str = "air";
