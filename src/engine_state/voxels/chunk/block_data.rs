//! # Block Data
//!
//! A single chunk cell packed into one 32 bit word:
//!
//! ```text
//!  31              16 15    12 11     8 7          0
//! +------------------+--------+--------+------------+
//! |     block id     | light  | state  |  reserved  |
//! +------------------+--------+--------+------------+
//! ```
//!
//! Setting any field decodes the other two from the current word and recombines all three, so
//! fields never bleed into each other and the order of set calls does not matter. The reserved
//! low byte is always written as zero.

use bytemuck::{Pod, Zeroable};

use crate::engine_state::error::ChunkError;

const ID_SHIFT: u32 = 16;
const LIGHT_SHIFT: u32 = 12;
const STATE_SHIFT: u32 = 8;
const NIBBLE_MASK: u32 = 0xF;

/// Largest block ID the 16 bit field can hold.
pub const MAX_BLOCK_ID: u32 = 0xFFFF;
/// Largest light level.
pub const MAX_LIGHT: u32 = 15;
/// Largest block state.
pub const MAX_STATE: u32 = 15;

/// One packed chunk cell.
///
/// `#[repr(transparent)]` over `u32` lets a whole chunk be viewed as raw words without copying.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct BlockData(u32);

impl BlockData {
    /// The empty cell: ID 0, no light, state 0.
    pub const AIR: BlockData = BlockData(0);

    /// Packs the three fields into a new word.
    ///
    /// # Errors
    /// [`ChunkError::FieldOverflow`] if any field exceeds its width.
    pub fn new(id: u32, light: u32, state: u32) -> Result<Self, ChunkError> {
        check_field("id", id, MAX_BLOCK_ID)?;
        check_field("light", light, MAX_LIGHT)?;
        check_field("state", state, MAX_STATE)?;
        Ok(Self::combine(id, light, state))
    }

    /// A cell holding `id` with zero light and state.
    pub fn from_id(id: u32) -> Result<Self, ChunkError> {
        Self::new(id, 0, 0)
    }

    /// Wraps a raw word as-is, reserved bits included.
    pub const fn from_raw(word: u32) -> Self {
        BlockData(word)
    }

    /// The raw 32 bit word.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Block ID, the top 16 bits.
    pub const fn id(self) -> u32 {
        self.0 >> ID_SHIFT
    }

    /// Light level, bits 15-12.
    pub const fn light(self) -> u32 {
        (self.0 >> LIGHT_SHIFT) & NIBBLE_MASK
    }

    /// Block state, bits 11-8.
    pub const fn state(self) -> u32 {
        (self.0 >> STATE_SHIFT) & NIBBLE_MASK
    }

    /// `true` when the ID is 0.
    pub const fn is_air(self) -> bool {
        self.id() == 0
    }

    /// Returns a copy with the ID replaced.
    pub fn with_id(self, id: u32) -> Result<Self, ChunkError> {
        check_field("id", id, MAX_BLOCK_ID)?;
        Ok(Self::combine(id, self.light(), self.state()))
    }

    /// Returns a copy with the light level replaced.
    pub fn with_light(self, light: u32) -> Result<Self, ChunkError> {
        check_field("light", light, MAX_LIGHT)?;
        Ok(Self::combine(self.id(), light, self.state()))
    }

    /// Returns a copy with the state replaced.
    pub fn with_state(self, state: u32) -> Result<Self, ChunkError> {
        check_field("state", state, MAX_STATE)?;
        Ok(Self::combine(self.id(), self.light(), state))
    }

    const fn combine(id: u32, light: u32, state: u32) -> Self {
        BlockData((id << ID_SHIFT) | (light << LIGHT_SHIFT) | (state << STATE_SHIFT))
    }
}

fn check_field(field: &'static str, value: u32, max: u32) -> Result<(), ChunkError> {
    if value > max {
        return Err(ChunkError::FieldOverflow { field, value, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_decode_from_fixed_offsets() {
        let data = BlockData::from_raw(0xABCD_7500);
        assert_eq!(data.id(), 0xABCD);
        assert_eq!(data.light(), 7);
        assert_eq!(data.state(), 5);
    }

    #[test]
    fn setting_one_field_leaves_the_others_untouched() {
        for _ in 0..2000 {
            let id = fastrand::u32(0..=MAX_BLOCK_ID);
            let light = fastrand::u32(0..=MAX_LIGHT);
            let state = fastrand::u32(0..=MAX_STATE);
            let start = BlockData::from_raw(fastrand::u32(..));

            let a = start
                .with_id(id)
                .and_then(|d| d.with_light(light))
                .and_then(|d| d.with_state(state))
                .unwrap();
            let b = start
                .with_state(state)
                .and_then(|d| d.with_id(id))
                .and_then(|d| d.with_light(light))
                .unwrap();

            assert_eq!(a, b);
            assert_eq!((a.id(), a.light(), a.state()), (id, light, state));
        }
    }

    #[test]
    fn re_encoding_the_same_values_is_a_fixpoint() {
        for _ in 0..2000 {
            let data = BlockData::new(
                fastrand::u32(0..=MAX_BLOCK_ID),
                fastrand::u32(0..=MAX_LIGHT),
                fastrand::u32(0..=MAX_STATE),
            )
            .unwrap();
            let again = data
                .with_id(data.id())
                .and_then(|d| d.with_light(data.light()))
                .and_then(|d| d.with_state(data.state()))
                .unwrap();
            assert_eq!(data, again);
        }
    }

    #[test]
    fn reserved_byte_is_cleared_on_write() {
        let data = BlockData::from_raw(0x0001_00FF).with_light(3).unwrap();
        assert_eq!(data.raw() & 0xFF, 0);
        assert_eq!(data.id(), 1);
    }

    #[test]
    fn oversized_fields_are_rejected() {
        assert!(matches!(
            BlockData::AIR.with_light(16),
            Err(ChunkError::FieldOverflow { field: "light", .. })
        ));
        assert!(BlockData::AIR.with_state(16).is_err());
        assert!(BlockData::AIR.with_id(MAX_BLOCK_ID + 1).is_err());
        assert_eq!(BlockData::AIR.with_id(MAX_BLOCK_ID).unwrap().id(), MAX_BLOCK_ID);
    }
}
