//! # Draw Type Module
//!
//! The rendering category of a block. Only [`DrawType::AIR`] and [`DrawType::BLOCK`] take part
//! in face culling today; the remaining variants are accepted by the registry but produce no
//! geometry yet.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::engine_state::error::RegistryError;

/// Rendering category of a block.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum DrawType {
    /// Invisible and never solid.
    AIR = 0,
    /// Opaque unit cube.
    #[default]
    BLOCK = 1,
    /// Cube made of one or more sub-boxes.
    BLOCK_BOX = 2,
    /// Torch model.
    TORCH = 3,
    /// Full liquid cell.
    LIQUID_SOURCE = 4,
    /// Partially filled flowing liquid cell.
    LIQUID_FLOW = 5,
    /// Transparent cube.
    GLASS = 6,
    /// Crossed plant quads.
    PLANT = 7,
    /// Cube with alpha tested textures.
    LEAVES = 8,
}

impl DrawType {
    /// Converts the integer form used by block definition data.
    ///
    /// # Errors
    /// [`RegistryError::InvalidDrawType`] if the value names no draw type.
    pub fn from_value(value: i32) -> Result<Self, RegistryError> {
        <DrawType as FromPrimitive>::from_i32(value).ok_or(RegistryError::InvalidDrawType(value))
    }

    /// `true` for draw types that fully hide the faces of their neighbours.
    pub fn is_opaque_cube(self) -> bool {
        self == DrawType::BLOCK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_values_map_to_draw_types() {
        assert_eq!(DrawType::from_value(0).unwrap(), DrawType::AIR);
        assert_eq!(DrawType::from_value(4).unwrap(), DrawType::LIQUID_SOURCE);
        assert_eq!(DrawType::from_value(8).unwrap(), DrawType::LEAVES);
        assert!(matches!(
            DrawType::from_value(9),
            Err(RegistryError::InvalidDrawType(9))
        ));
        assert!(DrawType::from_value(-1).is_err());
    }
}
