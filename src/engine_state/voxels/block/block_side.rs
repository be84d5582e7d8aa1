//! # Block Side Module
//!
//! The six faces of a voxel block. The coordinate system is right handed with -Z as "front".

use cgmath::Vector3;

/// One of the six faces of a voxel block.
///
/// Discriminants follow the order in which a block definition lists its textures:
/// front, back, left, right, bottom, top.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Faces -Z.
    FRONT = 0,

    /// Faces +Z.
    BACK = 1,

    /// Faces -X.
    LEFT = 2,

    /// Faces +X.
    RIGHT = 3,

    /// Faces -Y.
    BOTTOM = 4,

    /// Faces +Y.
    TOP = 5,
}

impl BlockSide {
    /// All six faces in texture order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::BOTTOM,
            BlockSide::TOP,
        ]
    }

    /// Lowercase face name, used as the key for face templates and UV quads.
    pub fn name(self) -> &'static str {
        match self {
            BlockSide::FRONT => "front",
            BlockSide::BACK => "back",
            BlockSide::LEFT => "left",
            BlockSide::RIGHT => "right",
            BlockSide::BOTTOM => "bottom",
            BlockSide::TOP => "top",
        }
    }

    /// Unit step from a cell to the neighbour this face touches.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, -1),
            BlockSide::BACK => Vector3::new(0, 0, 1),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
        }
    }
}
