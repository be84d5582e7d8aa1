//! # Face Geometry Table
//!
//! Unit cube faces as four-vertex templates, keyed by face name. Stamping a face translates
//! its template by the cell offset, appends the block's UV quad for that face, and appends two
//! triangles `[0, 1, 2, 2, 3, 0]` offset by the current vertex count.
//!
//! Corner `i` of a template takes corner `i` of the block's UV quad for that face.

use phf::phf_map;

use cgmath::Point3;

use crate::engine_state::{
    error::RegistryError,
    voxels::block::{block_side::BlockSide, BlockDefinition},
};

use super::MeshBuffers;

/// Corner positions of each unit face, xyz per corner.
pub static FACE_TEMPLATES: phf::Map<&'static str, [f32; 12]> = phf_map! {
    "front" => [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    "back" => [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0],
    "left" => [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
    "right" => [1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
    "bottom" => [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    "top" => [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
};

/// Two triangles over the four face corners.
pub const FACE_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// Appends one face of `definition` at cell `offset`.
///
/// # Errors
/// [`RegistryError::MissingFace`] if the block has no UV quad for `side`. Validation at
/// registration should make that impossible, so hitting it means the registry is inconsistent.
pub fn attach_face(
    buffers: &mut MeshBuffers,
    side: BlockSide,
    definition: &BlockDefinition,
    offset: Point3<i32>,
) -> Result<(), RegistryError> {
    let missing_face = || RegistryError::MissingFace {
        name: definition.internal_name().to_string(),
        face: side.name(),
    };
    let template = FACE_TEMPLATES.get(side.name()).ok_or_else(missing_face)?;
    let quad = definition.face_uv(side).ok_or_else(missing_face)?;

    let base = buffers.vertex_count() as u32;
    for corner in template.chunks_exact(3) {
        buffers.positions.extend_from_slice(&[
            corner[0] + offset.x as f32,
            corner[1] + offset.y as f32,
            corner[2] + offset.z as f32,
        ]);
    }
    buffers.texture_coordinates.extend_from_slice(quad);
    buffers
        .indices
        .extend(FACE_INDICES.iter().map(|index| base + index));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{
        atlas::GridAtlas, id_cache::BlockIdCache, BlockRegistry,
    };

    fn registered_block() -> BlockDefinition {
        let atlas = GridAtlas::new(16, ["a.png"]);
        let mut registry = BlockRegistry::new(BlockIdCache::in_memory());
        let id = registry
            .register(BlockDefinition::new("test:a").with_textures(["a.png"; 6]).unwrap(), &atlas)
            .unwrap();
        registry.get_definition(id).unwrap().clone()
    }

    #[test]
    fn every_side_has_a_template_on_its_own_plane() {
        for side in BlockSide::all() {
            let template = FACE_TEMPLATES.get(side.name()).unwrap();
            let normal = side.offset();
            let (axis, value) = if normal.x != 0 {
                (0, normal.x)
            } else if normal.y != 0 {
                (1, normal.y)
            } else {
                (2, normal.z)
            };
            let plane: f32 = if value > 0 { 1.0 } else { 0.0 };
            for corner in template.chunks_exact(3) {
                assert_eq!(corner[axis], plane, "{} corner off its plane", side.name());
            }
        }
    }

    #[test]
    fn stamping_offsets_vertices_and_indices() {
        let block = registered_block();
        let mut buffers = MeshBuffers::default();
        attach_face(&mut buffers, BlockSide::TOP, &block, Point3::new(2, 5, 7)).unwrap();
        attach_face(&mut buffers, BlockSide::FRONT, &block, Point3::new(0, 0, 0)).unwrap();

        assert_eq!(buffers.vertex_count(), 8);
        assert_eq!(buffers.texture_coordinates.len(), 16);
        assert_eq!(buffers.indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert_eq!(&buffers.positions[..3], &[3.0f32, 6.0, 7.0]);
        assert_eq!(&buffers.positions[12..15], &[1.0f32, 1.0, 0.0]);
    }

    #[test]
    fn missing_uv_quads_are_consistency_errors() {
        let unregistered = BlockDefinition::new("test:raw");
        let mut buffers = MeshBuffers::default();
        assert!(matches!(
            attach_face(&mut buffers, BlockSide::LEFT, &unregistered, Point3::new(0, 0, 0)),
            Err(RegistryError::MissingFace { face: "left", .. })
        ));
        assert!(buffers.positions.is_empty());
    }
}
