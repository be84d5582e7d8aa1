//! # Texture Atlas Module
//!
//! The registry only needs two things from the texture subsystem: whether a texture file was
//! packed, and where it ended up. [`TextureAtlas`] captures that seam. [`GridAtlas`] is a
//! simple implementation that places equally sized tiles on a square grid, which is all the
//! headless pipeline needs.
//!
//! UV quads are eight floats in OpenGL normalised space, corner order top-left, bottom-left,
//! bottom-right, top-right:
//!
//! ```text
//! [x, y,  x, y + h,  x + w, y + h,  x + w, y]
//! ```

use std::collections::HashMap;

use log::warn;

/// A locked, packed texture atlas.
pub trait TextureAtlas {
    /// `true` if `file_name` was packed into the atlas.
    fn file_name_exists(&self, file_name: &str) -> bool;

    /// The UV quad of `file_name`, or `None` if it was never packed.
    fn uv_quad(&self, file_name: &str) -> Option<[f32; 8]>;
}

/// Square grid of equally sized tiles, filled row by row in insertion order.
#[derive(Clone, Debug)]
pub struct GridAtlas {
    tile_size: u32,
    tiles_per_row: u32,
    slots: HashMap<String, u32>,
}

impl GridAtlas {
    /// Packs the given texture names. Repeated names keep their first slot.
    pub fn new<I, S>(tile_size: u32, file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots = HashMap::new();
        for file_name in file_names {
            let file_name = file_name.into();
            let next = slots.len() as u32;
            if slots.contains_key(&file_name) {
                warn!("Texture {file_name} was packed twice, keeping the first copy");
                continue;
            }
            slots.insert(file_name, next);
        }

        let tiles_per_row = (slots.len() as f64).sqrt().ceil().max(1.0) as u32;
        GridAtlas {
            tile_size,
            tiles_per_row,
            slots,
        }
    }

    /// Side length of the atlas image in pixels.
    pub fn pixel_size(&self) -> u32 {
        self.tile_size * self.tiles_per_row
    }

    /// Number of packed textures.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` if nothing was packed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl TextureAtlas for GridAtlas {
    fn file_name_exists(&self, file_name: &str) -> bool {
        self.slots.contains_key(file_name)
    }

    fn uv_quad(&self, file_name: &str) -> Option<[f32; 8]> {
        let slot = *self.slots.get(file_name)?;
        let span = 1.0 / self.tiles_per_row as f32;
        let x = (slot % self.tiles_per_row) as f32 * span;
        let y = (slot / self.tiles_per_row) as f32 * span;

        Some([x, y, x, y + span, x + span, y + span, x + span, y])
    }
}
