//! # Voxel Pipeline Demo
//!
//! Runs the chunk pipeline headless around the origin and logs what it produced.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use std::{env, process};

fn main() {
    let config_path = env::args().nth(1);
    if let Err(error) = voxel_pipeline::run(config_path.as_deref()) {
        log::error!("{error}");
        process::exit(1);
    }
}
