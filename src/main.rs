//! # Voxel World Driver
//!
//! Headless entry point: builds a world, walks a viewer across it and logs
//! what was meshed and drawn.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json 600
//! ```

fn main() {
    voxel_world::run();
}
