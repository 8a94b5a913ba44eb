//! Diamond-square heightmap generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod engine;
pub mod error;
pub mod export;
pub mod params;
pub mod tilemap;

pub use engine::{DiamondSquare, HeightRange};
pub use error::ConfigError;
pub use params::{DiamondSquareParams, TerrainPreset};
pub use tilemap::Tilemap;
