//! Palette compaction for indexed bitmaps and generation of a TypeScript
//! table embedding the resulting PNGs as data URIs.

pub mod cli;
pub mod error;
pub mod image;
pub mod palette;
pub mod pipeline;
pub mod resources;

pub use error::{Error, Result};
pub use crate::image::{IndexedImage, Rgb};
pub use palette::compact;
pub use resources::{generate, ResourceEntry, TableConfig};
