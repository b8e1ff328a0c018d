mod dirty;
mod grid;
mod rect;

pub use dirty::DirtyTiles;
pub use grid::{LengthMismatch, TileGrid};
pub use rect::Rect;
