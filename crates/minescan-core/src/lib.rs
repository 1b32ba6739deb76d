pub mod board;
pub mod difficulty;
pub mod grid;

pub use board::BoardDescriptor;
pub use difficulty::Difficulty;
pub use grid::{GridGeometry, GridSquare};
