pub mod geometry;
pub mod obstacles;
pub mod player;
pub mod sprite;
