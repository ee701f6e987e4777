pub mod event;
pub mod room;
pub mod step;
pub mod world;
