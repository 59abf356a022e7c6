pub mod dig;
pub mod event;
pub mod level;
pub mod maze;
pub mod portal;
pub mod step;
pub mod world;
