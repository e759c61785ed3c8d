pub mod bounding_box;
pub mod bvh;
pub mod color;
pub mod config;
pub mod draw;
pub mod esp;
pub mod game;
pub mod game_data;
pub mod math;
pub mod sim;
pub mod tracked;
