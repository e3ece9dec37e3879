pub mod geometry;
pub mod settings;
pub mod state;
