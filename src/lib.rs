pub mod app;
pub mod assets;
pub mod config;
pub mod controls;
pub mod objects;
pub mod picking;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod utils;
