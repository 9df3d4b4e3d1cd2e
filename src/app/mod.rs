// egui front end: state, panels and viewport input
pub mod input;
pub mod state;
pub mod ui;

pub use state::{AppError, ShapeGardenApp};
