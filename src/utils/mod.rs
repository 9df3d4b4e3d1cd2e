pub mod bounds;
pub mod math;
