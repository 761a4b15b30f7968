pub mod grid;
pub mod runner;

pub use grid::{GridPoint, SensitivityGrid};
pub use runner::{evaluate_point, run_sensitivity, SensitivityOutput, SensitivityRow};
