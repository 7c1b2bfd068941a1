pub mod constants;
pub mod error;
pub mod sampling;
pub mod states;
pub mod gas;
pub mod generation;
pub mod params;
pub mod stepper;
pub mod scenario;
pub mod engine;
