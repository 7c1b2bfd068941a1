pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{Star, StarPopulation, SupernovaPhase, NVec2, NVec3};
pub use simulation::gas::GasField;
pub use simulation::error::{SimError, SimResult};
pub use simulation::generation::{generate_initial_conditions, InitialConditions};
pub use simulation::stepper::{step, Flash};
pub use simulation::scenario::{Scenario, FrameOutput};
pub use simulation::engine::{run_frames, EngineError, RunSummary};
pub use simulation::constants::V_CIRC;

pub use configuration::config::{GenerationConfig, RunConfig, OutputConfig, ScenarioConfig};

pub use visualization::renderer::{FrameRenderer, FrameView, NullRenderer, RenderError};
pub use visualization::frame_png::PngFrameRenderer;
pub use visualization::galsim_vis2d::run_2d;

pub use benchmark::benchmark::{bench_step, bench_rotation, bench_step_curve};
