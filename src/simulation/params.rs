//! Runtime parameters for a run
//!
//! `Parameters` holds:
//! - the frame timestep and frame count,
//! - the seed that keys every random stream of the run

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub dt: f64, // frame timestep, Myr
    pub frames: usize, // number of frames to run
    pub seed: u64, // deterministic seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 0.025,
            frames: 200,
            seed: 42,
        }
    }
}
