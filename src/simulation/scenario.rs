//! Build a fully-initialized simulation scenario from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario`, which owns:
//! - run parameters (`Parameters`)
//! - the star population and the gas field, freshly generated
//! - the step random stream
//! - the index of the next frame
//!
//! The frame driver and the interactive viewer both advance the scenario
//! through [`Scenario::advance`].

use bevy::prelude::Resource;
use log::info;
use rand_chacha::ChaChaRng;

use crate::configuration::config::ScenarioConfig;
use crate::simulation::constants::STEP_STREAM;
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::gas::GasField;
use crate::simulation::generation::stream_rng;
use crate::simulation::params::Parameters;
use crate::simulation::states::StarPopulation;
use crate::simulation::stepper::{step, Flash};

/// What one frame produced
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub index: usize,
    pub flashes: Option<Vec<Flash>>,
}

#[derive(Resource)]
pub struct Scenario {
    pub parameters: Parameters,
    pub stars: StarPopulation,
    pub gas: GasField,
    pub rng: ChaChaRng,
    pub frame: usize,
}

impl Scenario {
    pub fn build_scenario(cfg: &ScenarioConfig) -> SimResult<Self> {
        if !(cfg.run.dt_myr > 0.0 && cfg.run.dt_myr.is_finite()) {
            return Err(SimError::InvalidTimestep(cfg.run.dt_myr));
        }

        // Generation: a random seed is fixed here so the step stream can share it
        let mut ic = cfg.initial_conditions();
        let seed = *ic.seed.get_or_insert_with(rand::random::<u64>);
        let (stars, gas) = ic.generate()?;

        let parameters = cfg.parameters(seed);

        info!(
            "scenario ready: {} frames at dt = {} Myr",
            parameters.frames, parameters.dt
        );

        Ok(Self::from_parts(parameters, stars, gas))
    }

    /// Assemble a scenario around existing state; the step stream is keyed on
    /// `parameters.seed`
    pub fn from_parts(parameters: Parameters, stars: StarPopulation, gas: GasField) -> Self {
        let rng = stream_rng(parameters.seed, STEP_STREAM);
        Self {
            parameters,
            stars,
            gas,
            rng,
            frame: 0,
        }
    }

    /// Run one frame with the configured timestep
    pub fn advance(&mut self) -> SimResult<FrameOutput> {
        let flashes = step(&mut self.stars, &mut self.gas, self.parameters.dt, &mut self.rng)?;
        let index = self.frame;
        self.frame += 1;
        Ok(FrameOutput { index, flashes })
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.parameters.frames
    }
}
