//! Configuration types for loading a run from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! run. A scenario consists of:
//!
//! - [`GenerationConfig`]: initial-condition settings (counts, domain, seed)
//! - [`RunConfig`]: frame count and timestep
//! - [`OutputConfig`]: where and how frames are rendered
//! - [`ScenarioConfig`]: top-level wrapper used to load a scenario from YAML
//!
//! Every field has a default, so a partial file (or an empty one) is valid.
//!
//! # YAML format
//!
//! ```yaml
//! generation:
//!   n_stars: 40000          # number of stars
//!   grid_resolution: 1024   # gas grid is grid_resolution x grid_resolution
//!   size_kpc: 30.0          # side of the square domain
//!   seed: 42                # omit for a random seed
//!
//! run:
//!   frames: 200
//!   dt_myr: 0.025           # timestep per frame
//!
//! output:
//!   dir: "output/frames"    # PNG frames land here
//!   image_size: 600         # pixels per side
//!   viewer: false           # true -> interactive window instead of PNGs
//! ```

use serde::Deserialize;

use crate::simulation::constants::DEFAULT_SIZE_KPC;
use crate::simulation::generation::InitialConditions;
use crate::simulation::params::Parameters;

/// Initial-condition settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub n_stars: usize,         // number of stars
    pub grid_resolution: usize, // gas cells per side
    pub size_kpc: f64,          // side of the square domain, kpc
    pub seed: Option<u64>,      // deterministic seed, random when absent
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            n_stars: 40_000,
            grid_resolution: 1024,
            size_kpc: DEFAULT_SIZE_KPC,
            seed: Some(42),
        }
    }
}

/// Frame loop settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub frames: usize, // number of frames
    pub dt_myr: f64,   // timestep per frame, Myr
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 200,
            dt_myr: 0.025,
        }
    }
}

/// Frame output settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,       // directory for PNG frames
    pub image_size: u32,   // frame width and height in pixels
    pub viewer: bool,      // `true` - live window, `false` - PNG frames
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output/frames".to_string(),
            image_size: 600,
            viewer: false,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub generation: GenerationConfig, // initial conditions
    pub run: RunConfig,               // frame loop
    pub output: OutputConfig,         // rendering
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        // an empty document deserializes to unit, not to a map
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(s)
    }

    pub fn initial_conditions(&self) -> InitialConditions {
        let g = &self.generation;
        InitialConditions::new(g.n_stars, g.grid_resolution, g.seed).with_size_kpc(g.size_kpc)
    }

    /// Run parameters once the seed has been fixed
    pub fn parameters(&self, seed: u64) -> Parameters {
        Parameters {
            dt: self.run.dt_myr,
            frames: self.run.frames,
            seed,
        }
    }
}
