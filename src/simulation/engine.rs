//! Frame driver
//!
//! Runs a `Scenario` for its configured number of frames, hands every
//! completed frame to a renderer and reports progress through `log`.
//! Frames are strictly sequential: a frame is rendered only after its step
//! has fully completed, and the next step starts after rendering returns.

use std::time::{Duration, Instant};

use log::info;
use thiserror::Error;

use crate::simulation::error::SimError;
use crate::simulation::scenario::Scenario;
use crate::visualization::renderer::{FrameRenderer, FrameView, RenderError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation failed at frame {frame}: {source}")]
    Sim { frame: usize, source: SimError },
    #[error("rendering failed at frame {frame}: {source}")]
    Render { frame: usize, source: RenderError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub total_flashes: usize,
    pub elapsed: Duration,
}

/// Step and render until the scenario has run all of its frames
pub fn run_frames(scenario: &mut Scenario, renderer: &mut dyn FrameRenderer) -> Result<RunSummary, EngineError> {
    let start = Instant::now();
    let total = scenario.parameters.frames;
    let report_every = (total / 10).max(1);
    let mut total_flashes = 0;
    let mut frames = 0;

    while !scenario.is_finished() {
        let frame = scenario.frame;
        let out = scenario
            .advance()
            .map_err(|source| EngineError::Sim { frame, source })?;

        let flashes = out.flashes.as_deref();
        total_flashes += flashes.map_or(0, <[_]>::len);

        let view = FrameView {
            index: out.index,
            stars: &scenario.stars,
            gas: &scenario.gas,
            flashes,
        };
        renderer
            .render(&view)
            .map_err(|source| EngineError::Render { frame, source })?;

        frames += 1;
        if frames % report_every == 0 || frames == total {
            info!(
                "frame {frames}/{total} ({:.0}%), {total_flashes} supernovae so far",
                100.0 * frames as f64 / total as f64
            );
        }
    }

    let summary = RunSummary {
        frames,
        total_flashes,
        elapsed: start.elapsed(),
    };
    info!(
        "finished {} frames in {:.2} s, {} supernovae",
        summary.frames,
        summary.elapsed.as_secs_f64(),
        summary.total_flashes
    );
    Ok(summary)
}
