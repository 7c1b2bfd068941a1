use std::time::Instant;

use crate::simulation::constants::STEP_STREAM;
use crate::simulation::gas::GasField;
use crate::simulation::generation::{generate_initial_conditions, stream_rng};
use crate::simulation::states::StarPopulation;
use crate::simulation::stepper::{gas_rotation_angle, step};

const BENCH_SEED: u64 = 7;
const BENCH_DT: f64 = 0.025;

/// Helper to build a population of `n` stars on a `res` grid
fn make_state(n: usize, res: usize) -> Option<(StarPopulation, GasField)> {
    match generate_initial_conditions(n, res, Some(BENCH_SEED)) {
        Ok(state) => Some(state),
        Err(e) => {
            println!("N = {n}, grid = {res}: setup failed: {e}");
            None
        }
    }
}

/// Time a full `step` for growing star counts on a fixed grid
pub fn bench_step() {
    let ns = [1_000, 4_000, 16_000, 40_000, 64_000];
    let res = 256;
    let steps = 20;

    for n in ns {
        let Some((mut stars, mut gas)) = make_state(n, res) else { continue };
        let mut rng = stream_rng(BENCH_SEED, STEP_STREAM);

        // Warm up
        let _ = step(&mut stars, &mut gas, BENCH_DT, &mut rng);

        let t0 = Instant::now();
        let mut flashes = 0;
        for _ in 0..steps {
            match step(&mut stars, &mut gas, BENCH_DT, &mut rng) {
                Ok(f) => flashes += f.map_or(0, |f| f.len()),
                Err(e) => {
                    println!("N = {n}: step failed: {e}");
                    break;
                }
            }
        }
        let per_step = t0.elapsed().as_secs_f64() / steps as f64;

        println!("N = {n:6}, grid = {res}, step = {per_step:8.6} s, flashes = {flashes}");
    }
}

/// Time `GasField::rotate` alone for growing grid sizes
pub fn bench_rotation() {
    let resolutions = [128, 256, 512, 1024, 2048];
    let reps = 10;

    for res in resolutions {
        let Some((_, mut gas)) = make_state(1, res) else { continue };
        let angle = gas_rotation_angle(BENCH_DT, gas.size_kpc());
        let before = gas.density_sum();

        // Warm up
        gas.rotate(angle);

        let t0 = Instant::now();
        for _ in 0..reps {
            gas.rotate(angle);
        }
        let per_rot = t0.elapsed().as_secs_f64() / reps as f64;
        let drift = (gas.density_sum() - before) / before * 100.0;

        println!("grid = {res:5}, rotate = {per_rot:8.6} s, drift after {} = {drift:+.4}%", reps + 1);
    }
}

/// Step cost over a range of N, printed as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_step_curve() {
    println!("N,step_ms");

    let res = 128;
    for n in (5_000..=100_000).step_by(5_000) {
        let Some((mut stars, mut gas)) = make_state(n, res) else { continue };
        let mut rng = stream_rng(BENCH_SEED, STEP_STREAM);
        let steps = 5;

        let t0 = Instant::now();
        for _ in 0..steps {
            if step(&mut stars, &mut gas, BENCH_DT, &mut rng).is_err() {
                break;
            }
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6}", n, ms);
    }
}
