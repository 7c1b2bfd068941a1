//! Core state types for the stellar population
//!
//! Defines:
//! - `Star`: one row of the population, a plain value record
//! - `StarPopulation`: struct-of-arrays storage, one `Vec<f64>` per field
//! - `SupernovaPhase`: the supernova life-cycle stage read off `sn_timer`
//!
//! Array index is star identity. The population never grows or shrinks after
//! construction, so indices stay valid for its whole lifetime.

use std::ops::Range;

use rayon::prelude::*;

use super::constants::{DORMANT_TIMER, REMNANT_MASS};

use nalgebra::{Vector2, Vector3};
pub type NVec2 = Vector2<f64>;
pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64, // position, kpc
    pub y: f64,
    pub z: f64,
    pub vx: f64, // velocity, kpc/Myr
    pub vy: f64,
    pub vz: f64,
    pub mass: f64,     // M☉
    pub age: f64,      // Myr
    pub sn_timer: f64, // Myr until explosion, -1 = never
}

impl Star {
    pub fn position(&self) -> NVec3 {
        NVec3::new(self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> NVec3 {
        NVec3::new(self.vx, self.vy, self.vz)
    }
}

/// Where a star sits in the supernova life-cycle
///
/// `Dormant` stars carry the `-1` sentinel and never fire. `Armed` stars count
/// down. Anything else (fired, missed its window at generation, or a timer
/// that landed exactly on zero) is `Spent` and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupernovaPhase {
    Dormant,
    Armed,
    Spent,
}

impl SupernovaPhase {
    pub fn from_timer(sn_timer: f64) -> Self {
        if sn_timer > 0.0 {
            SupernovaPhase::Armed
        } else if sn_timer == DORMANT_TIMER {
            SupernovaPhase::Dormant
        } else {
            SupernovaPhase::Spent
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarPopulation {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
    vz: Vec<f64>,
    mass: Vec<f64>,
    age: Vec<f64>,
    sn_timer: Vec<f64>,
}

impl StarPopulation {
    /// Zeroed population of `n` stars, every timer dormant
    pub fn with_len(n: usize) -> Self {
        Self {
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
            vx: vec![0.0; n],
            vy: vec![0.0; n],
            vz: vec![0.0; n],
            mass: vec![0.0; n],
            age: vec![0.0; n],
            sn_timer: vec![DORMANT_TIMER; n],
        }
    }

    pub fn from_stars(stars: &[Star]) -> Self {
        let mut pop = Self::with_len(stars.len());
        for (i, s) in stars.iter().enumerate() {
            pop.set_star(i, *s);
        }
        pop
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Copy out row `i`
    pub fn star(&self, i: usize) -> Star {
        Star {
            x: self.x[i],
            y: self.y[i],
            z: self.z[i],
            vx: self.vx[i],
            vy: self.vy[i],
            vz: self.vz[i],
            mass: self.mass[i],
            age: self.age[i],
            sn_timer: self.sn_timer[i],
        }
    }

    /// Overwrite row `i`
    pub fn set_star(&mut self, i: usize, s: Star) {
        self.x[i] = s.x;
        self.y[i] = s.y;
        self.z[i] = s.z;
        self.vx[i] = s.vx;
        self.vy[i] = s.vy;
        self.vz[i] = s.vz;
        self.mass[i] = s.mass;
        self.age[i] = s.age;
        self.sn_timer[i] = s.sn_timer;
    }

    pub fn iter(&self) -> impl Iterator<Item = Star> + '_ {
        (0..self.len()).map(move |i| self.star(i))
    }

    // field views ==========================================================================

    pub fn x(&self) -> &[f64] { &self.x }
    pub fn y(&self) -> &[f64] { &self.y }
    pub fn z(&self) -> &[f64] { &self.z }
    pub fn vx(&self) -> &[f64] { &self.vx }
    pub fn vy(&self) -> &[f64] { &self.vy }
    pub fn vz(&self) -> &[f64] { &self.vz }
    pub fn mass(&self) -> &[f64] { &self.mass }
    pub fn age(&self) -> &[f64] { &self.age }
    pub fn sn_timer(&self) -> &[f64] { &self.sn_timer }

    pub fn phase(&self, i: usize) -> SupernovaPhase {
        SupernovaPhase::from_timer(self.sn_timer[i])
    }

    /// Indices of every star with a live (positive) timer, ascending
    pub fn armed_indices(&self) -> Vec<usize> {
        self.sn_timer
            .iter()
            .enumerate()
            .filter(|(_, t)| **t > 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// First non-finite position or velocity component as `(field, index)`
    pub fn first_non_finite(&self) -> Option<(&'static str, usize)> {
        let fields: [(&'static str, &[f64]); 6] = [
            ("x", self.x.as_slice()),
            ("y", self.y.as_slice()),
            ("z", self.z.as_slice()),
            ("vx", self.vx.as_slice()),
            ("vy", self.vy.as_slice()),
            ("vz", self.vz.as_slice()),
        ];
        fields.iter().find_map(|(name, values)| {
            values.iter().position(|v| !v.is_finite()).map(|i| (*name, i))
        })
    }

    /// First star whose in-plane drift by `dt` would leave the finite range,
    /// as `(field, index)`; nothing is modified
    pub fn first_non_finite_drift(&self, dt: f64) -> Option<(&'static str, usize)> {
        let drifts: [(&'static str, &[f64], &[f64]); 2] = [
            ("x", self.x.as_slice(), self.vx.as_slice()),
            ("y", self.y.as_slice(), self.vy.as_slice()),
        ];
        drifts.iter().find_map(|(name, pos, vel)| {
            pos.iter()
                .zip(vel.iter())
                .position(|(p, v)| !(p + v * dt).is_finite())
                .map(|i| (*name, i))
        })
    }

    // bulk updates ========================================================================
    //
    // Each of these touches only the rows in `range` and has no cross-row
    // dependency, so they run as rayon parallel loops.

    /// Explicit Euler drift in the disk plane: x += vx dt, y += vy dt
    /// z is left alone, the disk stays thin by construction
    pub fn advance_positions(&mut self, range: Range<usize>, dt: f64) {
        let vx = &self.vx[range.clone()];
        let vy = &self.vy[range.clone()];

        self.x[range.clone()]
            .par_iter_mut()
            .zip(vx.par_iter())
            .for_each(|(x, v)| *x += v * dt);

        self.y[range]
            .par_iter_mut()
            .zip(vy.par_iter())
            .for_each(|(y, v)| *y += v * dt);
    }

    /// age += dt, unconditionally
    pub fn age_all(&mut self, range: Range<usize>, dt: f64) {
        self.age[range].par_iter_mut().for_each(|a| *a += dt);
    }

    /// Count down every armed timer by `dt` and return the stars whose timer
    /// went from > 0 to < 0 in this call (the edge trigger), ascending
    ///
    /// Timers that are not positive on entry are left untouched, which is
    /// what keeps a spent star from firing again.
    pub fn decrement_timers(&mut self, range: Range<usize>, dt: f64) -> Vec<usize> {
        let start = range.start;
        self.sn_timer[range]
            .par_iter_mut()
            .enumerate()
            .filter_map(|(k, t)| {
                if *t > 0.0 {
                    *t -= dt;
                    if *t < 0.0 {
                        return Some(start + k);
                    }
                }
                None
            })
            .collect()
    }

    /// Turn each flashed star into a remnant and add its kick
    ///
    /// `kicks[k]` belongs to `flashed[k]` and is added unchanged to both `vx`
    /// and `vy` of that star.
    pub fn apply_kicks(&mut self, flashed: &[usize], kicks: &[f64]) {
        debug_assert_eq!(flashed.len(), kicks.len());
        for (&i, &kick) in flashed.iter().zip(kicks) {
            self.mass[i] = REMNANT_MASS;
            self.vx[i] += kick;
            self.vy[i] += kick;
        }
    }

    // construction helpers used by the generator ==========================================

    pub(crate) fn fields_mut(&mut self) -> FieldsMut<'_> {
        FieldsMut {
            x: &mut self.x,
            y: &mut self.y,
            z: &mut self.z,
            vx: &mut self.vx,
            vy: &mut self.vy,
            vz: &mut self.vz,
            mass: &mut self.mass,
            age: &mut self.age,
            sn_timer: &mut self.sn_timer,
        }
    }
}

/// Simultaneous mutable views of every column
pub(crate) struct FieldsMut<'a> {
    pub x: &'a mut [f64],
    pub y: &'a mut [f64],
    pub z: &'a mut [f64],
    pub vx: &'a mut [f64],
    pub vy: &'a mut [f64],
    pub vz: &'a mut [f64],
    pub mass: &'a mut [f64],
    pub age: &'a mut [f64],
    pub sn_timer: &'a mut [f64],
}
