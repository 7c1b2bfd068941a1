//! Physical constants and model knobs for the disk model
//!
//! Units throughout the crate: kpc, Myr, solar masses (M☉)

/// 1 km/s expressed in kpc/Myr
pub const KMS_TO_KPC_PER_MYR: f64 = 1.022e-3;

/// Flat rotation-curve speed, 220 km/s in kpc/Myr
pub const V_CIRC: f64 = 220.0 * KMS_TO_KPC_PER_MYR;

// ========================================================================================
// Stellar disk
// ========================================================================================

pub const DISK_SCALE_LENGTH_KPC: f64 = 5.0; // exponential radial scale
pub const DISK_SCALE_HEIGHT_KPC: f64 = 0.3; // sigma of the vertical offset
pub const VERTICAL_VELOCITY_SIGMA: f64 = 5.0e-3; // kpc/Myr

/// Pareto shape used for the Kroupa-like mass draw
pub const IMF_PARETO_SHAPE: f64 = 1.35;
pub const IMF_MIN_MASS: f64 = 0.5;
pub const IMF_MAX_MASS: f64 = 40.0;

pub const MAX_INITIAL_AGE_MYR: f64 = 49.0;

// ========================================================================================
// Supernovae
// ========================================================================================

/// Stars strictly above this mass get a supernova timer
pub const SN_MASS_THRESHOLD: f64 = 8.0;
/// Total age at which a massive star explodes
pub const SN_AGE_MYR: f64 = 10.0;
/// Timer value of a star that will never explode
pub const DORMANT_TIMER: f64 = -1.0;
/// Mass of the remnant left behind by a flash
pub const REMNANT_MASS: f64 = 1.0;
/// Sigma of the scalar velocity kick, kpc/Myr
pub const SN_KICK_SIGMA: f64 = 0.05;

// ========================================================================================
// Gas
// ========================================================================================

pub const GAS_CENTRAL_DENSITY: f64 = 1.0e7; // M☉ / kpc²
pub const GAS_SCALE_LENGTH_KPC: f64 = 4.0;
pub const GAS_CLUMP_AMPLITUDE: f64 = 0.4;
pub const DEFAULT_SIZE_KPC: f64 = 30.0;

// ========================================================================================
// RNG streams (same seed, different ChaCha stream per consumer)
// ========================================================================================

pub const STAR_STREAM: u64 = 0;
pub const GAS_STREAM: u64 = 1;
pub const STEP_STREAM: u64 = 2;
