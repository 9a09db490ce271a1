//! Exploration noise over candidate distributions.
//!
//! Noise is applied to the per-prediction copy only; the model itself is
//! never perturbed. A fixed seed makes the noise stream reproducible.

use std::sync::{Arc, Mutex, PoisonError};

use foresight_core::config::PredictionConfig;
use foresight_core::{Distribution, Perturbation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Add uniform noise in `[-amplitude, amplitude]` to every weight, then
/// clamp into `[0, 1]`.
pub fn perturb<R: Rng>(
    mut distribution: Distribution,
    amplitude: f64,
    rng: &mut R,
) -> Distribution {
    if amplitude > 0.0 {
        distribution.map_weights(|w| w + rng.gen_range(-amplitude..=amplitude));
    }
    distribution.clamp_unit();
    distribution
}

/// Uniform noise drawn from a shared [`StdRng`].
#[derive(Debug)]
pub struct NoisePerturbation {
    amplitude: f64,
    rng: Mutex<StdRng>,
}

impl NoisePerturbation {
    /// Seeded from OS entropy.
    pub fn new(amplitude: f64) -> Self {
        Self::with_rng(amplitude, StdRng::from_entropy())
    }

    /// Deterministic noise stream for tests and replays.
    pub fn seeded(amplitude: f64, seed: u64) -> Self {
        Self::with_rng(amplitude, StdRng::seed_from_u64(seed))
    }

    fn with_rng(amplitude: f64, rng: StdRng) -> Self {
        Self {
            amplitude: amplitude.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl Perturbation for NoisePerturbation {
    fn perturb(&self, distribution: Distribution) -> Distribution {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        perturb(distribution, self.amplitude, &mut *rng)
    }
}

/// Identity: predictions follow the model exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPerturbation;

impl Perturbation for NullPerturbation {
    fn perturb(&self, distribution: Distribution) -> Distribution {
        distribution
    }
}

/// Build the perturbation described by `config`. Zero amplitude yields
/// [`NullPerturbation`].
pub fn from_config(config: &PredictionConfig) -> Arc<dyn Perturbation> {
    if config.perturbation_amplitude <= 0.0 {
        return Arc::new(NullPerturbation);
    }
    match config.perturbation_seed {
        Some(seed) => Arc::new(NoisePerturbation::seeded(config.perturbation_amplitude, seed)),
        None => Arc::new(NoisePerturbation::new(config.perturbation_amplitude)),
    }
}
