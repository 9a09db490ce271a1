use crate::models::Distribution;

/// Exploration noise applied to a merged candidate distribution.
///
/// Implementations operate on the copy they are given and never touch the
/// model. Implementations that add noise must leave every weight in `[0, 1]`.
pub trait Perturbation: Send + Sync {
    fn perturb(&self, distribution: Distribution) -> Distribution;
}
