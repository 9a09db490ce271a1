pub mod executor;
pub mod perturbation;

pub use executor::TaskExecutor;
pub use perturbation::Perturbation;
