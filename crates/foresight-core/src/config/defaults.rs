// Single source of truth for all default values.

// --- Prediction ---
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_PATTERN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_PERTURBATION_AMPLITUDE: f64 = 0.05;
pub const DEFAULT_MAX_CANDIDATES: usize = 1;

// --- Speculation ---
pub const DEFAULT_TTL_MS: u64 = 30_000;
pub const DEFAULT_IN_FLIGHT_WAIT_MS: u64 = 2_000;
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;

// --- Learning ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_REINFORCE_ON_HIT: bool = false;
pub const DEFAULT_SEED_WORKFLOWS: bool = false;

// --- Trajectory ---
pub const DEFAULT_TRAJECTORY_CAPACITY: usize = 10;

// --- Observability ---
pub const DEFAULT_LOG_FILTER: &str = "foresight=info";
pub const DEFAULT_JSON_LOGS: bool = false;
