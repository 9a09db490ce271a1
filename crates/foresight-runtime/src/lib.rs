//! # foresight-runtime
//!
//! The speculative execution engine. `observe` feeds the trajectory and
//! launches speculative computations for confident predictions; `handle`
//! serves a real request from the result cache or falls back to the
//! executor and learns from the miss.
//!
//! | Module | Role |
//! |--------|------|
//! | `cache` | Per-action speculative entries with TTL and exactly-once consumption |
//! | `pool` | Bounded worker `JoinSet` plus TTL timers, drained on shutdown |
//! | `scheduler` | Idempotent dispatch of predicted actions |
//! | `handler` | Hit / in-flight / miss request state machine |
//! | `engine` | The [`SpeculativeEngine`] facade and its builder |

pub mod cache;
pub mod engine;
mod handler;
pub mod pool;
pub mod scheduler;

pub use cache::{Consumption, MissReason, ResultCache, SpeculationState};
pub use engine::{EngineBuilder, SpeculativeEngine};
pub use scheduler::DispatchOutcome;
