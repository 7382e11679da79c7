//! Cycle testing.
//!
//! - [`planner`]: position sequence expansion (pure)
//! - [`CycleRequest`] / [`CycleOptions`]: validated run description
//! - [`CycleEngine`]: start/stop of a background worker, outcome and progress

mod engine;
pub mod planner;
mod request;
mod run;
mod worker;

pub use engine::{CycleEngine, WORKER_THREAD_NAME};
pub use planner::{permutation_sequence, plan};
pub use request::{CycleOptions, CycleRequest, parse_position};
pub use run::{CycleProgress, RunOutcome};
