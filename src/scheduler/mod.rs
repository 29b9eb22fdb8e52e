pub mod ag;
pub mod priority;
pub mod rr;
pub mod sjf;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::{ProcessSpec, SchedulerResult, Ticks};

pub use ag::{AgScheduler, QuantumTrace};
pub use priority::PriorityScheduler;
pub use rr::RoundRobinScheduler;
pub use sjf::SjfScheduler;

/// Policy parameters shared by every engine. Each engine reads the fields
/// that apply to it and ignores the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimParams {
    /// Fixed tick penalty charged when the dispatched process changes.
    pub context_switch: Ticks,
    /// Round-robin time quantum. Unused by SJF, Priority and AG.
    pub quantum: Ticks,
    /// Priority aging interval; 0 disables aging. Unused elsewhere.
    pub aging_interval: Ticks,
}

/// Precondition violations. The simulations themselves never fail: idle
/// gaps, preemption and aging are all normal control flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("workload is empty")]
    EmptyWorkload,
    #[error("process {name} has zero burst time")]
    ZeroBurst { name: String },
    #[error("duplicate process name {name}")]
    DuplicateName { name: String },
    #[error("round robin quantum must be positive, got {quantum}")]
    InvalidQuantum { quantum: Ticks },
    #[error("process {name} has no quantum (required by the AG policy)")]
    MissingQuantum { name: String },
    #[error("process {name} has zero quantum")]
    ZeroQuantum { name: String },
}

/// One scheduling policy. `run` takes an immutable view of the workload and
/// builds owned working state, so repeated or concurrent invocations never
/// interfere with each other or with the caller's data.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        workload: &[ProcessSpec],
        params: &SimParams,
    ) -> Result<SchedulerResult, SimError>;
}

/// Checks the preconditions common to all engines: a non-empty workload,
/// positive bursts, unique names.
pub(crate) fn validate_workload(workload: &[ProcessSpec]) -> Result<(), SimError> {
    if workload.is_empty() {
        return Err(SimError::EmptyWorkload);
    }
    let mut seen = FxHashSet::default();
    for spec in workload {
        if spec.burst_time == 0 {
            return Err(SimError::ZeroBurst {
                name: spec.name.clone(),
            });
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(SimError::DuplicateName {
                name: spec.name.clone(),
            });
        }
    }
    Ok(())
}
