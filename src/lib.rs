pub mod core;
pub mod scheduler;
pub mod sim;

pub use crate::core::{ProcessMetrics, ProcessSpec, SchedulerResult, Ticks};
pub use crate::scheduler::{
    AgScheduler, PriorityScheduler, RoundRobinScheduler, Scheduler, SimError, SimParams,
    SjfScheduler,
};
