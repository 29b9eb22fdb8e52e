pub mod metrics;
pub mod process;

pub use metrics::{ExecutionLog, ProcessMetrics, SchedulerResult, round2};
pub use process::{AgProcess, Process, ProcessSpec, Ticks};
