use tracing::debug;

use super::{Scheduler, SimError, SimParams, validate_workload};
use crate::core::{ExecutionLog, Process, ProcessMetrics, ProcessSpec, SchedulerResult, Ticks};

/// Preemptive shortest-job-first. Re-evaluates the whole arrived set every
/// tick and runs the process with the least remaining time.
#[derive(Debug, Default)]
pub struct SjfScheduler;

impl Scheduler for SjfScheduler {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn run(
        &self,
        workload: &[ProcessSpec],
        params: &SimParams,
    ) -> Result<SchedulerResult, SimError> {
        validate_workload(workload)?;

        let mut procs: Vec<Process> = workload.iter().map(Process::from_spec).collect();
        let mut log = ExecutionLog::new();
        let mut time: Ticks = 0;
        let mut completed = 0usize;
        let mut last: Option<usize> = None;

        while completed < procs.len() {
            // First-match minimum over arrived, unfinished processes. Ties
            // deliberately go to the earliest index in the input list.
            let mut current: Option<usize> = None;
            let mut min_remaining = Ticks::MAX;
            for (i, p) in procs.iter().enumerate() {
                if p.remaining_time > 0
                    && p.arrival_time <= time
                    && p.remaining_time < min_remaining
                {
                    min_remaining = p.remaining_time;
                    current = Some(i);
                }
            }

            let Some(cur) = current else {
                // Idle tick: nothing has arrived yet.
                time += 1;
                continue;
            };

            // Switch cost is charged once per change of selection, as a flat
            // clock jump with no arrival processing inside it.
            if let Some(prev) = last
                && prev != cur
            {
                time += params.context_switch;
                debug!(from = %procs[prev].name, to = %procs[cur].name, now = time, "context switch");
            }

            log.record(&procs[cur].name);

            procs[cur].remaining_time -= 1;
            time += 1;

            if procs[cur].is_finished() {
                completed += 1;
                procs[cur].complete(time);
                debug!(process = %procs[cur].name, now = time, "completed");
            }

            last = Some(cur);
        }

        let metrics = procs
            .iter()
            .map(|p| {
                let completion = p
                    .completion_time
                    .expect("all processes completed before aggregation");
                ProcessMetrics::from_completion(&p.name, p.arrival_time, p.burst_time, completion)
            })
            .collect();

        SchedulerResult::from_parts(log, metrics).ok_or(SimError::EmptyWorkload)
    }
}
