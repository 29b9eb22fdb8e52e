use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{Scheduler, SimError, SimParams, validate_workload};
use crate::core::{ExecutionLog, Process, ProcessMetrics, ProcessSpec, SchedulerResult, Ticks};

/// Fixed-quantum round robin over a FIFO ready queue. Each dispatch runs
/// `min(quantum, remaining)` ticks in one step; arrivals inside that span
/// join the tail in input order, ahead of the re-queued current process.
#[derive(Debug, Default)]
pub struct RoundRobinScheduler;

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn run(
        &self,
        workload: &[ProcessSpec],
        params: &SimParams,
    ) -> Result<SchedulerResult, SimError> {
        validate_workload(workload)?;
        if params.quantum == 0 {
            return Err(SimError::InvalidQuantum { quantum: 0 });
        }

        let mut procs: Vec<Process> = workload.iter().map(Process::from_spec).collect();
        let mut log = ExecutionLog::new();
        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut time: Ticks = 0;
        let mut completed = 0usize;

        // Waiting time accumulates as (dispatch start - last finish) per
        // process, which stays correct when arrivals interleave with
        // quantum boundaries and switch spans.
        let mut total_waiting: FxHashMap<String, Ticks> = FxHashMap::default();
        let mut last_finish: FxHashMap<String, Ticks> = FxHashMap::default();
        for p in &procs {
            total_waiting.insert(p.name.clone(), 0);
            last_finish.insert(p.name.clone(), p.arrival_time);
        }

        for (i, p) in procs.iter().enumerate() {
            if p.arrival_time == 0 {
                queue.push_back(i);
            }
        }

        while completed < procs.len() {
            let Some(cur) = queue.pop_front() else {
                // Future arrivals only: advance one tick at a time.
                time += 1;
                for (i, p) in procs.iter().enumerate() {
                    if p.remaining_time > 0 && p.arrival_time == time {
                        queue.push_back(i);
                    }
                }
                continue;
            };

            let wait = time - last_finish[&procs[cur].name];
            if wait > 0 {
                *total_waiting
                    .get_mut(&procs[cur].name)
                    .expect("accounting entry exists for every process") += wait;
            }

            log.record(&procs[cur].name);

            let run = params.quantum.min(procs[cur].remaining_time);
            let start = time;
            procs[cur].remaining_time -= run;
            time += run;
            debug!(process = %procs[cur].name, start, run, "dispatch");

            // Admit everything that arrived during the span, before the
            // current process rejoins the tail.
            for (i, p) in procs.iter().enumerate() {
                if p.remaining_time > 0 && p.arrival_time > start && p.arrival_time <= time {
                    queue.push_back(i);
                }
            }

            if procs[cur].is_finished() {
                completed += 1;
                procs[cur].complete(time);
                debug!(process = %procs[cur].name, now = time, "completed");
            } else {
                queue.push_back(cur);
            }

            last_finish.insert(procs[cur].name.clone(), time);

            // Switch cost advances the clock tick-by-tick so exact-tick
            // arrivals are still admitted.
            for _ in 0..params.context_switch {
                time += 1;
                for (i, p) in procs.iter().enumerate() {
                    if p.remaining_time > 0 && p.arrival_time == time {
                        queue.push_back(i);
                    }
                }
            }
        }

        let metrics = procs
            .iter()
            .map(|p| {
                let completion = p
                    .completion_time
                    .expect("all processes completed before aggregation");
                ProcessMetrics {
                    name: p.name.clone(),
                    waiting_time: total_waiting[&p.name],
                    turnaround_time: completion - p.arrival_time,
                }
            })
            .collect();

        SchedulerResult::from_parts(log, metrics).ok_or(SimError::EmptyWorkload)
    }
}
