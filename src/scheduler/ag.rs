use tracing::debug;

use super::{Scheduler, SimError, SimParams, validate_workload};
use crate::core::{AgProcess, ExecutionLog, ProcessMetrics, ProcessSpec, SchedulerResult, Ticks};

/// Adaptive hybrid policy. Each dispatch subdivides the process's current
/// quantum into three phases: a non-preemptible FCFS opening (25%), a
/// priority-preemptible middle (up to 50%), and an SJF-preemptible tail.
/// How a dispatch ends decides both the process's next quantum and which
/// selection rule picks the next process.
#[derive(Debug, Default)]
pub struct AgScheduler;

/// Why the previous dispatch ended. Drives `pick_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StopReason {
    #[default]
    None,
    PriorityPreempt,
    SjfPreempt,
}

/// Per-process log of every quantum value assigned across dispatches. The
/// final entry is 0 exactly when the process completed on its last
/// dispatch, and `history.len()` is always the dispatch count plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumTrace {
    pub name: String,
    pub history: Vec<Ticks>,
}

struct AgRun {
    procs: Vec<AgProcess>,
    /// Not-yet-arrived process indices, input order.
    pending: Vec<usize>,
    /// Ready queue, insertion order.
    ready: Vec<usize>,
    time: Ticks,
    stop: StopReason,
    log: ExecutionLog,
}

impl AgRun {
    fn new(procs: Vec<AgProcess>) -> Self {
        let pending = (0..procs.len()).collect();
        Self {
            procs,
            pending,
            ready: Vec::new(),
            time: 0,
            stop: StopReason::None,
            log: ExecutionLog::new(),
        }
    }

    /// Moves every arrived process into the ready queue, preserving input
    /// order among simultaneous arrivals. Called at the top of the outer
    /// loop and after every sub-slice or tick, so a process can become the
    /// preemptor within the dispatch it arrives in.
    fn absorb_arrivals(&mut self) {
        let mut i = 0;
        while i < self.pending.len() {
            let idx = self.pending[i];
            if self.procs[idx].arrival_time <= self.time {
                self.ready.push(idx);
                self.pending.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// First-match lowest priority number among waiting processes.
    fn best_waiting_priority(&self) -> Option<usize> {
        self.ready
            .iter()
            .copied()
            .reduce(|best, i| {
                if self.procs[i].priority < self.procs[best].priority {
                    i
                } else {
                    best
                }
            })
    }

    /// First-match shortest remaining time among waiting processes.
    fn shortest_waiting(&self) -> Option<usize> {
        self.ready
            .iter()
            .copied()
            .reduce(|best, i| {
                if self.procs[i].remaining_time < self.procs[best].remaining_time {
                    i
                } else {
                    best
                }
            })
    }

    /// Selection rule for the next dispatch, keyed by how the previous one
    /// ended: FIFO after a normal end, best priority after a priority
    /// preemption, shortest remaining after an SJF preemption. Ties always
    /// go to the earliest queue position.
    fn pick_next(&mut self) -> Option<usize> {
        if self.ready.is_empty() {
            return None;
        }
        let idx = match self.stop {
            StopReason::None => self.ready[0],
            StopReason::PriorityPreempt => self
                .best_waiting_priority()
                .expect("ready queue is non-empty"),
            StopReason::SjfPreempt => self.shortest_waiting().expect("ready queue is non-empty"),
        };
        let pos = self
            .ready
            .iter()
            .position(|&i| i == idx)
            .expect("picked process is in the ready queue");
        self.ready.remove(pos);
        Some(idx)
    }

    fn dispatch(&mut self, cur: usize) {
        self.log.record(&self.procs[cur].name);
        self.stop = StopReason::None;

        let quantum = self.procs[cur].quantum;
        let q25 = quantum.div_ceil(4);
        let q50 = quantum.div_ceil(2);
        let mut used: Ticks = 0;

        // Phase A: non-preemptible FCFS opening.
        let run = q25.min(self.procs[cur].remaining_time);
        self.procs[cur].remaining_time -= run;
        self.time += run;
        used += run;
        self.absorb_arrivals();

        if self.procs[cur].remaining_time == 0 {
            self.finish(cur);
            return;
        }

        // Phase B: priority-checked sub-slices up to the 50% mark. The last
        // sub-slice may overshoot the mark; only the entry check is gated.
        while used < q50 && self.procs[cur].remaining_time > 0 {
            if let Some(hp) = self.best_waiting_priority()
                && self.procs[hp].priority < self.procs[cur].priority
            {
                let remaining_phase = quantum - used;
                let next = quantum + remaining_phase.div_ceil(2);
                self.procs[cur].set_quantum(next);
                self.ready.push(cur);
                self.stop = StopReason::PriorityPreempt;
                debug!(
                    process = %self.procs[cur].name,
                    by = %self.procs[hp].name,
                    next_quantum = next,
                    now = self.time,
                    "priority preempt"
                );
                break;
            }
            let run = q25.min(self.procs[cur].remaining_time);
            self.procs[cur].remaining_time -= run;
            self.time += run;
            used += run;
            self.absorb_arrivals();
        }

        if self.procs[cur].remaining_time == 0 {
            self.finish(cur);
            return;
        }
        if self.stop == StopReason::PriorityPreempt {
            return;
        }

        // Phase C: SJF-checked, tick by tick, for the rest of the quantum.
        while used < quantum && self.procs[cur].remaining_time > 0 {
            if let Some(sj) = self.shortest_waiting()
                && self.procs[sj].remaining_time < self.procs[cur].remaining_time
            {
                let next = quantum + (quantum - used);
                self.procs[cur].set_quantum(next);
                self.ready.push(cur);
                self.stop = StopReason::SjfPreempt;
                debug!(
                    process = %self.procs[cur].name,
                    by = %self.procs[sj].name,
                    next_quantum = next,
                    now = self.time,
                    "sjf preempt"
                );
                break;
            }
            self.procs[cur].remaining_time -= 1;
            self.time += 1;
            used += 1;
            self.absorb_arrivals();
        }

        if self.procs[cur].remaining_time == 0 {
            self.finish(cur);
        } else if self.stop == StopReason::None {
            // Quantum fully used with work left and nobody preempted:
            // re-queue with a fixed increment.
            self.procs[cur].set_quantum(quantum + 2);
            self.ready.push(cur);
        }
    }

    fn finish(&mut self, cur: usize) {
        self.procs[cur].set_quantum(0);
        self.procs[cur].completion_time = Some(self.time);
        debug!(process = %self.procs[cur].name, now = self.time, "completed");
    }

    fn run(&mut self) {
        while !self.ready.is_empty() || !self.pending.is_empty() {
            self.absorb_arrivals();
            let Some(cur) = self.pick_next() else {
                self.time += 1;
                continue;
            };
            self.dispatch(cur);
        }
    }
}

impl AgScheduler {
    /// Runs the simulation and also returns the per-process quantum
    /// histories for diagnostics.
    pub fn run_traced(
        &self,
        workload: &[ProcessSpec],
    ) -> Result<(SchedulerResult, Vec<QuantumTrace>), SimError> {
        validate_workload(workload)?;

        let mut procs = Vec::with_capacity(workload.len());
        for spec in workload {
            let quantum = spec.quantum.ok_or_else(|| SimError::MissingQuantum {
                name: spec.name.clone(),
            })?;
            if quantum == 0 {
                return Err(SimError::ZeroQuantum {
                    name: spec.name.clone(),
                });
            }
            procs.push(AgProcess::new(spec, quantum));
        }

        let mut sim = AgRun::new(procs);
        sim.run();

        let metrics = sim
            .procs
            .iter()
            .map(|p| {
                let completion = p
                    .completion_time
                    .expect("all processes completed before aggregation");
                ProcessMetrics::from_completion(&p.name, p.arrival_time, p.burst_time, completion)
            })
            .collect();
        let traces = sim
            .procs
            .iter()
            .map(|p| QuantumTrace {
                name: p.name.clone(),
                history: p.quantum_history.clone(),
            })
            .collect();

        let result =
            SchedulerResult::from_parts(sim.log, metrics).ok_or(SimError::EmptyWorkload)?;
        Ok((result, traces))
    }
}

impl Scheduler for AgScheduler {
    fn name(&self) -> &'static str {
        "AG"
    }

    fn run(
        &self,
        workload: &[ProcessSpec],
        _params: &SimParams,
    ) -> Result<SchedulerResult, SimError> {
        self.run_traced(workload).map(|(result, _)| result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_quantum_is_rejected() {
        let err = AgScheduler.run_traced(&[ProcessSpec::new("P", 0, 4, 1)]).unwrap_err();
        assert_eq!(err, SimError::MissingQuantum { name: "P".into() });
    }

    #[test]
    fn zero_quantum_is_rejected() {
        let err = AgScheduler
            .run_traced(&[ProcessSpec::new("P", 0, 4, 1).with_quantum(0)])
            .unwrap_err();
        assert_eq!(err, SimError::ZeroQuantum { name: "P".into() });
    }

    #[test]
    fn single_process_completes_within_one_dispatch() {
        let (result, traces) = AgScheduler
            .run_traced(&[ProcessSpec::new("P", 0, 4, 1).with_quantum(4)])
            .unwrap();
        assert_eq!(result.execution_order, vec!["P"]);
        assert_eq!(result.process_results[0].waiting_time, 0);
        assert_eq!(result.process_results[0].turnaround_time, 4);
        assert_eq!(traces[0].history, vec![4, 0]);
    }

    #[test]
    fn unpreempted_exhaustion_grows_quantum_by_two() {
        let (result, traces) = AgScheduler
            .run_traced(&[ProcessSpec::new("P", 0, 10, 1).with_quantum(4)])
            .unwrap();
        // Two dispatches: the first uses the full quantum (4) and re-queues
        // with 6, the second finishes the burst.
        assert_eq!(result.execution_order, vec!["P"]);
        assert_eq!(result.process_results[0].turnaround_time, 10);
        assert_eq!(traces[0].history, vec![4, 6, 0]);
    }

    #[test]
    fn full_trace_with_both_preemption_kinds() {
        // P2 arrives during P1's first dispatch and priority-preempts it in
        // phase B; P3 later SJF-preempts P1 in phase C. Selection after each
        // preemption follows the matching rule, not FIFO.
        let workload = [
            ProcessSpec::new("P1", 0, 8, 2).with_quantum(4),
            ProcessSpec::new("P2", 1, 4, 1).with_quantum(4),
            ProcessSpec::new("P3", 2, 2, 3).with_quantum(4),
        ];
        let (result, traces) = AgScheduler.run_traced(&workload).unwrap();
        assert_eq!(
            result.execution_order,
            vec!["P1", "P2", "P1", "P3", "P1", "P3"]
        );

        let tat: Vec<_> = result
            .process_results
            .iter()
            .map(|m| m.turnaround_time)
            .collect();
        let wt: Vec<_> = result.process_results.iter().map(|m| m.waiting_time).collect();
        assert_eq!(tat, vec![13, 4, 12]);
        assert_eq!(wt, vec![5, 0, 10]);
        assert_eq!(result.average_waiting_time, 5.0);
        assert_eq!(result.average_turnaround_time, 9.67);

        // Priority preempt at 1 used tick: 4 + ceil(3/2) = 6; SJF preempt
        // at 4 used of 6: 6 + 2 = 8; completion logs 0.
        assert_eq!(traces[0].history, vec![4, 6, 8, 0]);
        assert_eq!(traces[1].history, vec![4, 0]);
        assert_eq!(traces[2].history, vec![4, 6, 0]);
    }

    #[test]
    fn history_len_tracks_dispatch_count() {
        let workload = [
            ProcessSpec::new("A", 0, 7, 2).with_quantum(3),
            ProcessSpec::new("B", 1, 5, 1).with_quantum(3),
        ];
        let (result, traces) = AgScheduler.run_traced(&workload).unwrap();
        // Every dispatch appends exactly one history entry, and only a
        // completing dispatch appends 0.
        let total_dispatches: usize = traces.iter().map(|t| t.history.len() - 1).sum();
        assert!(total_dispatches >= result.execution_order.len());
        for trace in &traces {
            assert_eq!(trace.history.last(), Some(&0));
            assert!(trace.history[..trace.history.len() - 1].iter().all(|&q| q > 0));
        }
    }

    #[test]
    fn idles_until_first_arrival() {
        let (result, _) = AgScheduler
            .run_traced(&[ProcessSpec::new("P", 3, 2, 1).with_quantum(4)])
            .unwrap();
        assert_eq!(result.execution_order, vec!["P"]);
        assert_eq!(result.process_results[0].waiting_time, 0);
        assert_eq!(result.process_results[0].turnaround_time, 2);
    }
}
