use keyed_priority_queue::KeyedPriorityQueue;
use tracing::debug;

use super::{Scheduler, SimError, SimParams, validate_workload};
use crate::core::{ExecutionLog, Process, ProcessMetrics, ProcessSpec, SchedulerResult, Ticks};

/// Preemptive-by-reselection priority scheduling with aging. Every tick the
/// best-ranked process is popped, run for one tick and re-queued, so a
/// better arrival wins the very next tick. Waiting processes age toward
/// priority 1 to avoid starvation.
#[derive(Debug, Default)]
pub struct PriorityScheduler;

/// Three-level ranking: priority, then original arrival, then name.
/// `KeyedPriorityQueue` is a max-heap, so the ordering is flipped to surface
/// the lowest triple first. Names are unique, which makes the order total
/// and pop order fully deterministic.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
struct Rank {
    priority: u32,
    arrival: Ticks,
    name_rank: usize,
}

impl Rank {
    fn key(&self) -> (u32, Ticks, usize) {
        (self.priority, self.arrival, self.name_rank)
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.key().cmp(&self.key())
    }
}

/// What occupied the CPU on the previous loop iteration. A switch is
/// charged only when moving off a real process onto something else; idle
/// spans and the very first dispatch are free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unset,
    Idle,
    Proc(usize),
}

struct PriorityRun {
    procs: Vec<Process>,
    queue: KeyedPriorityQueue<usize, Rank>,
    /// Lexicographic rank of each process name, fixed for the run.
    name_ranks: Vec<usize>,
    /// Process indices sorted by arrival time (stable), with a cursor over
    /// the not-yet-admitted suffix.
    arrival_order: Vec<usize>,
    cursor: usize,
    time: Ticks,
    aging_interval: Ticks,
}

impl PriorityRun {
    fn new(workload: &[ProcessSpec], aging_interval: Ticks) -> Self {
        let procs: Vec<Process> = workload.iter().map(Process::from_spec).collect();

        let mut by_name: Vec<usize> = (0..procs.len()).collect();
        by_name.sort_by(|&a, &b| procs[a].name.cmp(&procs[b].name));
        let mut name_ranks = vec![0usize; procs.len()];
        for (rank, &i) in by_name.iter().enumerate() {
            name_ranks[i] = rank;
        }

        let mut arrival_order: Vec<usize> = (0..procs.len()).collect();
        arrival_order.sort_by_key(|&i| procs[i].arrival_time);
        let time = procs[arrival_order[0]].arrival_time;

        Self {
            procs,
            queue: KeyedPriorityQueue::new(),
            name_ranks,
            arrival_order,
            cursor: 0,
            time,
            aging_interval,
        }
    }

    fn rank(&self, i: usize) -> Rank {
        Rank {
            priority: self.procs[i].priority,
            arrival: self.procs[i].arrival_time,
            name_rank: self.name_ranks[i],
        }
    }

    fn enqueue(&mut self, i: usize) {
        let rank = self.rank(i);
        self.queue.push(i, rank);
    }

    /// Admits every process whose arrival is exactly the current tick.
    fn admit_arrivals(&mut self) {
        while self.cursor < self.arrival_order.len() {
            let i = self.arrival_order[self.cursor];
            if self.procs[i].arrival_time != self.time {
                break;
            }
            self.enqueue(i);
            self.cursor += 1;
        }
    }

    /// Aging pass over everything currently waiting: a process whose wait
    /// since its last (re-)queueing hits a multiple of the interval moves
    /// one priority level up, floored at 1.
    fn age_waiting(&mut self) {
        if self.aging_interval == 0 {
            return;
        }
        let waiting: Vec<usize> = self.queue.iter().map(|(&i, _)| i).collect();
        for i in waiting {
            let p = &mut self.procs[i];
            if (self.time - p.last_enqueue) % self.aging_interval == 0 {
                let aged = p.priority.saturating_sub(1).max(1);
                if aged != p.priority {
                    p.priority = aged;
                    debug!(process = %p.name, priority = aged, now = self.time, "aged");
                }
                let rank = self.rank(i);
                self.queue
                    .set_priority(&i, rank)
                    .expect("aged process is queued");
            }
        }
    }

    fn pending(&self) -> bool {
        !self.queue.is_empty() || self.cursor < self.arrival_order.len()
    }
}

impl Scheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        "Priority"
    }

    fn run(
        &self,
        workload: &[ProcessSpec],
        params: &SimParams,
    ) -> Result<SchedulerResult, SimError> {
        validate_workload(workload)?;

        let mut run = PriorityRun::new(workload, params.aging_interval);
        let mut log = ExecutionLog::new();
        let mut last = Slot::Unset;

        run.admit_arrivals();

        while run.pending() {
            let current = run.queue.pop().map(|(i, _)| i);
            let slot = current.map_or(Slot::Idle, Slot::Proc);

            // The trace records the pop, even if a switch span follows and
            // a different process ends up running first.
            if let Some(c) = current {
                log.record(&run.procs[c].name);
            }

            if matches!(last, Slot::Proc(_)) && slot != last {
                if let Some(c) = current {
                    run.enqueue(c);
                }
                for _ in 0..params.context_switch {
                    run.time += 1;
                    run.age_waiting();
                    run.admit_arrivals();
                }
                last = slot;
                continue;
            }
            last = slot;

            run.time += 1;
            if let Some(c) = current {
                run.procs[c].remaining_time -= 1;
            }

            run.age_waiting();
            run.admit_arrivals();

            let Some(c) = current else {
                continue;
            };

            if run.procs[c].remaining_time > 0 {
                run.procs[c].last_enqueue = run.time;
                run.enqueue(c);
            } else {
                run.procs[c].complete(run.time);
                debug!(process = %run.procs[c].name, now = run.time, "completed");
            }
        }

        let metrics = run
            .procs
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
