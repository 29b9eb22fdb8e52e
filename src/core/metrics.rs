use serde::Serialize;

use super::process::Ticks;

/// Per-process timing outcome. `waiting_time = turnaround_time - burst_time`
/// and `turnaround_time = completion_time - arrival_time`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMetrics {
    pub name: String,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

impl ProcessMetrics {
    /// Derives metrics from the completion invariant. Panics in debug builds
    /// if the process would have negative waiting time.
    pub fn from_completion(
        name: &str,
        arrival: Ticks,
        burst: Ticks,
        completion: Ticks,
    ) -> Self {
        debug_assert!(
            completion >= arrival + burst,
            "{name} finished before doing all its work"
        );
        let turnaround = completion - arrival;
        Self {
            name: name.to_owned(),
            waiting_time: turnaround - burst,
            turnaround_time: turnaround,
        }
    }
}

/// Dispatch trace with consecutive duplicates collapsed: re-dispatching the
/// same process immediately does not append a new entry.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    entries: Vec<String>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str) {
        if self.entries.last().map(String::as_str) != Some(name) {
            self.entries.push(name.to_owned());
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.entries
    }
}

/// Output shape of a single `run` invocation, serialized with the field
/// names external comparators expect.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerResult {
    pub execution_order: Vec<String>,
    pub process_results: Vec<ProcessMetrics>,
    pub average_waiting_time: f64,
    pub average_turnaround_time: f64,
}

impl SchedulerResult {
    /// Aggregates the final trace and per-process metrics. Returns `None`
    /// for an empty metric set rather than dividing by zero.
    pub fn from_parts(log: ExecutionLog, process_results: Vec<ProcessMetrics>) -> Option<Self> {
        if process_results.is_empty() {
            return None;
        }
        let count = process_results.len();
        let total_wt: Ticks = process_results.iter().map(|m| m.waiting_time).sum();
        let total_tat: Ticks = process_results.iter().map(|m| m.turnaround_time).sum();
        Some(Self {
            execution_order: log.into_inner(),
            process_results,
            average_waiting_time: round2(total_wt, count),
            average_turnaround_time: round2(total_tat, count),
        })
    }
}

/// `total / count` rounded to two decimal places, half away from zero.
/// Totals are non-negative, so this matches round-half-up.
pub fn round2(total: Ticks, count: usize) -> f64 {
    (total as f64 / count as f64 * 100.0).round() / 100.0
}
