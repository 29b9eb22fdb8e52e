use serde::{Deserialize, Serialize};

pub type Ticks = u64;

/// Input descriptor for one schedulable unit. Wire names match the fixture
/// format consumed by external test loaders (`arrival`, `burst`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessSpec {
    pub name: String,
    #[serde(rename = "arrival")]
    pub arrival_time: Ticks,
    #[serde(rename = "burst")]
    pub burst_time: Ticks,
    pub priority: u32,
    /// Initial per-dispatch quantum. Required by the AG engine, ignored by
    /// the others.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<Ticks>,
}

impl ProcessSpec {
    pub fn new(name: impl Into<String>, arrival: Ticks, burst: Ticks, priority: u32) -> Self {
        Self {
            name: name.into(),
            arrival_time: arrival,
            burst_time: burst,
            priority,
            quantum: None,
        }
    }

    pub fn with_quantum(mut self, quantum: Ticks) -> Self {
        self.quantum = Some(quantum);
        self
    }
}

/// Mutable working copy of a process, owned by the engine executing it.
/// Input specs are never mutated; each `run` builds its own set of these.
#[derive(Debug, Clone)]
pub struct Process {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub remaining_time: Ticks,
    pub priority: u32,
    pub completion_time: Option<Ticks>,
    /// Tick at which the process was last placed into a ready queue. The
    /// priority engine's aging clock counts from here, not from the original
    /// arrival, so it restarts on every re-queue.
    pub last_enqueue: Ticks,
}

impl Process {
    pub fn from_spec(spec: &ProcessSpec) -> Self {
        Self {
            name: spec.name.clone(),
            arrival_time: spec.arrival_time,
            burst_time: spec.burst_time,
            remaining_time: spec.burst_time,
            priority: spec.priority,
            completion_time: None,
            last_enqueue: spec.arrival_time,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_time == 0
    }

    /// Marks completion at `now`. Must fire exactly once, at the tick
    /// `remaining_time` reaches 0.
    pub fn complete(&mut self, now: Ticks) {
        debug_assert_eq!(self.remaining_time, 0, "completing {} early", self.name);
        debug_assert!(
            self.completion_time.is_none(),
            "process {} completed twice",
            self.name
        );
        self.completion_time = Some(now);
    }
}

/// AG variant of the working copy: carries the adaptively-sized quantum and
/// a lifetime log of every value assigned to it.
#[derive(Debug, Clone)]
pub struct AgProcess {
    pub name: String,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub remaining_time: Ticks,
    pub priority: u32,
    pub quantum: Ticks,
    pub completion_time: Option<Ticks>,
    pub quantum_history: Vec<Ticks>,
}

impl AgProcess {
    pub fn new(spec: &ProcessSpec, quantum: Ticks) -> Self {
        Self {
            name: spec.name.clone(),
            arrival_time: spec.arrival_time,
            burst_time: spec.burst_time,
            remaining_time: spec.burst_time,
            priority: spec.priority,
            quantum,
            completion_time: None,
            quantum_history: vec![quantum],
        }
    }

    /// Assigns the quantum for the next dispatch and logs it. Completion is
    /// logged as 0, after which the process is never re-queued.
    pub fn set_quantum(&mut self, quantum: Ticks) {
        self.quantum = quantum;
        self.quantum_history.push(quantum);
    }
}
