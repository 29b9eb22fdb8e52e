//! Pinned end-to-end traces: one fixture-shaped workload run through all
//! four policies, with exact execution orders and metrics derived by hand.

use sched_model::{
    AgScheduler, PriorityScheduler, ProcessSpec, RoundRobinScheduler, Scheduler, SimError,
    SimParams, SjfScheduler,
};

fn fixture_workload() -> Vec<ProcessSpec> {
    // Same wire format the external fixture loader uses.
    serde_json::from_str(
        r#"[
            {"name": "P1", "arrival": 0, "burst": 5, "priority": 2, "quantum": 4},
            {"name": "P2", "arrival": 2, "burst": 3, "priority": 1, "quantum": 4},
            {"name": "P3", "arrival": 4, "burst": 1, "priority": 3, "quantum": 4}
        ]"#,
    )
    .unwrap()
}

fn fixture_params() -> SimParams {
    SimParams {
        context_switch: 0,
        quantum: 2,
        aging_interval: 0,
    }
}

fn waits(result: &sched_model::SchedulerResult) -> Vec<u64> {
    result.process_results.iter().map(|m| m.waiting_time).collect()
}

fn turnarounds(result: &sched_model::SchedulerResult) -> Vec<u64> {
    result
        .process_results
        .iter()
        .map(|m| m.turnaround_time)
        .collect()
}

#[test]
fn sjf_fixture_trace() {
    let result = SjfScheduler.run(&fixture_workload(), &fixture_params()).unwrap();
    assert_eq!(result.execution_order, vec!["P1", "P3", "P2"]);
    assert_eq!(waits(&result), vec![0, 4, 1]);
    assert_eq!(turnarounds(&result), vec![5, 7, 2]);
    assert_eq!(result.average_waiting_time, 1.67);
    assert_eq!(result.average_turnaround_time, 4.67);
}

#[test]
fn rr_fixture_trace() {
    let result = RoundRobinScheduler
        .run(&fixture_workload(), &fixture_params())
        .unwrap();
    assert_eq!(
        result.execution_order,
        vec!["P1", "P2", "P1", "P3", "P2", "P1"]
    );
    assert_eq!(waits(&result), vec![4, 3, 2]);
    assert_eq!(turnarounds(&result), vec![9, 6, 3]);
    assert_eq!(result.average_waiting_time, 3.0);
    assert_eq!(result.average_turnaround_time, 6.0);
}

#[test]
fn priority_fixture_trace() {
    let result = PriorityScheduler
        .run(&fixture_workload(), &fixture_params())
        .unwrap();
    assert_eq!(result.execution_order, vec!["P1", "P2", "P1", "P3"]);
    assert_eq!(waits(&result), vec![3, 0, 4]);
    assert_eq!(turnarounds(&result), vec![8, 3, 5]);
    assert_eq!(result.average_waiting_time, 2.33);
    assert_eq!(result.average_turnaround_time, 5.33);
}

#[test]
fn ag_fixture_trace() {
    let (result, traces) = AgScheduler.run_traced(&fixture_workload()).unwrap();
    assert_eq!(result.execution_order, vec!["P1", "P2", "P3", "P1"]);
    assert_eq!(waits(&result), vec![4, 2, 3]);
    assert_eq!(turnarounds(&result), vec![9, 5, 4]);
    assert_eq!(result.average_waiting_time, 3.0);
    assert_eq!(result.average_turnaround_time, 6.0);

    assert_eq!(traces[0].history, vec![4, 6, 0]);
    assert_eq!(traces[1].history, vec![4, 0]);
    assert_eq!(traces[2].history, vec![4, 0]);
}

#[test]
fn single_process_is_trivial_under_every_policy() {
    let workload = [ProcessSpec::new("P", 0, 4, 1).with_quantum(4)];
    let params = fixture_params();
    let engines: [&dyn Scheduler; 4] = [
        &SjfScheduler,
        &RoundRobinScheduler,
        &PriorityScheduler,
        &AgScheduler,
    ];

    for engine in engines {
        let result = engine.run(&workload, &params).unwrap();
        assert_eq!(result.execution_order, vec!["P"], "{}", engine.name());
        assert_eq!(result.process_results[0].waiting_time, 0, "{}", engine.name());
        assert_eq!(result.process_results[0].turnaround_time, 4, "{}", engine.name());
        assert_eq!(result.average_waiting_time, 0.0, "{}", engine.name());
        assert_eq!(result.average_turnaround_time, 4.0, "{}", engine.name());
    }
}

#[test]
fn every_policy_rejects_an_empty_workload() {
    let params = fixture_params();
    let engines: [&dyn Scheduler; 4] = [
        &SjfScheduler,
        &RoundRobinScheduler,
        &PriorityScheduler,
        &AgScheduler,
    ];
    for engine in engines {
        assert_eq!(
            engine.run(&[], &params).unwrap_err(),
            SimError::EmptyWorkload,
            "{}",
            engine.name()
        );
    }
}
