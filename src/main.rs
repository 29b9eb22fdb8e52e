use average::Estimate;
use sched_model::{
    AgScheduler, PriorityScheduler, RoundRobinScheduler, Scheduler, SimParams, SjfScheduler,
    sim::bernoulli_workload,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let workload = bernoulli_workload(40, 0.25, 0.4, 2, 7, 0);
    let params = SimParams {
        context_switch: 1,
        quantum: 3,
        aging_interval: 4,
    };

    println!("workload: {} processes", workload.len());
    for spec in &workload {
        println!(
            "  {} arrival={} burst={} priority={} quantum={:?}",
            spec.name, spec.arrival_time, spec.burst_time, spec.priority, spec.quantum
        );
    }

    let engines: [&dyn Scheduler; 4] = [
        &SjfScheduler,
        &RoundRobinScheduler,
        &PriorityScheduler,
        &AgScheduler,
    ];

    for engine in engines {
        let result = match engine.run(&workload, &params) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("[{}] invalid workload: {err}", engine.name());
                std::process::exit(1);
            }
        };

        println!("\n=== {} ===", engine.name());
        println!("execution order: {:?}", result.execution_order);
        for m in &result.process_results {
            println!(
                "  {} | waiting = {} | turnaround = {}",
                m.name, m.waiting_time, m.turnaround_time
            );
        }
        println!("average waiting time    = {:.2}", result.average_waiting_time);
        println!("average turnaround time = {:.2}", result.average_turnaround_time);

        // Unrounded means as a sanity reference next to the reported
        // two-decimal averages.
        let wait_mean = avg(result.process_results.iter().map(|m| m.waiting_time as f64));
        let tat_mean = avg(
            result
                .process_results
                .iter()
                .map(|m| m.turnaround_time as f64),
        );
        println!("mean waiting / turnaround = {wait_mean:.4} / {tat_mean:.4}");
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
