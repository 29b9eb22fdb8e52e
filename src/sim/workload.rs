use rand::prelude::*;

use crate::core::{ProcessSpec, Ticks};

/// Synthetic workload with Bernoulli arrivals: at every tick of the window
/// a process arrives with probability `p_arrival`, short-burst with
/// probability `p_short`. Priorities are drawn from 1..=5 and each spec
/// gets a starting quantum so the same list feeds all four policies.
/// Seeded, so a given seed always yields the same workload.
pub fn bernoulli_workload(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_burst: Ticks,
    long_burst: Ticks,
    seed: u64,
) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut specs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_burst
            } else {
                long_burst
            };

            specs.push(
                ProcessSpec::new(format!("P{}", specs.len()), t, burst, rng.random_range(1..=5))
                    .with_quantum(rng.random_range(2..=6)),
            );
        }
    }

    specs
}
