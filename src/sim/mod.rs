pub mod workload;

pub use workload::bernoulli_workload;
