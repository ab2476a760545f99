//! Parallel execution of planned merges

mod report;
mod runner;

pub use report::{NodeFailure, RunReport};
pub use runner::MergeRunner;
