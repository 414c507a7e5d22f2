//! Domain types.

mod report;

pub use report::{CopyOutcome, CopyReport, JobReport};
