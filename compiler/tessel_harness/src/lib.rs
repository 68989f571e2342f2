//! Execution plumbing shared by the Tessel processing phases.
//!
//! - [`Harness`]: parallel map / for-each over a batch with per-item failure
//!   isolation and timing
//! - [`Memo`]: single-flight keyed cache
//! - [`SymbolLookup`]: synchronized accessor over the host symbol table
//! - [`Timings`]: per-tag wall-clock report

mod harness;
mod lookup;
mod memo;
mod timing;

pub use harness::{BatchReport, Harness, ItemFailure, TaskFailure};
pub use lookup::SymbolLookup;
pub use memo::Memo;
pub use timing::{TimingEntry, TimingReport, TimingRow, Timings};
