//! Parallel map / for-each with per-item failure isolation.
//!
//! Every call takes a tag naming the batch, a `parallel` hint and a fallible
//! work function. A failing item (an `Err` or a panic) never aborts the batch:
//! the failure is logged with the tag, reported as an `E9001` diagnostic and
//! the item is dropped. Parallel calls run on rayon's global pool; results
//! keep input order in both modes.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;
use tessel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};

use crate::Timings;

/// Why a single work item failed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TaskFailure {
    #[error("{0}")]
    Failed(String),
    #[error("panicked: {0}")]
    Panicked(String),
}

impl TaskFailure {
    pub fn new(reason: impl fmt::Display) -> Self {
        TaskFailure::Failed(reason.to_string())
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unknown panic payload".to_string()
        };
        TaskFailure::Panicked(msg)
    }
}

impl From<String> for TaskFailure {
    fn from(reason: String) -> Self {
        TaskFailure::Failed(reason)
    }
}

impl From<&str> for TaskFailure {
    fn from(reason: &str) -> Self {
        TaskFailure::Failed(reason.to_owned())
    }
}

/// A failed item of a batch, by input position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ItemFailure {
    pub tag: String,
    pub index: usize,
    pub failure: TaskFailure,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: item {} failed: {}", self.tag, self.index, self.failure)
    }
}

/// Results of a batch plus the items that failed.
#[derive(Debug)]
pub struct BatchReport<R> {
    /// Successful results, in input order.
    pub results: Vec<R>,
    pub failures: Vec<ItemFailure>,
}

impl<R> BatchReport<R> {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs batches of work with failure isolation and timing.
///
/// `parallel` is the process-wide switch; a call runs in parallel only when
/// both the switch and the call's own hint are set.
pub struct Harness {
    parallel: bool,
    timings: Timings,
    sink: Arc<DiagnosticSink>,
}

impl Harness {
    pub fn new(parallel: bool, sink: Arc<DiagnosticSink>) -> Self {
        Harness {
            parallel,
            timings: Timings::new(),
            sink,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Run `work` over every item and hand back results and failures
    /// without logging anything.
    pub fn try_map<T, R, F>(&self, tag: &str, items: Vec<T>, parallel: bool, work: F) -> BatchReport<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R, TaskFailure> + Sync + Send,
    {
        let parallel = parallel && self.parallel;
        let count = items.len();
        let outcomes: Vec<(usize, Result<R, TaskFailure>)> =
            self.timings.measure(tag, count, parallel, || {
                if parallel {
                    items
                        .into_par_iter()
                        .enumerate()
                        .map(|(index, item)| (index, run_isolated(&work, item)))
                        .collect()
                } else {
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(index, item)| (index, run_isolated(&work, item)))
                        .collect()
                }
            });

        let mut results = Vec::with_capacity(count);
        let mut failures = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(value) => results.push(value),
                Err(failure) => failures.push(ItemFailure {
                    tag: tag.to_owned(),
                    index,
                    failure,
                }),
            }
        }
        BatchReport { results, failures }
    }

    /// Map every item, logging and dropping failures.
    #[tracing::instrument(level = "debug", skip_all, fields(tag = tag, items = items.len()))]
    pub fn map<T, R, F>(&self, tag: &str, items: Vec<T>, parallel: bool, work: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<R, TaskFailure> + Sync + Send,
    {
        let report = self.try_map(tag, items, parallel, work);
        self.log_failures(&report.failures);
        report.results
    }

    /// Like [`Harness::map`], keeping only `Some` results.
    pub fn filter_map<T, R, F>(&self, tag: &str, items: Vec<T>, parallel: bool, work: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> Result<Option<R>, TaskFailure> + Sync + Send,
    {
        self.map(tag, items, parallel, work)
            .into_iter()
            .flatten()
            .collect()
    }

    /// Run `work` for its effects, logging and skipping failures.
    pub fn for_each<T, F>(&self, tag: &str, items: Vec<T>, parallel: bool, work: F)
    where
        T: Send,
        F: Fn(T) -> Result<(), TaskFailure> + Sync + Send,
    {
        self.map(tag, items, parallel, work);
    }

    /// [`Harness::for_each`] over key-value entries.
    pub fn for_each_entry<K, V, F>(
        &self,
        tag: &str,
        entries: impl IntoIterator<Item = (K, V)>,
        parallel: bool,
        work: F,
    ) where
        K: Send,
        V: Send,
        F: Fn(K, V) -> Result<(), TaskFailure> + Sync + Send,
    {
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        self.for_each(tag, entries, parallel, |(key, value)| work(key, value));
    }

    /// Sequential for-each, whatever the parallelism switch says.
    ///
    /// For sinks that do not support concurrent writers. `work` may hold
    /// `&mut` state.
    pub fn for_each_serial<T, F>(&self, tag: &str, items: Vec<T>, mut work: F)
    where
        F: FnMut(T) -> Result<(), TaskFailure>,
    {
        let count = items.len();
        let failures = self.timings.measure(tag, count, false, || {
            let mut failures = Vec::new();
            for (index, item) in items.into_iter().enumerate() {
                let outcome = catch_unwind(AssertUnwindSafe(|| work(item)))
                    .unwrap_or_else(|payload| Err(TaskFailure::from_panic(&*payload)));
                if let Err(failure) = outcome {
                    failures.push(ItemFailure {
                        tag: tag.to_owned(),
                        index,
                        failure,
                    });
                }
            }
            failures
        });
        self.log_failures(&failures);
    }

    /// Run a single step with the same isolation as a batch item.
    ///
    /// Used at round boundaries: a failure is logged and reported, and
    /// `None` is returned.
    pub fn guard<R>(&self, tag: &str, step: impl FnOnce() -> Result<R, TaskFailure>) -> Option<R> {
        let outcome = self.timings.measure(tag, 1, false, || {
            catch_unwind(AssertUnwindSafe(step))
                .unwrap_or_else(|payload| Err(TaskFailure::from_panic(&*payload)))
        });
        match outcome {
            Ok(value) => Some(value),
            Err(failure) => {
                self.log_failures(&[ItemFailure {
                    tag: tag.to_owned(),
                    index: 0,
                    failure,
                }]);
                None
            }
        }
    }

    fn log_failures(&self, failures: &[ItemFailure]) {
        for failure in failures {
            tracing::error!(
                tag = %failure.tag,
                index = failure.index,
                reason = %failure.failure,
                "task failed"
            );
            self.sink.report(
                Diagnostic::error(ErrorCode::E9001)
                    .with_message(failure.to_string())
                    .with_note(ErrorCode::E9001.description()),
            );
        }
    }
}

fn run_isolated<T, R, F>(work: &F, item: T) -> Result<R, TaskFailure>
where
    F: Fn(T) -> Result<R, TaskFailure>,
{
    catch_unwind(AssertUnwindSafe(|| work(item)))
        .unwrap_or_else(|payload| Err(TaskFailure::from_panic(&*payload)))
}
