//! Deferred, thread-safe diagnostic sink.
//!
//! Features:
//! - Append from any thread (harness workers report directly)
//! - Suppression of exact duplicates
//! - Deterministic ordering on flush, independent of task scheduling
//! - `ErrorGuaranteed` proof that errors were emitted

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorGuaranteed};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SinkConfig {
    /// Drop a diagnostic identical to one already collected.
    pub deduplicate: bool,
    /// Sort by (location, code, subject, message) on flush.
    pub sort: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            deduplicate: true,
            sort: true,
        }
    }
}

impl SinkConfig {
    /// Keep every diagnostic in arrival order (for testing).
    pub fn raw() -> Self {
        SinkConfig {
            deduplicate: false,
            sort: false,
        }
    }
}

#[derive(Default, Debug)]
struct SinkState {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<Diagnostic>,
    error_count: usize,
}

/// Collects diagnostics during processing and hands them out only on flush.
///
/// Shared by reference between threads; every method takes `&self`.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    state: Mutex<SinkState>,
    config: SinkConfig,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SinkConfig) -> Self {
        DiagnosticSink {
            state: Mutex::default(),
            config,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was a duplicate.
    pub fn report(&self, diag: Diagnostic) -> bool {
        let mut state = self.state.lock();
        if self.config.deduplicate && !state.seen.insert(diag.clone()) {
            return false;
        }
        if diag.is_error() {
            state.error_count += 1;
        }
        state.diagnostics.push(diag);
        true
    }

    /// Report an error and get proof it was emitted.
    ///
    /// A suppressed duplicate still yields proof: the identical error is
    /// already in the sink.
    pub fn emit_error(&self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error");
        self.report(diag);
        ErrorGuaranteed::new()
    }

    pub fn error_count(&self) -> usize {
        self.state.lock().error_count
    }

    /// Proof of errors, if any were reported.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count())
    }

    pub fn len(&self) -> usize {
        self.state.lock().diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the collected diagnostics, in arrival order.
    pub fn peek(&self) -> Vec<Diagnostic> {
        self.state.lock().diagnostics.clone()
    }

    /// Drain all diagnostics in deterministic order.
    ///
    /// Clears the sink, including the duplicate filter, so a later flush
    /// only returns what was reported after this one.
    pub fn flush(&self) -> Vec<Diagnostic> {
        let mut state = self.state.lock();
        let mut result = std::mem::take(&mut state.diagnostics);
        state.seen.clear();
        state.error_count = 0;
        drop(state);

        if self.config.sort {
            result.sort_by(|a, b| {
                (&a.location, a.code, &a.subject, &a.message)
                    .cmp(&(&b.location, b.code, &b.subject, &b.message))
            });
        }
        result
    }
}
