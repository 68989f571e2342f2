//! Wall-clock instrumentation for harness calls.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// One measured harness call.
#[derive(Clone, Debug)]
pub struct TimingEntry {
    pub tag: String,
    pub items: usize,
    pub parallel: bool,
    pub elapsed: Duration,
    /// Started while another measured call was running.
    pub nested: bool,
}

/// Append-only log of measured calls. Safe to share across threads.
#[derive(Debug, Default)]
pub struct Timings {
    entries: Mutex<Vec<TimingEntry>>,
    open: AtomicUsize,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and record its duration under `tag`.
    pub fn measure<R>(&self, tag: &str, items: usize, parallel: bool, f: impl FnOnce() -> R) -> R {
        let nested = self.open.fetch_add(1, Ordering::AcqRel) > 0;
        let _open = OpenCall(&self.open);
        let start = Instant::now();
        let result = f();
        self.record(TimingEntry {
            tag: tag.to_owned(),
            items,
            parallel,
            elapsed: start.elapsed(),
            nested,
        });
        result
    }

    pub fn record(&self, entry: TimingEntry) {
        self.entries.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<TimingEntry> {
        self.entries.lock().clone()
    }

    /// Summarize all calls, one row per tag. The total only counts calls
    /// that were not nested in another measured call.
    pub fn report(&self) -> TimingReport {
        let mut rows: FxHashMap<String, TimingRow> = FxHashMap::default();
        let mut total = Duration::ZERO;
        for entry in self.entries.lock().iter() {
            if !entry.nested {
                total += entry.elapsed;
            }
            let row = rows.entry(entry.tag.clone()).or_insert_with(|| TimingRow {
                tag: entry.tag.clone(),
                calls: 0,
                items: 0,
                parallel_calls: 0,
                total: Duration::ZERO,
            });
            row.calls += 1;
            row.items += entry.items;
            row.total += entry.elapsed;
            if entry.parallel {
                row.parallel_calls += 1;
            }
        }
        let mut rows: Vec<TimingRow> = rows.into_values().collect();
        rows.sort_by(|a, b| a.tag.cmp(&b.tag));
        TimingReport { rows, total }
    }
}

/// Closes a measured call, even when it unwinds.
struct OpenCall<'a>(&'a AtomicUsize);

impl Drop for OpenCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Aggregated timings for one tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimingRow {
    pub tag: String,
    pub calls: usize,
    pub items: usize,
    pub parallel_calls: usize,
    pub total: Duration,
}

/// Per-tag summary, sorted by tag.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TimingReport {
    pub rows: Vec<TimingRow>,
    total: Duration,
}

impl TimingReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Wall-clock time of the outermost calls.
    pub fn total(&self) -> Duration {
        self.total
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<32} {:>6} {:>8} {:>9} {:>12}",
            "task", "calls", "items", "parallel", "total"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<32} {:>6} {:>8} {:>9} {:>12.3?}",
                row.tag, row.calls, row.items, row.parallel_calls, row.total
            )?;
        }
        write!(f, "{:<32} {:>6} {:>8} {:>9} {:>12.3?}", "total", "", "", "", self.total())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn report_groups_by_tag() {
        let timings = Timings::new();
        let value = timings.measure("collect", 10, true, || 7);
        assert_eq!(value, 7);
        timings.measure("collect", 5, false, || ());
        timings.measure("emit", 3, false, || ());

        let report = timings.report();
        let summary: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.tag.as_str(), r.calls, r.items, r.parallel_calls))
            .collect();
        assert_eq!(summary, vec![("collect", 2, 15, 1), ("emit", 1, 3, 0)]);
    }

    #[test]
    fn display_has_header_and_total() {
        let timings = Timings::new();
        timings.measure("validate", 1, false, || ());
        let text = timings.report().to_string();
        assert!(text.starts_with("task"));
        assert!(text.contains("validate"));
        assert!(text.lines().last().is_some_and(|l| l.starts_with("total")));
    }

    #[test]
    fn nested_calls_are_not_counted_twice() {
        let timings = Timings::new();
        timings.measure("round", 1, false, || {
            timings.measure("collect", 4, true, || std::thread::sleep(Duration::from_millis(5)));
        });
        timings.measure("emit", 2, false, || ());

        let entries = timings.entries();
        let nested: Vec<_> = entries.iter().map(|e| (e.tag.as_str(), e.nested)).collect();
        assert_eq!(nested, vec![("collect", true), ("round", false), ("emit", false)]);

        let report = timings.report();
        let round = entries[1].elapsed;
        let emit = entries[2].elapsed;
        assert_eq!(report.total(), round + emit);
        let summed: Duration = report.rows.iter().map(|r| r.total).sum();
        assert!(report.total() < summed);
    }
}
