//! Round orchestration.
//!
//! The host calls [`Driver::process`] once per round. Rounds accumulate
//! descriptors in a single [`Aggregator`]; the round flagged
//! `processing_over` finalizes the run:
//!
//! 1. finish aggregation and validate hash contracts
//! 2. emit every finished model through the [`CodeSink`]
//! 3. flush diagnostics
//! 4. build and write per-package extensions (unless disabled)
//! 5. report timings
//!
//! A failure inside a round is caught at the round boundary and reported as
//! `E9001`; finalization still runs.

use std::sync::Arc;

use tessel_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode, ErrorGuaranteed};
use tessel_harness::{Harness, SymbolLookup, TimingReport};
use tessel_ir::{DeclId, SymbolTable};
use tessel_model::{validate_hash_contracts, Aggregator, ModelDescriptor, ModelSet};

use crate::config::ProcessorConfig;
use crate::emit::{build_extension_file, Artifact, CodeSink, ModelEmitter, OutlineEmitter};

/// One processing round as signalled by the host.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Round {
    /// Annotated declarations that became visible in this round.
    pub elements: Vec<DeclId>,
    /// Set on the host's last round.
    pub processing_over: bool,
}

impl Round {
    pub fn new(elements: Vec<DeclId>) -> Self {
        Round {
            elements,
            processing_over: false,
        }
    }

    /// The final round. Hosts usually deliver no new elements with it.
    pub fn last(elements: Vec<DeclId>) -> Self {
        Round {
            elements,
            processing_over: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error("processing is already finalized")]
    AlreadyFinalized,
}

/// Everything the final round produced.
pub struct ProcessingOutcome {
    pub models: ModelSet,
    /// Paths of emitted model files, in emission order.
    pub emitted: Vec<String>,
    /// Paths of emitted extension files.
    pub extensions: Vec<String>,
    pub violations: usize,
    /// Diagnostics of the whole run, deterministically ordered.
    pub diagnostics: Vec<Diagnostic>,
    pub timings: TimingReport,
    pub errors: Option<ErrorGuaranteed>,
}

impl ProcessingOutcome {
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }
}

enum State {
    Accumulating(Aggregator),
    Finalized,
}

/// Drives the aggregator across the host's rounds.
pub struct Driver<S> {
    lookup: SymbolLookup<S>,
    config: ProcessorConfig,
    harness: Harness,
    emitter: Box<dyn ModelEmitter>,
    state: State,
    round: u32,
}

impl<S> Driver<S>
where
    S: SymbolTable + Send + Sync,
{
    pub fn new(host: S, config: ProcessorConfig, sink: Arc<DiagnosticSink>) -> Self {
        Driver {
            lookup: SymbolLookup::new(host),
            harness: Harness::new(config.enable_parallelism, sink),
            state: State::Accumulating(Aggregator::new(config.model.clone())),
            config,
            emitter: Box::new(OutlineEmitter),
            round: 0,
        }
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: Box<dyn ModelEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// The host, for registering declarations between rounds.
    pub fn lookup(&self) -> &SymbolLookup<S> {
        &self.lookup
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn sink(&self) -> &DiagnosticSink {
        self.harness.sink()
    }

    /// Rounds processed so far.
    pub fn rounds(&self) -> u32 {
        self.round
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized)
    }

    /// The accumulating aggregator, until finalization.
    pub fn aggregator(&self) -> Option<&Aggregator> {
        match &self.state {
            State::Accumulating(aggregator) => Some(aggregator),
            State::Finalized => None,
        }
    }

    /// Process one round. Returns the outcome on the final round.
    pub fn process(
        &mut self,
        round: Round,
        out: &mut dyn CodeSink,
    ) -> Result<Option<ProcessingOutcome>, DriverError> {
        let aggregator = self.take_aggregator()?;
        self.run_round(&aggregator, &round.elements, round.processing_over);
        if !round.processing_over {
            self.state = State::Accumulating(aggregator);
            return Ok(None);
        }
        Ok(Some(self.finalize(aggregator, out)))
    }

    /// Run an empty final round.
    pub fn finish(&mut self, out: &mut dyn CodeSink) -> Result<ProcessingOutcome, DriverError> {
        let aggregator = self.take_aggregator()?;
        self.run_round(&aggregator, &[], true);
        Ok(self.finalize(aggregator, out))
    }

    fn take_aggregator(&mut self) -> Result<Aggregator, DriverError> {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Accumulating(aggregator) => Ok(aggregator),
            State::Finalized => Err(DriverError::AlreadyFinalized),
        }
    }

    fn run_round(&mut self, aggregator: &Aggregator, elements: &[DeclId], last: bool) {
        self.round += 1;
        let number = self.round;
        let span = tracing::info_span!("round", round = number, elements = elements.len(), last);
        let _entered = span.enter();

        let summary = self.harness.guard("round", || {
            Ok(aggregator.process_round(number, elements, &self.lookup, &self.harness))
        });
        if let Some(summary) = summary {
            tracing::debug!(
                created = summary.created,
                declared = summary.declared,
                imported = summary.imported,
                inherited = summary.inherited,
                resolved = summary.resolved,
                pending = summary.pending,
                "round processed"
            );
        }
    }

    fn finalize(&self, aggregator: Aggregator, out: &mut dyn CodeSink) -> ProcessingOutcome {
        let sink = self.harness.sink();
        let models = aggregator.finish(sink);
        let violations = self
            .harness
            .guard("validate", || {
                Ok(validate_hash_contracts(&models, &self.lookup, &self.harness))
            })
            .unwrap_or(0);

        let mut emitted = Vec::new();
        let emittable: Vec<&ModelDescriptor> = models.emittable().collect();
        self.harness.for_each_serial("emit models", emittable, |model| {
            let artifact = self.emitter.render(model);
            if let Some(path) = write_artifact(&mut *out, artifact, sink) {
                emitted.push(path);
            }
            Ok(())
        });
        let mut diagnostics = sink.flush();

        let mut extensions = Vec::new();
        if self.config.disable_auxiliary_generation {
            tracing::debug!("auxiliary generation disabled");
        } else {
            let packages: Vec<_> = models.by_package().into_iter().collect();
            let artifacts = self.harness.map("build extensions", packages, true, |(package, members)| {
                Ok(build_extension_file(&package, &members))
            });
            self.harness.for_each_serial("write extensions", artifacts, |artifact| {
                if let Some(path) = write_artifact(&mut *out, artifact, sink) {
                    extensions.push(path);
                }
                Ok(())
            });
            diagnostics.extend(sink.flush());
        }

        let timings = self.harness.timings().report();
        if self.config.log_timings {
            tracing::info!(total = ?timings.total(), "processor timings\n{timings}");
        }

        let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
        tracing::info!(
            models = models.len(),
            emitted = emitted.len(),
            extensions = extensions.len(),
            errors = error_count,
            "processing finished"
        );
        ProcessingOutcome {
            models,
            emitted,
            extensions,
            violations,
            diagnostics,
            timings,
            errors: ErrorGuaranteed::from_error_count(error_count),
        }
    }
}

/// Write `artifact`, reporting a failure as `E9002`. Returns the written path.
fn write_artifact(out: &mut dyn CodeSink, artifact: Artifact, sink: &DiagnosticSink) -> Option<String> {
    let path = artifact.path.clone();
    match out.write(artifact) {
        Ok(()) => Some(path),
        Err(error) => {
            tracing::error!(%path, %error, "write failed");
            sink.report(
                Diagnostic::error(ErrorCode::E9002)
                    .with_message(error.to_string())
                    .with_note(ErrorCode::E9002.description()),
            );
            None
        }
    }
}
