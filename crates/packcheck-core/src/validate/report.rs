use crate::diag::DiagnosticLog;
use crate::policy::ValidationMode;
use crate::violation::Violation;

/// Signals that the scan must stop now.
#[derive(Debug)]
pub(crate) struct Halt;

/// Violation collector shared by every pipeline step.
///
/// `push` stops the scan only in fail-fast mode; `halt` always stops it and
/// is used by the archive-level gates.
pub(crate) struct Report<'a> {
    mode: ValidationMode,
    log: &'a DiagnosticLog,
    pub(crate) violations: Vec<Violation>,
    pub(crate) entries_scanned: usize,
}

impl<'a> Report<'a> {
    pub(crate) fn new(mode: ValidationMode, log: &'a DiagnosticLog) -> Self {
        Self {
            mode,
            log,
            violations: Vec::new(),
            entries_scanned: 0,
        }
    }

    fn record(&mut self, violation: Violation) {
        tracing::debug!(kind = %violation.kind, "{}", violation);
        self.log.trace(format!("FAIL {}", violation));
        self.violations.push(violation);
    }

    pub(crate) fn push(&mut self, violation: Violation) -> Result<(), Halt> {
        self.record(violation);
        match self.mode {
            ValidationMode::FailFast => Err(Halt),
            ValidationMode::Accumulate => Ok(()),
        }
    }

    pub(crate) fn halt(&mut self, violation: Violation) -> Result<(), Halt> {
        self.record(violation);
        Err(Halt)
    }
}
