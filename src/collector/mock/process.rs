//! Scripted diagnostic source and liveness doubles.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use crate::collector::traits::{DiagnosticSource, Liveness, SourceError, SourceKind};

enum Reply {
    Output(String),
    Failure(String),
}

/// Diagnostic source that replays queued replies per [`SourceKind`].
///
/// Once a queue is exhausted every further call fails, which mimics gops
/// losing its target.
#[derive(Default)]
pub struct MockSource {
    replies: RefCell<HashMap<SourceKind, VecDeque<Reply>>>,
    calls: RefCell<Vec<(SourceKind, u32)>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful dump.
    pub fn push_output(&self, kind: SourceKind, text: impl Into<String>) {
        self.queue(kind, Reply::Output(text.into()));
    }

    /// Queues a failed invocation with the given command output.
    pub fn push_failure(&self, kind: SourceKind, output: impl Into<String>) {
        self.queue(kind, Reply::Failure(output.into()));
    }

    /// Queues the same pair of dumps for `cycles` cycles.
    pub fn repeat(&self, memstats: &str, stats: &str, cycles: usize) {
        for _ in 0..cycles {
            self.push_output(SourceKind::HeapGc, memstats);
            self.push_output(SourceKind::Scheduler, stats);
        }
    }

    /// Invocations seen so far, in order.
    pub fn calls(&self) -> Vec<(SourceKind, u32)> {
        self.calls.borrow().clone()
    }

    fn queue(&self, kind: SourceKind, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push_back(reply);
    }
}

impl DiagnosticSource for MockSource {
    fn dump(&self, kind: SourceKind, pid: u32) -> Result<Vec<String>, SourceError> {
        self.calls.borrow_mut().push((kind, pid));

        let reply = self
            .replies
            .borrow_mut()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Output(text)) => Ok(text.lines().map(str::to_string).collect()),
            Some(Reply::Failure(output)) => Err(SourceError::Exit {
                code: Some(1),
                output,
            }),
            None => Err(SourceError::Exit {
                code: Some(1),
                output: format!("Couldn't resolve addr or pid {}", pid),
            }),
        }
    }
}

/// Liveness double with a fixed answer.
#[derive(Debug, Default)]
pub struct MockLiveness {
    running: Cell<bool>,
    checks: Cell<usize>,
}

impl MockLiveness {
    pub fn new(running: bool) -> Self {
        Self {
            running: Cell::new(running),
            checks: Cell::new(0),
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    /// Number of liveness checks performed.
    pub fn checks(&self) -> usize {
        self.checks.get()
    }
}

impl Liveness for MockLiveness {
    fn is_running(&self, _pid: u32) -> bool {
        self.checks.set(self.checks.get() + 1);
        self.running.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_replays_in_order() {
        let source = MockSource::new();
        source.push_output(SourceKind::HeapGc, "alloc: 1 bytes\nsys: 2 bytes");
        source.push_failure(SourceKind::HeapGc, "boom");

        let lines = source.dump(SourceKind::HeapGc, 7).unwrap();
        assert_eq!(lines, vec!["alloc: 1 bytes", "sys: 2 bytes"]);

        let err = source.dump(SourceKind::HeapGc, 7).unwrap_err();
        assert!(err.to_string().contains("boom"));

        // exhausted
        assert!(source.dump(SourceKind::HeapGc, 7).is_err());
        assert!(source.dump(SourceKind::Scheduler, 7).is_err());
        assert_eq!(source.calls().len(), 4);
    }

    #[test]
    fn test_mock_liveness_counts_checks() {
        let liveness = MockLiveness::new(true);
        assert!(liveness.is_running(1));
        liveness.set_running(false);
        assert!(!liveness.is_running(1));
        assert_eq!(liveness.checks(), 2);
    }
}
