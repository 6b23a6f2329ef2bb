//! Per-invocation state machine.
//!
//! ```text
//! Started → ProbeSent → ProbeSucceeded ─┐
//!                     → ProbeFailed ────┴→ MetricEmittedIfSuccess → LogEmitted → Done
//! ```
//!
//! There are no loops and no retries; `Done` is always reached.

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Started,
    ProbeSent,
    ProbeSucceeded,
    ProbeFailed,
    MetricEmittedIfSuccess,
    LogEmitted,
    Done,
}

impl InvocationState {
    /// The state that follows this one. `probe_ok` only matters after `ProbeSent`.
    pub fn next(self, probe_ok: bool) -> Self {
        match self {
            InvocationState::Started => InvocationState::ProbeSent,
            InvocationState::ProbeSent if probe_ok => InvocationState::ProbeSucceeded,
            InvocationState::ProbeSent => InvocationState::ProbeFailed,
            InvocationState::ProbeSucceeded | InvocationState::ProbeFailed => {
                InvocationState::MetricEmittedIfSuccess
            }
            InvocationState::MetricEmittedIfSuccess => InvocationState::LogEmitted,
            InvocationState::LogEmitted | InvocationState::Done => InvocationState::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == InvocationState::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvocationState::Started => "started",
            InvocationState::ProbeSent => "probe_sent",
            InvocationState::ProbeSucceeded => "probe_succeeded",
            InvocationState::ProbeFailed => "probe_failed",
            InvocationState::MetricEmittedIfSuccess => "metric_emitted_if_success",
            InvocationState::LogEmitted => "log_emitted",
            InvocationState::Done => "done",
        }
    }
}

impl std::fmt::Display for InvocationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and traces state transitions for one invocation.
#[derive(Debug)]
pub(crate) struct StateTracker {
    state: InvocationState,
    probe_ok: bool,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        tracing::debug!(state = %InvocationState::Started, "Invocation state");
        Self {
            state: InvocationState::Started,
            probe_ok: false,
        }
    }

    pub(crate) fn advance(&mut self) -> InvocationState {
        self.state = self.state.next(self.probe_ok);
        tracing::debug!(state = %self.state, "Invocation state");
        self.state
    }

    /// Leave `ProbeSent` with the probe's classification.
    pub(crate) fn probe_finished(&mut self, ok: bool) -> InvocationState {
        self.probe_ok = ok;
        self.advance()
    }

    /// Jump to `Done`, e.g. after a log sink failure.
    pub(crate) fn finish(&mut self) -> InvocationState {
        if !self.state.is_terminal() {
            self.state = InvocationState::Done;
            tracing::debug!(state = %self.state, "Invocation state");
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(probe_ok: bool) -> Vec<InvocationState> {
        let mut state = InvocationState::Started;
        let mut path = vec![state];
        while !state.is_terminal() {
            state = state.next(probe_ok);
            path.push(state);
        }
        path
    }

    #[test]
    fn test_success_path() {
        assert_eq!(
            walk(true),
            vec![
                InvocationState::Started,
                InvocationState::ProbeSent,
                InvocationState::ProbeSucceeded,
                InvocationState::MetricEmittedIfSuccess,
                InvocationState::LogEmitted,
                InvocationState::Done,
            ]
        );
    }

    #[test]
    fn test_failure_path_still_reaches_done() {
        let path = walk(false);
        assert_eq!(path[2], InvocationState::ProbeFailed);
        assert_eq!(path.last(), Some(&InvocationState::Done));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_done_is_absorbing() {
        assert_eq!(InvocationState::Done.next(true), InvocationState::Done);
    }

    #[test]
    fn test_tracker_reaches_done() {
        let mut tracker = StateTracker::new();
        assert_eq!(tracker.advance(), InvocationState::ProbeSent);
        assert_eq!(tracker.probe_finished(true), InvocationState::ProbeSucceeded);
        assert_eq!(tracker.advance(), InvocationState::MetricEmittedIfSuccess);
        assert_eq!(tracker.finish(), InvocationState::Done);
        assert_eq!(tracker.finish(), InvocationState::Done);
    }
}
