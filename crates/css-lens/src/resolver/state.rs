use tracing::{debug, warn};

/// Stages of one resolution run.
///
/// `Idle → Scanning → ResolvingPath → ExtractingRules → Matching → Ready`,
/// with `Error` reachable from `ResolvingPath` and `ExtractingRules`.
/// `Ready` and `Error` are terminal; the next host event starts a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveState {
    Idle,
    Scanning,
    ResolvingPath,
    ExtractingRules,
    Matching,
    Ready,
    Error,
}

impl ResolveState {
    pub fn can_transition_to(
        self,
        next: ResolveState,
    ) -> bool {
        use ResolveState::*;
        matches!(
            (self, next),
            (Idle, Scanning)
                | (Scanning, ResolvingPath)
                | (ResolvingPath, ExtractingRules)
                | (ResolvingPath, Error)
                | (ExtractingRules, Matching)
                | (ExtractingRules, Error)
                | (Matching, Ready)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ResolveState::Ready | ResolveState::Error)
    }
}

/// Tracks the state of a single run and logs each step.
#[derive(Debug)]
pub(crate) struct RunState {
    state: ResolveState,
    document: String,
    version: i32,
}

impl RunState {
    pub(crate) fn new(
        document: impl Into<String>,
        version: i32,
    ) -> Self {
        Self {
            state: ResolveState::Idle,
            document: document.into(),
            version,
        }
    }

    pub(crate) fn document(&self) -> &str {
        &self.document
    }

    pub(crate) fn state(&self) -> ResolveState {
        self.state
    }

    /// Move to `next`. Returns `false` (and stays put) on an illegal step.
    pub(crate) fn advance(
        &mut self,
        next: ResolveState,
    ) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(
                "[resolve] illegal transition {:?} -> {:?} for {} (v{})",
                self.state, next, self.document, self.version
            );
            return false;
        }
        debug!("[resolve] {} (v{}): {:?} -> {:?}", self.document, self.version, self.state, next);
        self.state = next;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/src/resolver/state_tests.rs"]
mod tests;
