//! Review pipeline state machine

use serde::{Deserialize, Serialize};

/// Stage of a single pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PipelineStage {
    #[default]
    Idle,
    AcquiringContext,
    Reviewing,
    /// The AI reviewer produced the review
    Succeeded,
    /// The fallback review was used
    FallenBack,
    Notifying,
    Done,
    /// No code was provided
    Failed,
}

impl PipelineStage {
    /// Stages reachable from this one
    pub fn valid_transitions(&self) -> &'static [PipelineStage] {
        use PipelineStage::*;
        match self {
            Idle => &[AcquiringContext, Failed],
            AcquiringContext => &[Reviewing, Failed],
            Reviewing => &[Succeeded, FallenBack],
            Succeeded | FallenBack => &[Notifying, Done],
            Notifying => &[Done],
            Done | Failed => &[],
        }
    }

    /// Check whether moving to `to` is allowed
    pub fn can_transition_to(&self, to: &PipelineStage) -> bool {
        self.valid_transitions().contains(to)
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "Waiting to start",
            PipelineStage::AcquiringContext => "Acquiring code context",
            PipelineStage::Reviewing => "Generating review",
            PipelineStage::Succeeded => "AI review generated",
            PipelineStage::FallenBack => "Fallback review generated",
            PipelineStage::Notifying => "Sending notification",
            PipelineStage::Done => "Done",
            PipelineStage::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Current stage plus the path taken to reach it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Stages visited before the current one, oldest first
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Move to `to`; returns false and stays put if the move is not allowed
    pub fn advance(&mut self, to: PipelineStage) -> bool {
        if !self.stage.can_transition_to(&to) {
            tracing::warn!(from = ?self.stage, to = ?to, "Rejected pipeline transition");
            return false;
        }
        tracing::debug!(from = ?self.stage, to = ?to, "Pipeline transition");
        self.history.push(self.stage);
        self.stage = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = PipelineState::new();
        for stage in [
            PipelineStage::AcquiringContext,
            PipelineStage::Reviewing,
            PipelineStage::FallenBack,
            PipelineStage::Notifying,
            PipelineStage::Done,
        ] {
            assert!(state.advance(stage));
        }
        assert!(state.stage().is_terminal());
        assert_eq!(state.history().len(), 5);
    }

    #[test]
    fn test_failed_only_before_review() {
        assert!(PipelineStage::Idle.can_transition_to(&PipelineStage::Failed));
        assert!(PipelineStage::AcquiringContext.can_transition_to(&PipelineStage::Failed));
        assert!(!PipelineStage::Reviewing.can_transition_to(&PipelineStage::Failed));
        assert!(!PipelineStage::Notifying.can_transition_to(&PipelineStage::Failed));
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut state = PipelineState::new();
        assert!(!state.advance(PipelineStage::Reviewing));
        assert_eq!(state.stage(), PipelineStage::Idle);
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_no_retry_loop() {
        // nothing leads back to Reviewing once a review exists
        for stage in [
            PipelineStage::Succeeded,
            PipelineStage::FallenBack,
            PipelineStage::Notifying,
            PipelineStage::Done,
        ] {
            assert!(!stage.can_transition_to(&PipelineStage::Reviewing));
        }
    }
}
