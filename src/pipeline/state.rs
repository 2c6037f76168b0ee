//! # Pipeline State Module
//!
//! Stati della run e unica funzione di transizione ammessa.
//!
//! ```text
//! Idle -> SourceReady -> Compressed -> Stylizing -> Completed
//!   \__________\______________\____________\-----> Failed
//! ```

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Lifecycle of a single stylization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    SourceReady,
    Compressed,
    Stylizing,
    Completed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal edge
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, SourceReady)
            | (SourceReady, Compressed)
            | (Compressed, Stylizing)
            | (Stylizing, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SourceReady => "source ready",
            Self::Compressed => "compressed",
            Self::Stylizing => "stylizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Current state plus the ordered list of states visited in this run
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self {
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Back to `Idle` with a fresh history
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move to `next`, rejecting edges outside the lifecycle
    pub fn transition(&mut self, next: PipelineState) -> PipelineResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        info!("Pipeline: {} -> {}", self.state.description(), next.description());
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Enter `Failed` from wherever the run stopped; a terminal run stays put
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            info!("Pipeline: {} -> failed", self.state.description());
            self.state = PipelineState::Failed;
            self.history.push(PipelineState::Failed);
        }
    }
}
