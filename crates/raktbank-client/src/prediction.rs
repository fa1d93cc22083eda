//! Prediction Workflow
//!
//! Single-slot state machine for disease prediction cycles:
//!
//! ```text
//! Idle -> Pending -> Success | Failed
//!            ^            |
//!            +-- submit --+
//! ```
//!
//! Every `begin` issues a new [`PredictionTicket`] and supersedes whatever
//! came before, including a cycle still in flight. An outcome is only
//! applied if it carries the latest ticket, so a slow response can never
//! overwrite a newer one.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::PredictionFailure;
use crate::records::{PredictionRequest, PredictionResult};
use crate::remote::RemoteClient;

/// Message shown for every failure the collaborator did not describe itself
pub const PREDICTION_FAILED: &str = "Prediction failed (no server).";

/// Sequence number of one prediction cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PredictionTicket(u64);

impl PredictionTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What the result slot shows once a cycle settles
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionOutcome {
    Success(PredictionResult),
    Failed { error: String },
}

impl PredictionOutcome {
    pub fn failed() -> Self {
        PredictionOutcome::Failed {
            error: PREDICTION_FAILED.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Success(result) => Some(result),
            PredictionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PredictionOutcome::Failed { error } => Some(error),
            PredictionOutcome::Success(_) => None,
        }
    }
}

impl From<Result<PredictionResult, PredictionFailure>> for PredictionOutcome {
    fn from(outcome: Result<PredictionResult, PredictionFailure>) -> Self {
        match outcome {
            Ok(result) => PredictionOutcome::Success(result),
            Err(PredictionFailure::Rejected(message)) => PredictionOutcome::Failed { error: message },
            Err(_) => PredictionOutcome::failed(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PredictionState {
    #[default]
    Idle,
    Pending(PredictionTicket),
    Settled(PredictionOutcome),
}

impl PredictionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, PredictionState::Pending(_))
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match self {
            PredictionState::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// A cycle that has been started but not yet sent
#[derive(Clone, Debug)]
pub struct PendingPrediction {
    pub ticket: PredictionTicket,
    pub request: PredictionRequest,
}

/// A started cycle's request, detached from the workflow so the session
/// stays usable while it is in flight
#[derive(Clone, Debug)]
pub struct PredictionCall {
    pending: PendingPrediction,
    remote: RemoteClient,
}

impl PredictionCall {
    pub fn new(pending: PendingPrediction, remote: RemoteClient) -> Self {
        Self { pending, remote }
    }

    pub fn ticket(&self) -> PredictionTicket {
        self.pending.ticket
    }

    /// Send the request and tag the answer with this cycle's ticket.
    pub async fn send(self) -> PredictionReply {
        let outcome = self.remote.predict(&self.pending.request).await;
        PredictionReply {
            ticket: self.pending.ticket,
            outcome,
        }
    }
}

/// The collaborator's answer to one cycle
#[derive(Debug)]
pub struct PredictionReply {
    pub ticket: PredictionTicket,
    pub outcome: Result<PredictionResult, PredictionFailure>,
}

#[derive(Debug, Default)]
pub struct PredictionWorkflow {
    state: PredictionState,
    issued: u64,
}

impl PredictionWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PredictionState {
        &self.state
    }

    /// Latest settled outcome, if the current cycle has one
    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        self.state.outcome()
    }

    /// Start a cycle: enter `Pending` and drop any previous result.
    pub fn begin(&mut self, request: PredictionRequest) -> PendingPrediction {
        if let PredictionState::Pending(previous) = self.state {
            debug!(superseded = previous.sequence(), "prediction superseded before it settled");
        }
        self.issued += 1;
        let ticket = PredictionTicket(self.issued);
        self.state = PredictionState::Pending(ticket);
        PendingPrediction { ticket, request }
    }

    /// Apply a cycle's outcome. Returns `false` and leaves the state alone
    /// when `ticket` is not the latest one issued.
    pub fn complete(
        &mut self,
        ticket: PredictionTicket,
        outcome: Result<PredictionResult, PredictionFailure>,
    ) -> bool {
        if ticket.sequence() != self.issued || !self.state.is_pending() {
            debug!(
                ticket = ticket.sequence(),
                latest = self.issued,
                "discarding stale prediction outcome"
            );
            return false;
        }

        match &outcome {
            Ok(result) => info!(
                ticket = ticket.sequence(),
                label = %result.label,
                confidence = result.confidence,
                "prediction succeeded"
            ),
            Err(e) => warn!(ticket = ticket.sequence(), error = %e, "prediction failed"),
        }
        self.state = PredictionState::Settled(outcome.into());
        true
    }

    /// [`complete`](Self::complete) for a reply from a detached call.
    pub fn apply(&mut self, reply: PredictionReply) -> bool {
        self.complete(reply.ticket, reply.outcome)
    }

    /// Return to `Idle`, clearing the result slot. A cycle still in flight
    /// becomes stale.
    pub fn reset(&mut self) {
        self.state = PredictionState::Idle;
    }

    /// Run one full cycle against the prediction endpoint, holding the
    /// workflow until the answer arrives.
    pub async fn submit(&mut self, remote: &RemoteClient, request: PredictionRequest) -> &PredictionState {
        let pending = self.begin(request);
        let outcome = remote.predict(&pending.request).await;
        self.complete(pending.ticket, outcome);
        &self.state
    }
}
