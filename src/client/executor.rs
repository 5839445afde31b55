use std::sync::Arc;

use crate::api_types::TransitionBody;
use crate::workflow::rules::validate_reason;
use crate::workflow::{ReportedFacts, TransitionOutcome, WorkOrderState};

use super::api::{ClientError, WorkflowApi};

pub const LOCAL_NO_INTERVENTIONS_MESSAGE: &str =
    "This work order has no interventions. Add at least one intervention before approving it.";

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Succeeded(TransitionOutcome),
    /// The authority refused or could not be reached. The message is shown as is.
    Failed(String),
    /// Refused before any network call.
    BlockedLocally(String),
}

/// One transition attempt with its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub work_order_id: i64,
    pub target: WorkOrderState,
    pub reason: Option<String>,
    pub facts: ReportedFacts,
    pub reason_required: bool,
    pub expected_state: Option<WorkOrderState>,
}

/// Submits transitions. Never retries.
#[derive(Clone)]
pub struct TransitionExecutor {
    api: Arc<dyn WorkflowApi>,
}

impl TransitionExecutor {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self { api }
    }

    /// Checks done without the network. The authority repeats them.
    pub fn local_check(submission: &Submission) -> Option<String> {
        if submission.target == WorkOrderState::Approved
            && submission.facts.interventions_count == Some(0)
        {
            return Some(LOCAL_NO_INTERVENTIONS_MESSAGE.to_string());
        }
        validate_reason(submission.reason.as_deref(), submission.reason_required)
    }

    pub async fn execute(&self, submission: &Submission) -> ExecutionResult {
        if let Some(message) = Self::local_check(submission) {
            return ExecutionResult::BlockedLocally(message);
        }

        let body = TransitionBody {
            reason: submission
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
            interventions_count: submission.facts.interventions_count,
            has_descrizione: submission.facts.has_damage_description,
            expected_state: submission.expected_state,
        };

        match self
            .api
            .execute_transition(submission.work_order_id, submission.target, &body)
            .await
        {
            Ok(outcome) => ExecutionResult::Succeeded(outcome),
            Err(e) => {
                log::warn!(
                    "Transition of work order {} to {} failed: {e}",
                    submission.work_order_id,
                    submission.target
                );
                ExecutionResult::Failed(failure_message(&e))
            }
        }
    }
}

/// Server `{detail}` verbatim, otherwise a generic message.
pub fn failure_message(error: &ClientError) -> String {
    match error {
        ClientError::Http { detail: Some(detail), .. } => detail.clone(),
        ClientError::Http { status, detail: None } => {
            format!("Transition failed (HTTP {})", status.as_u16())
        }
        ClientError::Transport(_) => "Transition failed: the server could not be reached".to_string(),
        ClientError::Decode(_) | ClientError::Config(_) => "Transition failed".to_string(),
    }
}
