use thiserror::Error;

use super::state::WorkOrderState;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Work order {0} not found")]
    NotFound(i64),

    #[error("Transition from {from} to {to} is not allowed")]
    InvalidTransition { from: WorkOrderState, to: WorkOrderState },

    #[error("{0}")]
    RoleNotAuthorized(String),

    #[error("{0}")]
    PrerequisiteNotMet(String),

    #[error("{0}")]
    ReasonRequired(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("Unknown or inactive user {0}")]
    UnknownActor(i64),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
