use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use std::fmt;

use crate::workflow::WorkflowError;

/// JSON error body. `detail` is shown to the user verbatim.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub detail: String,
}

#[derive(Debug)]
pub enum AppError {
    Workflow(WorkflowError),
    Session(String),
    Unauthorized(String),
    BadRequest(String),
    RateLimited,
    Hash(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Workflow(e) => write!(f, "{e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Unauthorized(e) => write!(f, "{e}"),
            AppError::BadRequest(e) => write!(f, "{e}"),
            AppError::RateLimited => write!(f, "Too many failed login attempts. Please try again later."),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Workflow(e) => match e {
                WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
                WorkflowError::InvalidTransition { .. } | WorkflowError::ReasonRequired(_) => {
                    StatusCode::BAD_REQUEST
                }
                WorkflowError::RoleNotAuthorized(_) | WorkflowError::PrerequisiteNotMet(_) => {
                    StatusCode::FORBIDDEN
                }
                WorkflowError::StateConflict(_) => StatusCode::CONFLICT,
                WorkflowError::UnknownActor(_) => StatusCode::UNAUTHORIZED,
                WorkflowError::Corrupt(_) | WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Session(_) | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{self}");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ApiError { detail })
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        AppError::Workflow(e)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Workflow(WorkflowError::Storage(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkOrderState;

    #[test]
    fn workflow_errors_map_to_statuses() {
        let cases = [
            (AppError::from(WorkflowError::NotFound(3)), StatusCode::NOT_FOUND),
            (
                AppError::from(WorkflowError::InvalidTransition {
                    from: WorkOrderState::Completed,
                    to: WorkOrderState::Draft,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::from(WorkflowError::ReasonRequired("r".into())), StatusCode::BAD_REQUEST),
            (AppError::from(WorkflowError::RoleNotAuthorized("r".into())), StatusCode::FORBIDDEN),
            (AppError::from(WorkflowError::PrerequisiteNotMet("p".into())), StatusCode::FORBIDDEN),
            (AppError::from(WorkflowError::StateConflict("c".into())), StatusCode::CONFLICT),
            (AppError::Unauthorized("login".into()), StatusCode::UNAUTHORIZED),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AppError::Hash("argon".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn invalid_transition_detail_names_both_states() {
        let error = AppError::from(WorkflowError::InvalidTransition {
            from: WorkOrderState::Completed,
            to: WorkOrderState::Completed,
        });
        assert_eq!(error.to_string(), "Transition from completed to completed is not allowed");
    }
}
