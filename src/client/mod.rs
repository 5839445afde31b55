//! Client side of the workflow: a typed HTTP client for the `/api/v1`
//! surface and the coordinator that drives one work order's transition panel.

pub mod api;
pub mod audit_reader;
pub mod catalog;
pub mod coordinator;
pub mod executor;
pub mod presentation;

pub use api::{ClientConfig, ClientError, HttpWorkflowApi, WorkflowApi};
pub use audit_reader::AuditTrailReader;
pub use catalog::TransitionCatalogResolver;
pub use coordinator::{
    Affordance, AffordanceKind, Interaction, LoadTicket, Phase, SubmitTicket, WorkOrderInputs, WorkflowCoordinator,
};
pub use executor::{ExecutionResult, Submission, TransitionExecutor};
