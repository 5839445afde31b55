//! Work-order state machine: states, roles, the transition table and the
//! authority that enforces it.

pub mod authority;
pub mod error;
pub mod notify;
pub mod pg_store;
pub mod role;
pub mod rules;
pub mod state;
pub mod store;
pub mod types;

pub use authority::WorkflowAuthority;
pub use error::WorkflowError;
pub use pg_store::PgWorkflowStore;
pub use role::Role;
pub use rules::Legality;
pub use state::WorkOrderState;
pub use store::{TransitionRecord, WorkflowStore};
pub use types::*;
