//! View-state of the transition panel for one work order.
//!
//! The coordinator is driven through `&mut self`: every user event or input
//! change is one method call, and the caller renders from the accessors
//! afterwards. Loads are ticketed so a result that arrives after a newer load
//! was started, or after `unmount`, is dropped.
//!
//! `click` and `submit_reason` run a whole submission. A renderer that must
//! show the in-flight control drives the three steps itself:
//! `begin_submit`, `execute_submission` (takes `&self`, so `affordances()`
//! stays readable while it runs) and `complete_submit`, then `load`.

use std::sync::Arc;

use crate::workflow::rules::{unreachable_message, validate_reason};
use crate::workflow::{AuditEntry, Legality, ReportedFacts, TransitionOption, TransitionOutcome, WorkOrderState};

use super::api::{ClientConfig, WorkflowApi};
use super::audit_reader::AuditTrailReader;
use super::catalog::TransitionCatalogResolver;
use super::executor::{ExecutionResult, Submission, TransitionExecutor};
use super::presentation::{self, AUDIT_DISPLAY_LIMIT, CATALOG_UNAVAILABLE, DISPLAY_ORDER, StateStyle};

/// What the owning page knows about the work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderInputs {
    pub work_order_id: i64,
    pub current_state: WorkOrderState,
    pub interventions_count: i64,
    pub has_damage_description: bool,
}

impl WorkOrderInputs {
    pub fn facts(&self) -> ReportedFacts {
        ReportedFacts {
            interventions_count: Some(self.interventions_count),
            has_damage_description: Some(self.has_damage_description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    AwaitingReason {
        target: WorkOrderState,
        validation: Option<String>,
    },
    Submitting {
        target: WorkOrderState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AffordanceKind {
    Current,
    Allowed { reason_required: bool, in_flight: bool },
    Blocked { tooltip: String },
    Unreachable { tooltip: String },
}

/// One state button (or tag) of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    pub state: WorkOrderState,
    pub style: StateStyle,
    pub kind: AffordanceKind,
}

/// Result of a user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Not actionable in the current phase, or target not allowed.
    Ignored,
    /// Refused by the local guard; show the message in a dialog.
    LocalGuard(String),
    /// The reason dialog is open.
    ReasonRequested,
    /// The reason dialog stays open with this validation message.
    InvalidReason(String),
    Succeeded(TransitionOutcome),
    Failed(String),
}

/// Handle for one load cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    work_order_id: i64,
    facts: ReportedFacts,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle for one submission, from `begin_submit` to `complete_submit`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    submission: Submission,
}

impl SubmitTicket {
    pub fn target(&self) -> WorkOrderState {
        self.submission.target
    }
}

type StateChangeCallback = Box<dyn FnMut(WorkOrderState) + Send>;

pub struct WorkflowCoordinator {
    resolver: TransitionCatalogResolver,
    reader: AuditTrailReader,
    executor: TransitionExecutor,
    audit_fetch_limit: i64,
    inputs: Option<WorkOrderInputs>,
    phase: Phase,
    catalog: Vec<TransitionOption>,
    audit: Vec<AuditEntry>,
    error: Option<String>,
    notice: Option<String>,
    generation: u64,
    mounted: bool,
    on_state_change: Option<StateChangeCallback>,
}

impl WorkflowCoordinator {
    pub fn new(api: Arc<dyn WorkflowApi>, config: &ClientConfig) -> Self {
        Self {
            resolver: TransitionCatalogResolver::new(api.clone()),
            reader: AuditTrailReader::new(api.clone()),
            executor: TransitionExecutor::new(api),
            audit_fetch_limit: config.audit_fetch_limit,
            inputs: None,
            phase: Phase::Idle,
            catalog: Vec::new(),
            audit: Vec::new(),
            error: None,
            notice: None,
            generation: 0,
            mounted: false,
            on_state_change: None,
        }
    }

    /// Called with the new state after every successful transition.
    pub fn on_state_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(WorkOrderState) + Send + 'static,
    {
        self.on_state_change = Some(Box::new(callback));
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn inputs(&self) -> Option<&WorkOrderInputs> {
        self.inputs.as_ref()
    }

    pub fn catalog(&self) -> &[TransitionOption] {
        &self.catalog
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub async fn mount(&mut self, inputs: WorkOrderInputs) {
        self.mounted = true;
        self.inputs = Some(inputs);
        self.error = None;
        self.load().await;
    }

    /// Reload when any input differs from the last known ones. Returns
    /// whether a load ran.
    pub async fn set_inputs(&mut self, inputs: WorkOrderInputs) -> bool {
        if !self.mounted || self.inputs.as_ref() == Some(&inputs) {
            return false;
        }
        self.inputs = Some(inputs);
        self.error = None;
        self.load().await;
        true
    }

    /// Results still in flight are discarded from now on.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.phase = Phase::Idle;
    }

    /// Start a load cycle. `None` when unmounted.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if !self.mounted {
            return None;
        }
        let inputs = self.inputs.as_ref()?;
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            work_order_id: inputs.work_order_id,
            facts: inputs.facts(),
        };
        if !matches!(self.phase, Phase::Submitting { .. }) {
            self.phase = Phase::Loading;
        }
        Some(ticket)
    }

    /// Catalog and audit trail, fetched concurrently.
    pub async fn fetch(&self, ticket: &LoadTicket) -> (Vec<TransitionOption>, Vec<AuditEntry>) {
        tokio::join!(
            self.resolver.fetch(ticket.work_order_id, &ticket.facts),
            self.reader.fetch(ticket.work_order_id, self.audit_fetch_limit),
        )
    }

    /// Apply fetched results. Returns false when they were discarded as stale.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        catalog: Vec<TransitionOption>,
        audit: Vec<AuditEntry>,
    ) -> bool {
        if !self.mounted || ticket.generation != self.generation {
            log::debug!(
                "Dropping load {} for work order {} (current generation {}, mounted {})",
                ticket.generation,
                ticket.work_order_id,
                self.generation,
                self.mounted
            );
            return false;
        }
        self.catalog = catalog;
        self.audit = audit;
        if self.phase == Phase::Loading {
            self.phase = Phase::Ready;
        }
        true
    }

    pub async fn load(&mut self) {
        let Some(ticket) = self.begin_load() else {
            return;
        };
        let (catalog, audit) = self.fetch(&ticket).await;
        self.complete_load(ticket, catalog, audit);
    }

    fn option(&self, target: WorkOrderState) -> Option<&TransitionOption> {
        self.catalog.iter().find(|o| o.to_state == target)
    }

    /// One entry per state, in display order.
    pub fn affordances(&self) -> Vec<Affordance> {
        let Some(inputs) = &self.inputs else {
            return Vec::new();
        };
        let current = inputs.current_state;
        let in_flight = match self.phase {
            Phase::Submitting { target } => Some(target),
            _ => None,
        };

        DISPLAY_ORDER
            .iter()
            .map(|&state| {
                let kind = if state == current {
                    AffordanceKind::Current
                } else {
                    match self.option(state).map(TransitionOption::legality) {
                        Some(Legality::Allowed) => AffordanceKind::Allowed {
                            reason_required: self.option(state).is_some_and(|o| o.reason_required),
                            in_flight: in_flight == Some(state),
                        },
                        Some(Legality::BlockedByGuard(tooltip)) | Some(Legality::BlockedByRole(tooltip)) => {
                            AffordanceKind::Blocked { tooltip }
                        }
                        None if self.catalog.is_empty() => AffordanceKind::Unreachable {
                            tooltip: CATALOG_UNAVAILABLE.to_string(),
                        },
                        Some(Legality::Current) | Some(Legality::Unreachable) | None => {
                            AffordanceKind::Unreachable {
                                tooltip: unreachable_message(current),
                            }
                        }
                    }
                };
                Affordance {
                    state,
                    style: presentation::style(state),
                    kind,
                }
            })
            .collect()
    }

    pub async fn click(&mut self, target: WorkOrderState) -> Interaction {
        if self.phase != Phase::Ready {
            return Interaction::Ignored;
        }
        let reason_required = match self.option(target) {
            Some(option) if option.allowed => option.reason_required,
            _ => return Interaction::Ignored,
        };
        let Some(inputs) = &self.inputs else {
            return Interaction::Ignored;
        };

        let precheck = Submission {
            work_order_id: inputs.work_order_id,
            target,
            reason: None,
            facts: inputs.facts(),
            reason_required: false,
            expected_state: Some(inputs.current_state),
        };
        if let Some(message) = TransitionExecutor::local_check(&precheck) {
            return Interaction::LocalGuard(message);
        }

        if reason_required {
            self.phase = Phase::AwaitingReason {
                target,
                validation: None,
            };
            return Interaction::ReasonRequested;
        }
        self.submit(target, None).await
    }

    pub async fn submit_reason(&mut self, reason: &str) -> Interaction {
        let Phase::AwaitingReason { target, .. } = self.phase else {
            return Interaction::Ignored;
        };
        if let Some(message) = validate_reason(Some(reason), true) {
            self.phase = Phase::AwaitingReason {
                target,
                validation: Some(message.clone()),
            };
            return Interaction::InvalidReason(message);
        }
        self.submit(target, Some(reason.to_string())).await
    }

    pub fn cancel_reason(&mut self) {
        if matches!(self.phase, Phase::AwaitingReason { .. }) {
            self.phase = Phase::Ready;
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Enter `Submitting`. `None` unless mounted and the target is allowed:
    /// from `Ready` when no reason is needed, or from the reason dialog open
    /// on the same target.
    pub fn begin_submit(&mut self, target: WorkOrderState, reason: Option<String>) -> Option<SubmitTicket> {
        if !self.mounted {
            return None;
        }
        let reason_required = self.option(target).filter(|o| o.allowed)?.reason_required;
        match self.phase {
            Phase::Ready if !reason_required => {}
            Phase::AwaitingReason { target: awaiting, .. } if awaiting == target => {}
            _ => return None,
        }
        let inputs = self.inputs.as_ref()?;
        let submission = Submission {
            work_order_id: inputs.work_order_id,
            target,
            reason,
            facts: inputs.facts(),
            reason_required,
            expected_state: Some(inputs.current_state),
        };
        self.phase = Phase::Submitting { target };
        self.error = None;
        self.notice = None;
        Some(SubmitTicket { submission })
    }

    pub async fn execute_submission(&self, ticket: &SubmitTicket) -> ExecutionResult {
        self.executor.execute(&ticket.submission).await
    }

    /// Apply a submission result and return to `Ready`. A result for a
    /// submission that is no longer in flight (unmounted meanwhile) only
    /// yields its interaction. Follow with `load()` to refetch.
    pub fn complete_submit(&mut self, ticket: SubmitTicket, result: ExecutionResult) -> Interaction {
        let interaction = match result {
            ExecutionResult::Succeeded(outcome) => Interaction::Succeeded(outcome),
            ExecutionResult::Failed(message) | ExecutionResult::BlockedLocally(message) => {
                Interaction::Failed(message)
            }
        };
        let target = ticket.target();
        if !self.mounted || self.phase != (Phase::Submitting { target }) {
            log::debug!(
                "Dropping submission result for work order {} ({})",
                ticket.submission.work_order_id,
                target
            );
            return interaction;
        }

        match &interaction {
            Interaction::Succeeded(outcome) => {
                if let Some(inputs) = self.inputs.as_mut() {
                    inputs.current_state = outcome.to_state;
                }
                self.notice = Some(format!(
                    "Work order moved to: {}",
                    presentation::label(outcome.to_state)
                ));
                if let Some(callback) = self.on_state_change.as_mut() {
                    callback(outcome.to_state);
                }
            }
            Interaction::Failed(message) => self.error = Some(message.clone()),
            _ => {}
        }
        self.phase = Phase::Ready;
        interaction
    }

    async fn submit(&mut self, target: WorkOrderState, reason: Option<String>) -> Interaction {
        let Some(ticket) = self.begin_submit(target, reason) else {
            return Interaction::Ignored;
        };
        let result = self.execute_submission(&ticket).await;
        let interaction = self.complete_submit(ticket, result);
        self.load().await;
        interaction
    }

    /// The most recent entries, at most five.
    pub fn audit_display(&self) -> &[AuditEntry] {
        &self.audit[..self.audit.len().min(AUDIT_DISPLAY_LIMIT)]
    }

    /// `audit_display()` rendered as timeline lines.
    pub fn audit_lines(&self) -> Vec<String> {
        self.audit_display().iter().map(presentation::audit_line).collect()
    }

    pub fn audit(&self) -> &[AuditEntry] {
        &self.audit
    }
}
