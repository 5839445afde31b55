use super::role::Role;
use super::state::WorkOrderState;
use super::types::{PrerequisiteFacts, TransitionStatus};

/// Minimum length, in characters after trimming, of a mandatory reason.
pub const MIN_REASON_CHARS: usize = 5;

pub const NO_INTERVENTIONS_MESSAGE: &str =
    "No interventions: add at least one intervention before approving the work order";

const MANAGERS: &[Role] = &[Role::GeneralManager, Role::Admin];
const TECHNICIANS: &[Role] = &[Role::Workshop, Role::Bodyshop, Role::Admin];

/// Business-rule predicate attached to an edge, checked independently of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    None,
    AtLeastOneIntervention,
}

impl Guard {
    /// Returns the blocking message when the guard does not hold.
    pub fn check(&self, facts: &PrerequisiteFacts) -> Option<String> {
        match self {
            Guard::None => None,
            Guard::AtLeastOneIntervention if facts.interventions_count < 1 => {
                Some(NO_INTERVENTIONS_MESSAGE.to_string())
            }
            Guard::AtLeastOneIntervention => None,
        }
    }
}

/// One directed edge of the work-order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: WorkOrderState,
    pub to: WorkOrderState,
    pub allowed_roles: &'static [Role],
    pub guard: Guard,
    pub reason_required: bool,
}

impl TransitionRule {
    pub fn permits_role(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    /// Role first, then guard.
    pub fn evaluate(&self, facts: &PrerequisiteFacts, role: Role) -> Legality {
        if !self.permits_role(role) {
            return Legality::BlockedByRole(format!(
                "Role {role} is not authorized for this transition"
            ));
        }
        match self.guard.check(facts) {
            Some(message) => Legality::BlockedByGuard(message),
            None => Legality::Allowed,
        }
    }
}

/// The complete transition table. Pairs not listed here are unreachable.
pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: WorkOrderState::Draft,
        to: WorkOrderState::Approved,
        allowed_roles: MANAGERS,
        guard: Guard::AtLeastOneIntervention,
        reason_required: false,
    },
    TransitionRule {
        from: WorkOrderState::Draft,
        to: WorkOrderState::Cancelled,
        allowed_roles: MANAGERS,
        guard: Guard::None,
        reason_required: true,
    },
    TransitionRule {
        from: WorkOrderState::Approved,
        to: WorkOrderState::InProgress,
        allowed_roles: TECHNICIANS,
        guard: Guard::None,
        reason_required: false,
    },
    TransitionRule {
        from: WorkOrderState::Approved,
        to: WorkOrderState::Cancelled,
        allowed_roles: MANAGERS,
        guard: Guard::None,
        reason_required: true,
    },
    TransitionRule {
        from: WorkOrderState::InProgress,
        to: WorkOrderState::Completed,
        allowed_roles: TECHNICIANS,
        guard: Guard::None,
        reason_required: false,
    },
    TransitionRule {
        from: WorkOrderState::InProgress,
        to: WorkOrderState::Cancelled,
        allowed_roles: MANAGERS,
        guard: Guard::None,
        reason_required: true,
    },
];

pub fn find_rule(from: WorkOrderState, to: WorkOrderState) -> Option<&'static TransitionRule> {
    TRANSITIONS.iter().find(|r| r.from == from && r.to == to)
}

pub fn outgoing(from: WorkOrderState) -> impl Iterator<Item = &'static TransitionRule> {
    TRANSITIONS.iter().filter(move |r| r.from == from)
}

/// Legality of one candidate target, relative to the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Legality {
    Current,
    Allowed,
    BlockedByGuard(String),
    BlockedByRole(String),
    Unreachable,
}

impl Legality {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Legality::Allowed)
    }

    /// Human-readable explanation; empty when allowed.
    pub fn explanation(&self, current: WorkOrderState) -> String {
        match self {
            Legality::Current | Legality::Allowed => String::new(),
            Legality::BlockedByGuard(message) | Legality::BlockedByRole(message) => message.clone(),
            Legality::Unreachable => unreachable_message(current),
        }
    }

    pub fn status(&self) -> Option<TransitionStatus> {
        match self {
            Legality::Current => None,
            Legality::Allowed => Some(TransitionStatus::Allowed),
            Legality::BlockedByGuard(_) => Some(TransitionStatus::BlockedByGuard),
            Legality::BlockedByRole(_) => Some(TransitionStatus::BlockedByRole),
            Legality::Unreachable => Some(TransitionStatus::Unreachable),
        }
    }
}

pub fn unreachable_message(current: WorkOrderState) -> String {
    format!("Not reachable from current state '{current}'")
}

/// Classify moving from `current` to `target` for an actor holding `role`.
pub fn evaluate(
    current: WorkOrderState,
    target: WorkOrderState,
    facts: &PrerequisiteFacts,
    role: Role,
) -> Legality {
    if current == target {
        return Legality::Current;
    }
    match find_rule(current, target) {
        Some(rule) => rule.evaluate(facts, role),
        None => Legality::Unreachable,
    }
}

/// Validate a transition reason. Returns the blocking message, if any.
pub fn validate_reason(reason: Option<&str>, required: bool) -> Option<String> {
    let trimmed = reason.map(str::trim).unwrap_or("");
    if !required {
        return None;
    }
    if trimmed.is_empty() {
        return Some("A reason is required for this transition".to_string());
    }
    if trimmed.chars().count() < MIN_REASON_CHARS {
        return Some(format!(
            "The reason must be at least {MIN_REASON_CHARS} characters long"
        ));
    }
    None
}

/// Trimmed reason, or `None` when blank.
pub fn normalize_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
}
