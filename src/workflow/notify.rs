use crate::models::notification::NotificationContent;
use crate::models::user::User;
use crate::models::work_order::WorkOrder;

use super::state::WorkOrderState;

/// Compose the notification sent to every recipient of a transition.
pub fn compose(
    work_order: &WorkOrder,
    to: WorkOrderState,
    actor: &User,
    reason: Option<&str>,
) -> NotificationContent {
    let number = &work_order.number;
    let subject = match to {
        WorkOrderState::Draft => format!("Work order {number} back to draft"),
        WorkOrderState::Approved => format!("Work order approved: {number}"),
        WorkOrderState::InProgress => format!("Work started: {number}"),
        WorkOrderState::Completed => format!("Work completed: {number}"),
        WorkOrderState::Cancelled => format!("Work order cancelled: {number}"),
    };

    let mut message = format!(
        "Work order {number} was moved from {} to {} by {}.",
        work_order.state, to, actor.full_name
    );
    match to {
        WorkOrderState::Approved => message.push_str("\nWork can start."),
        WorkOrderState::Completed => message.push_str("\nProceed with invoicing if needed."),
        _ => {}
    }
    if let Some(reason) = reason {
        message.push_str(&format!("\nReason: {reason}"));
    }

    NotificationContent { subject, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Role;
    use chrono::Utc;

    fn work_order(state: WorkOrderState) -> WorkOrder {
        WorkOrder {
            id: 7,
            number: "WO-2026-0007".to_string(),
            state,
            damage_description: None,
            interventions_count: 1,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor() -> User {
        User {
            id: 1,
            username: "giulia".to_string(),
            full_name: "Giulia Rossi".to_string(),
            email: "giulia@example.com".to_string(),
            role: Role::GeneralManager,
            active: true,
            password_hash: String::new(),
        }
    }

    #[test]
    fn cancellation_carries_reason() {
        let content = compose(
            &work_order(WorkOrderState::Draft),
            WorkOrderState::Cancelled,
            &actor(),
            Some("Customer withdrew"),
        );
        assert_eq!(content.subject, "Work order cancelled: WO-2026-0007");
        assert!(content.message.contains("from draft to cancelled by Giulia Rossi"));
        assert!(content.message.ends_with("Reason: Customer withdrew"));
    }

    #[test]
    fn approval_without_reason() {
        let content = compose(&work_order(WorkOrderState::Draft), WorkOrderState::Approved, &actor(), None);
        assert!(content.message.contains("Work can start."));
        assert!(!content.message.contains("Reason:"));
    }
}
