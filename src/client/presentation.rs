//! Display configuration for work-order states: order, labels and tag colours.

use std::fmt::Display;

use chrono::{Local, TimeZone};

use crate::workflow::{AuditEntry, WorkOrderState};

/// How many audit entries the panel shows.
pub const AUDIT_DISPLAY_LIMIT: usize = 5;

/// Left-to-right order of the state affordances.
pub const DISPLAY_ORDER: [WorkOrderState; 5] = WorkOrderState::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagColour {
    Default,
    Processing,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateStyle {
    pub label: &'static str,
    pub colour: TagColour,
}

pub fn style(state: WorkOrderState) -> StateStyle {
    let (label, colour) = match state {
        WorkOrderState::Draft => ("Draft", TagColour::Default),
        WorkOrderState::Approved => ("Approved", TagColour::Processing),
        WorkOrderState::InProgress => ("In progress", TagColour::Processing),
        WorkOrderState::Completed => ("Completed", TagColour::Success),
        WorkOrderState::Cancelled => ("Cancelled", TagColour::Error),
    };
    StateStyle { label, colour }
}

pub fn label(state: WorkOrderState) -> &'static str {
    style(state).label
}

/// Tooltip of every non-current state while the catalog is unavailable.
pub const CATALOG_UNAVAILABLE: &str = "Transitions unavailable";

/// `18/10 14:05 · Draft → Approved · Giulia Rossi "reason"`, in local time.
pub fn audit_line(entry: &AuditEntry) -> String {
    audit_line_in(entry, &Local)
}

pub fn audit_line_in<Tz>(entry: &AuditEntry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let when = entry.timestamp.with_timezone(tz).format("%d/%m %H:%M").to_string();
    audit_line_at(entry, when)
}

fn audit_line_at(entry: &AuditEntry, when: String) -> String {
    let mut line = format!(
        "{when} · {} → {} · {}",
        label(entry.from_state),
        label(entry.to_state),
        entry.executed_by.name
    );
    if let Some(reason) = &entry.reason {
        line.push_str(&format!(" \"{reason}\""));
    }
    line
}
