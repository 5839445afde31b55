//! HTTP client tests: resolver, executor and audit reader against a mock
//! authority.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use garage::client::executor::LOCAL_NO_INTERVENTIONS_MESSAGE;
use garage::client::{
    AuditTrailReader, ClientConfig, ClientError, ExecutionResult, HttpWorkflowApi, Submission,
    TransitionCatalogResolver, TransitionExecutor, WorkflowApi,
};
use garage::workflow::{Legality, ReportedFacts, Role, TransitionStatus, WorkOrderState};

fn api(server: &MockServer) -> Arc<HttpWorkflowApi> {
    Arc::new(HttpWorkflowApi::new(&ClientConfig::new(server.uri())).expect("client"))
}

fn facts(interventions: i64) -> ReportedFacts {
    ReportedFacts {
        interventions_count: Some(interventions),
        has_damage_description: Some(true),
    }
}

fn submission(target: WorkOrderState, reason: Option<&str>, interventions: i64) -> Submission {
    Submission {
        work_order_id: 7,
        target,
        reason: reason.map(String::from),
        facts: facts(interventions),
        reason_required: reason.is_some(),
        expected_state: Some(WorkOrderState::Approved),
    }
}

fn outcome_json(to_state: &str) -> serde_json::Value {
    json!({
        "success": true,
        "work_order_id": 7,
        "from_state": "approved",
        "to_state": to_state,
        "timestamp": "2026-03-04T09:30:00Z",
        "executed_by": { "id": 2, "name": "Giulia Rossi", "role": "GENERAL_MANAGER" },
        "audit_entry_id": 41
    })
}

// ============================================================================
// CATALOG RESOLVER
// ============================================================================

#[tokio::test]
async fn test_resolver_sends_facts_and_parses_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/work-orders/7/available-transitions"))
        .and(query_param("interventions_count", "2"))
        .and(query_param("has_descrizione", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "work_order_id": 7,
            "current_state": "approved",
            "available_transitions": [
                {
                    "to_state": "in_progress",
                    "allowed": false,
                    "reason_required": false,
                    "explanation": "Role CMM is not authorized for this transition",
                    "allowed_roles": ["WORKSHOP", "BODYSHOP", "ADMIN"],
                    "recipients": [{ "id": 3, "name": "Marco Bianchi", "email": "marco@garage.test", "role": "WORKSHOP" }],
                    "status": "blocked_by_role"
                },
                {
                    "to_state": "cancelled",
                    "allowed": true,
                    "reason_required": true,
                    "explanation": "",
                    "allowed_roles": ["GM", "ADMIN"],
                    "recipients": []
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = TransitionCatalogResolver::new(api(&server));
    let options = resolver.fetch(7, &facts(2)).await;

    assert_eq!(options.len(), 2);
    assert_eq!(options[0].status, Some(TransitionStatus::BlockedByRole));
    assert_eq!(
        options[0].legality(),
        Legality::BlockedByRole("Role CMM is not authorized for this transition".to_string())
    );
    assert_eq!(options[0].recipients[0].role, Role::Workshop);
    // Older authorities omit `status` and may send role aliases.
    assert_eq!(options[1].status, None);
    assert_eq!(options[1].legality(), Legality::Allowed);
    assert_eq!(options[1].allowed_roles, vec![Role::GeneralManager, Role::Admin]);
}

#[tokio::test]
async fn test_resolver_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/work-orders/7/available-transitions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "Internal Server Error" })))
        .mount(&server)
        .await;

    let resolver = TransitionCatalogResolver::new(api(&server));
    assert!(resolver.fetch(7, &facts(1)).await.is_empty());
}

#[tokio::test]
async fn test_resolver_fails_open_on_garbage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let client = api(&server);
    let err = client.available_transitions(7, &facts(1)).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert!(TransitionCatalogResolver::new(client).fetch(7, &facts(1)).await.is_empty());
}

// ============================================================================
// EXECUTOR
// ============================================================================

#[tokio::test]
async fn test_executor_posts_body_and_returns_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/work-orders/7/transition/cancelled"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "reason": "Customer withdrew",
            "interventions_count": 1,
            "has_descrizione": true,
            "expected_state": "approved"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(outcome_json("cancelled")))
        .expect(1)
        .mount(&server)
        .await;

    let executor = TransitionExecutor::new(api(&server));
    let result = executor
        .execute(&submission(WorkOrderState::Cancelled, Some("  Customer withdrew "), 1))
        .await;

    match result {
        ExecutionResult::Succeeded(outcome) => {
            assert_eq!(outcome.to_state, WorkOrderState::Cancelled);
            assert_eq!(outcome.audit_entry_id, 41);
            assert_eq!(outcome.executed_by.name, "Giulia Rossi");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_executor_surfaces_detail_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "Role CMM is not authorized for this transition"
        })))
        .mount(&server)
        .await;

    let executor = TransitionExecutor::new(api(&server));
    let result = executor.execute(&submission(WorkOrderState::InProgress, None, 1)).await;
    assert_eq!(
        result,
        ExecutionResult::Failed("Role CMM is not authorized for this transition".to_string())
    );
}

#[tokio::test]
async fn test_executor_generic_message_without_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let executor = TransitionExecutor::new(api(&server));
    let result = executor.execute(&submission(WorkOrderState::InProgress, None, 1)).await;
    assert_eq!(result, ExecutionResult::Failed("Transition failed (HTTP 502)".to_string()));
}

#[tokio::test]
async fn test_executor_blocks_locally_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(outcome_json("approved")))
        .expect(0)
        .mount(&server)
        .await;

    let executor = TransitionExecutor::new(api(&server));

    let result = executor.execute(&submission(WorkOrderState::Approved, None, 0)).await;
    assert_eq!(result, ExecutionResult::BlockedLocally(LOCAL_NO_INTERVENTIONS_MESSAGE.to_string()));

    let result = executor
        .execute(&submission(WorkOrderState::Cancelled, Some("nah"), 1))
        .await;
    assert!(matches!(result, ExecutionResult::BlockedLocally(_)));
}

// ============================================================================
// AUDIT READER AND SESSION
// ============================================================================

#[tokio::test]
async fn test_audit_reader_requests_limit_and_parses_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/work-orders/7/audit-trail"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "work_order_id": 7,
            "audit_trail": [
                {
                    "id": 12,
                    "from_state": "approved",
                    "to_state": "cancelled",
                    "executed_by": { "id": 2, "name": "Giulia Rossi", "role": "GENERAL_MANAGER" },
                    "reason": "Customer withdrew",
                    "timestamp": "2026-03-04T10:00:00Z",
                    "transition_type": "manual"
                },
                {
                    "id": 11,
                    "from_state": "draft",
                    "to_state": "approved",
                    "executed_by": { "id": 2, "name": "Giulia Rossi", "role": "GENERAL_MANAGER" },
                    "timestamp": "2026-03-04T09:00:00Z"
                }
            ]
        })))
        .mount(&server)
        .await;

    let reader = AuditTrailReader::new(api(&server));
    let entries = reader.fetch(7, 20).await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reason.as_deref(), Some("Customer withdrew"));
    assert!(entries[1].reason.is_none());
    assert!(entries[0].timestamp > entries[1].timestamp);
}

#[tokio::test]
async fn test_audit_reader_returns_empty_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Work order 7 not found" })))
        .mount(&server)
        .await;

    let reader = AuditTrailReader::new(api(&server));
    assert!(reader.fetch(7, 20).await.is_empty());
}

#[tokio::test]
async fn test_login_cookie_is_sent_on_later_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_json(json!({ "username": "giulia", "password": "officina-2026" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "id=session-token; Path=/; HttpOnly")
                .set_body_json(json!({ "id": 2, "username": "giulia", "full_name": "Giulia Rossi", "role": "GENERAL_MANAGER" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/work-orders/7/audit-trail"))
        .and(header("cookie", "id=session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "work_order_id": 7, "audit_trail": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server);
    client.login("giulia", "officina-2026").await.expect("login");
    let entries = client.audit_trail(7, 20).await.expect("audit trail");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_login_failure_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid username or password" })))
        .mount(&server)
        .await;

    let err = api(&server).login("giulia", "nope").await.unwrap_err();
    match err {
        ClientError::Http { status, detail } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(detail.as_deref(), Some("Invalid username or password"));
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}
