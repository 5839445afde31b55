use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::api_types::{AuditQuery, AuditTrailResponse, CatalogQuery, TransitionBody, WorkOrderResponse};
use crate::auth::session::current_user;
use crate::auth::validate;
use crate::errors::AppError;
use crate::workflow::{TransitionRequest, WorkOrderState, WorkflowAuthority};

const MAX_REASON_CHARS: usize = 2000;

/// GET /api/v1/work-orders/{id}
pub async fn read(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    current_user(&session, &authority).await?;
    let work_order = authority.work_order(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(WorkOrderResponse::from(&work_order)))
}

/// GET /api/v1/work-orders/{id}/available-transitions
pub async fn available_transitions(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
    path: web::Path<i64>,
    query: web::Query<CatalogQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &authority).await?;
    let catalog = authority
        .query_transitions(path.into_inner(), &query.reported_facts(), &user)
        .await?;
    Ok(HttpResponse::Ok().json(catalog))
}

/// POST /api/v1/work-orders/{id}/transition/{target_state}
pub async fn transition(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
    path: web::Path<(i64, String)>,
    body: web::Json<TransitionBody>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &authority).await?;
    let (work_order_id, target) = path.into_inner();
    let target_state: WorkOrderState = target.parse().map_err(AppError::BadRequest)?;
    let body = body.into_inner();

    if let Some(reason) = &body.reason {
        if let Some(e) = validate::validate_optional(reason, "Reason", MAX_REASON_CHARS) {
            return Err(AppError::BadRequest(e));
        }
    }

    let request = TransitionRequest {
        work_order_id,
        target_state,
        reported_facts: body.reported_facts(),
        expected_state: body.expected_state,
        reason: body.reason,
    };
    let outcome = authority.execute(&request, &user).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/v1/work-orders/{id}/audit-trail?limit={n}
pub async fn audit_trail(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
    path: web::Path<i64>,
    query: web::Query<AuditQuery>,
) -> Result<HttpResponse, AppError> {
    current_user(&session, &authority).await?;
    let work_order_id = path.into_inner();
    let audit_trail = authority.audit_trail(work_order_id, query.limit).await?;
    Ok(HttpResponse::Ok().json(AuditTrailResponse {
        work_order_id,
        audit_trail,
    }))
}
