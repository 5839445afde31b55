use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::current_user;
use crate::errors::AppError;
use crate::workflow::WorkflowAuthority;

/// GET /api/v1/notifications - unread notifications of the signed-in user, newest first.
pub async fn unread(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &authority).await?;
    let notifications = authority.store().unread_notifications(user.id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}
