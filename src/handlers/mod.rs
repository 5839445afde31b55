pub mod auth_handlers;
pub mod notification_handlers;
pub mod work_order_handlers;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header},
    middleware::{Next, from_fn},
    web,
};

use crate::auth::middleware::require_auth;
use crate::errors::{ApiError, AppError};

/// CSRF protection for mutation endpoints.
///
/// Rejects POST/PUT/PATCH/DELETE requests carrying a body that is not
/// `application/json`. Browsers cannot send cross-origin JSON with cookies
/// through a simple form POST. Bodiless mutations such as logout pass.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let is_mutation = matches!(
        *req.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );

    if is_mutation && has_body(&req) {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::BadRequest().json(ApiError {
                detail: "Content-Type must be application/json for mutation requests".to_string(),
            });
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

fn has_body(req: &ServiceRequest) -> bool {
    let headers = req.headers();
    if headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|len| len > 0)
        || headers.contains_key(header::CONTENT_TYPE)
}

/// Extractor failures answer with the same `{detail}` body as handler errors.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid request body: {err}")).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid query string: {err}")).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid path: {err}")).into()),
    );
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiError {
        detail: "Not found".to_string(),
    })
}

/// Configure the `/api/v1` routes. Everything but login and logout needs a
/// session; unknown paths are 404 with or without one.
pub fn configure(cfg: &mut web::ServiceConfig) {
    extractor_configs(cfg);
    cfg.service(
        web::scope("")
            .wrap(from_fn(require_json_content_type))
            .route("/login", web::post().to(auth_handlers::login))
            .route("/logout", web::post().to(auth_handlers::logout))
            .service(
                web::resource("/me")
                    .wrap(from_fn(require_auth))
                    .route(web::get().to(auth_handlers::me)),
            )
            .service(
                web::resource("/notifications")
                    .wrap(from_fn(require_auth))
                    .route(web::get().to(notification_handlers::unread)),
            )
            .service(
                web::scope("/work-orders/{id}")
                    .wrap(from_fn(require_auth))
                    .route("", web::get().to(work_order_handlers::read))
                    .route(
                        "/available-transitions",
                        web::get().to(work_order_handlers::available_transitions),
                    )
                    .route(
                        "/transition/{target_state}",
                        web::post().to(work_order_handlers::transition),
                    )
                    .route("/audit-trail", web::get().to(work_order_handlers::audit_trail)),
            )
            .default_service(web::to(not_found)),
    );
}
