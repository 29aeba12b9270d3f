use crate::error::{ErrorBody, RequestError};
use crate::models::email::{
    BulkResult, BulkValidationBody, SingleValidationBody, ValidationRequest, ValidationResult,
};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, post, web};
use std::sync::Arc;
use tracing::error;

/// # Single Address Validation
///
/// Runs one address through syntax, DNS and disposable checks, plus the
/// SMTP probe when `smtpProbe` is set. Check outcomes (including DNS and
/// probe failures) are reported in the body with status 200.
///
/// ## Request
/// - Method: POST
/// - Body: `{ "email": string, "smtpProbe"?: bool, "timeoutMs"?: int }`
///
/// ## Responses
/// - **200 OK**: `ValidationResult`
/// - **400 Bad Request**: `email` missing, malformed body, or `timeoutMs` out of range
/// - **500 Internal Server Error**: the pipeline failed unexpectedly
#[utoipa::path(
    post,
    path = "/validate/single",
    request_body = SingleValidationBody,
    responses(
        (status = 200, description = "Validation result", body = ValidationResult),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody)
    ),
    tag = "Email Validation"
)]
#[post("/single")]
pub async fn validate_single(
    req: web::Json<SingleValidationBody>,
    state: web::Data<AppState>,
) -> Result<impl Responder, RequestError> {
    let body = req.into_inner();
    let email = body
        .email
        .filter(|email| !email.is_empty())
        .ok_or(RequestError::MissingEmail)?;
    let options = state.options(body.smtp_probe, body.timeout_ms)?;

    let result = Arc::clone(&state.pipeline)
        .validate_isolated(ValidationRequest::new(email, options))
        .await
        .map_err(|e| {
            error!(error = %e, "Single validation failed");
            RequestError::Internal(e)
        })?;

    Ok(HttpResponse::Ok().json(result))
}

/// # Bulk Validation
///
/// Validates every address in `emails` under the configured concurrency
/// ceiling. `results[i]` always belongs to `emails[i]`; an address whose
/// validation fails unexpectedly gets an entry with `error` set instead of
/// failing the request.
///
/// ## Request
/// - Method: POST
/// - Body: `{ "emails": [string], "smtpProbe"?: bool, "timeoutMs"?: int }`
///
/// ## Responses
/// - **200 OK**: `{ "count": int, "results": [ValidationResult] }`
/// - **400 Bad Request**: `emails` missing, empty, not a list, or too long
#[utoipa::path(
    post,
    path = "/validate/bulk",
    request_body = BulkValidationBody,
    responses(
        (status = 200, description = "Per-address results in input order", body = BulkResult),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody)
    ),
    tag = "Email Validation"
)]
#[post("/bulk")]
pub async fn validate_bulk(
    req: web::Json<BulkValidationBody>,
    state: web::Data<AppState>,
) -> Result<impl Responder, RequestError> {
    let body = req.into_inner();
    let emails = body.emails.ok_or(RequestError::MissingEmails)?;
    let options = state.options(body.smtp_probe, body.timeout_ms)?;

    let bulk = state.bulk.run(emails, options).await?;
    Ok(HttpResponse::Ok().json(bulk))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/validate")
            .service(validate_single)
            .service(validate_bulk),
    );
}
