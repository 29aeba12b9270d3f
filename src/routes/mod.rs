use crate::error::RequestError;
use actix_web::web;

/// # Health Check Endpoint
///
/// `GET /health` returns `{ "status": "UP", "timestamp": ... }`.
pub mod health;

/// # Email Validation Endpoints
///
/// ## Routes
/// - `POST /validate/single`: one address, full `ValidationResult`
/// - `POST /validate/bulk`: many addresses, results in input order
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com", "smtpProbe": true }
/// ```
pub mod email;

#[cfg(test)]
mod email_test;

/// # Route Configuration
///
/// Mounts the health check and the validation scope at the server root.
///
/// ```text
/// GET  /health
/// POST /validate/single
/// POST /validate/bulk
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(email::configure_routes);
}

/// JSON extractor settings: body size limit, and malformed bodies reported
/// as `400 {"error": ...}` like every other rejected request.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| RequestError::MalformedBody(err.to_string()).into())
}
