use utoipa::OpenApi;

/// OpenAPI document for the REST surface.
///
/// Served as JSON at `/api-docs/openapi.json` and rendered by Swagger UI at
/// `/swagger-ui/`. Generated at compile time from the handler annotations.
///
/// # Endpoints
/// - `GET /health`
/// - `POST /validate/single`
/// - `POST /validate/bulk`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::email::validate_single,
        crate::routes::email::validate_bulk,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::email::SingleValidationBody,
            crate::models::email::BulkValidationBody,
            crate::models::email::ValidationResult,
            crate::models::email::BulkResult,
            crate::models::email::SmtpCheck,
            crate::models::email::ProbeFailureKind,
            crate::error::ErrorBody
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Email Validation", description = "Syntax, DNS, disposable and SMTP deliverability checks")
    ),
    info(
        description = "Email deliverability validation: syntax, MX/SPF/DMARC, disposable providers and optional SMTP probing",
        title = "Email Deliverability API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
