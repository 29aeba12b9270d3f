/// Request bodies, pipeline inputs and the result shapes returned to callers.
pub mod email;

/// # Health Status Response
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2024-03-10T15:30:45.123456789Z"
/// }
/// ```
pub mod health;

pub use email::{BulkResult, SmtpCheck, ValidationRequest, ValidationResult};
pub use health::HealthResponse;
