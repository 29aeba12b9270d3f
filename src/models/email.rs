use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

/// Body of `POST /validate/single`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleValidationBody {
    pub email: Option<String>,
    #[serde(default)]
    pub smtp_probe: Option<bool>,
    /// SMTP probe budget in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Body of `POST /validate/bulk`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkValidationBody {
    pub emails: Option<Vec<String>>,
    #[serde(default)]
    pub smtp_probe: Option<bool>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Per-call knobs shared by single and bulk validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    smtp_probe: bool,
    timeout: Duration,
}

impl ValidationOptions {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

    pub fn new(smtp_probe: bool) -> Self {
        Self {
            smtp_probe,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the SMTP probe budget. A zero budget is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RequestError> {
        if timeout.is_zero() {
            return Err(RequestError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn smtp_probe(&self) -> bool {
        self.smtp_probe
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::new(false)
    }
}

/// One address to run through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub email: String,
    pub options: ValidationOptions,
}

impl ValidationRequest {
    pub fn new(email: impl Into<String>, options: ValidationOptions) -> Self {
        Self {
            email: email.into(),
            options,
        }
    }
}

/// Closed set of reasons an SMTP probe did not confirm the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailureKind {
    Timeout,
    ConnectionRefused,
    Rejected,
    ProtocolError,
}

/// Outcome of an SMTP handshake probe.
///
/// `success` only means the server answered `RCPT TO` with 2xx. Servers that
/// accept every recipient and bounce later make this an upper bound on
/// deliverability, never a guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SmtpCheck {
    pub success: bool,
    pub message: String,
    /// Last SMTP reply code received, if the server answered at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProbeFailureKind>,
}

impl SmtpCheck {
    pub fn deliverable(message: impl Into<String>, code: u16) -> Self {
        Self {
            success: true,
            message: message.into(),
            code: Some(code),
            kind: None,
        }
    }

    pub fn failed(kind: ProbeFailureKind, message: impl Into<String>, code: Option<u16>) -> Self {
        Self {
            success: false,
            message: message.into(),
            code,
            kind: Some(kind),
        }
    }
}

/// Validation outcome for one address.
///
/// `None` fields serialize as `null` and mean "not determined": the pipeline
/// stopped before reaching that check, or (for `spf`) the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub email: String,
    pub syntactically_valid: bool,
    #[serde(rename = "domainHasMX")]
    pub domain_has_mx: Option<bool>,
    pub spf: Option<bool>,
    pub dmarc: Option<bool>,
    pub disposable: Option<bool>,
    pub smtp_check: Option<SmtpCheck>,
    pub reason: Option<String>,
    /// Set only when the pipeline itself failed for this address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub const INVALID_SYNTAX: &'static str = "Invalid email syntax";
    pub const ABORTED: &'static str = "Validation aborted";

    /// A result with every check still undetermined.
    pub fn pending(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            syntactically_valid: false,
            domain_has_mx: None,
            spf: None,
            dmarc: None,
            disposable: None,
            smtp_check: None,
            reason: None,
            error: None,
        }
    }

    /// Error-shaped entry for an address whose pipeline run failed unexpectedly.
    pub fn aborted(email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            reason: Some(Self::ABORTED.to_string()),
            error: Some(error.into()),
            ..Self::pending(email)
        }
    }
}

/// Response of `POST /validate/bulk`; `results[i]` belongs to input address `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkResult {
    pub count: usize,
    pub results: Vec<ValidationResult>,
}

impl From<Vec<ValidationResult>> for BulkResult {
    fn from(results: Vec<ValidationResult>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}
