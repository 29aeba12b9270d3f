use crate::models::email::{ProbeFailureKind, SmtpCheck, ValidationRequest, ValidationResult};
use crate::validation::dnsmx::{DomainIntelligence, preferred_mx};
use crate::validation::domain::extract_domain;
use crate::validation::smtp::MailboxProbe;
use crate::validation::syntax;
use std::any::Any;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Instrument, debug, instrument};

/// Orchestrates the checks for one address.
///
/// Stages run in order: syntax, domain extraction, domain intelligence
/// (disposable, MX, SPF, DMARC), then the optional SMTP probe. An invalid
/// syntax stops the run with every later field left `null`. The probe only
/// runs when it was requested and the domain has MX records. Nothing is
/// retried; DNS and probe failures surface as field values, never as errors.
pub struct ValidationPipeline {
    intelligence: DomainIntelligence,
    prober: Arc<dyn MailboxProbe>,
}

impl ValidationPipeline {
    pub fn new(intelligence: DomainIntelligence, prober: Arc<dyn MailboxProbe>) -> Self {
        Self {
            intelligence,
            prober,
        }
    }

    pub fn intelligence(&self) -> &DomainIntelligence {
        &self.intelligence
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(email = %request.email, smtp_probe = request.options.smtp_probe())
    )]
    pub async fn validate(&self, request: &ValidationRequest) -> ValidationResult {
        let mut result = ValidationResult::pending(request.email.clone());

        if !syntax::is_valid_email(&request.email) {
            debug!("Rejected by syntax check");
            result.reason = Some(ValidationResult::INVALID_SYNTAX.to_string());
            return result;
        }
        result.syntactically_valid = true;

        let Some(domain) = extract_domain(&request.email) else {
            result.reason = Some("Could not extract domain".to_string());
            return result;
        };

        let report = self.intelligence.inspect(&domain).await;
        result.disposable = Some(report.disposable);
        result.domain_has_mx = Some(report.has_mx);
        result.spf = report.spf;
        result.dmarc = Some(report.dmarc);

        if request.options.smtp_probe() && report.has_mx {
            let check = match preferred_mx(&report.mx_hosts) {
                Some(host) => {
                    self.prober
                        .probe(&host.exchange, &request.email, request.options.timeout())
                        .await
                }
                None => SmtpCheck::failed(
                    ProbeFailureKind::Rejected,
                    format!("{} publishes a null MX record and accepts no mail", domain),
                    None,
                ),
            };
            result.smtp_check = Some(check);
        }

        debug!(
            has_mx = report.has_mx,
            disposable = report.disposable,
            probed = result.smtp_check.is_some(),
            "Validation complete"
        );
        result
    }

    /// Runs [`validate`](Self::validate) on its own task so a panic is
    /// reported as an error instead of unwinding through the caller.
    ///
    /// The task is aborted if the returned future is dropped before it
    /// completes, e.g. when the HTTP client goes away.
    pub async fn validate_isolated(
        self: Arc<Self>,
        request: ValidationRequest,
    ) -> Result<ValidationResult, String> {
        let mut task = AbortOnDrop(tokio::spawn(
            async move { self.validate(&request).await }.in_current_span(),
        ));
        (&mut task.0).await.map_err(describe_join_error)
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        format!("validation panicked: {}", panic_message(err.into_panic()))
    } else {
        "validation task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
