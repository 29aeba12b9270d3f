use crate::config::Config;
use crate::error::RequestError;
use crate::models::email::ValidationOptions;
use crate::validation::bulk::BulkExecutor;
use crate::validation::pipeline::ValidationPipeline;
use std::sync::Arc;
use std::time::Duration;

/// Shared handler state, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ValidationPipeline>,
    pub bulk: BulkExecutor,
    pub default_timeout: Duration,
    pub max_timeout: Duration,
}

impl AppState {
    pub fn new(pipeline: ValidationPipeline, config: &Config) -> Self {
        let pipeline = Arc::new(pipeline);
        let bulk = BulkExecutor::new(Arc::clone(&pipeline), config.bulk_concurrency)
            .with_max_emails(config.bulk_max_emails);

        Self {
            pipeline,
            bulk,
            default_timeout: config.probe_timeout,
            max_timeout: config.max_probe_timeout,
        }
    }

    /// Turns the optional request knobs into validated options.
    pub fn options(
        &self,
        smtp_probe: Option<bool>,
        timeout_ms: Option<u64>,
    ) -> Result<ValidationOptions, RequestError> {
        let timeout = match timeout_ms {
            None => self.default_timeout,
            Some(ms) => {
                let timeout = Duration::from_millis(ms);
                if timeout > self.max_timeout {
                    return Err(RequestError::InvalidTimeout {
                        max: self.max_timeout.as_millis() as u64,
                    });
                }
                timeout
            }
        };

        ValidationOptions::new(smtp_probe.unwrap_or(false)).with_timeout(timeout)
    }
}
