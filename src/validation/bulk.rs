use crate::error::RequestError;
use crate::models::email::{BulkResult, ValidationOptions, ValidationRequest, ValidationResult};
use crate::validation::pipeline::ValidationPipeline;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

/// Fans a list of addresses out over the pipeline with a fixed ceiling on
/// in-flight validations. A slow address holds one slot until it finishes
/// or times out; the others keep flowing through the remaining slots.
/// Results come back in input order, one per input, duplicates included.
///
/// Dropping the future returned by [`BulkExecutor::run`] aborts every
/// validation still in flight.
#[derive(Clone)]
pub struct BulkExecutor {
    pipeline: Arc<ValidationPipeline>,
    concurrency: usize,
    max_emails: usize,
}

impl BulkExecutor {
    pub fn new(pipeline: Arc<ValidationPipeline>, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            max_emails: usize::MAX,
        }
    }

    pub fn with_max_emails(mut self, max_emails: usize) -> Self {
        self.max_emails = max_emails;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn run(
        &self,
        addresses: Vec<String>,
        options: ValidationOptions,
    ) -> Result<BulkResult, RequestError> {
        if addresses.is_empty() {
            return Err(RequestError::MissingEmails);
        }
        if addresses.len() > self.max_emails {
            return Err(RequestError::TooManyEmails {
                max: self.max_emails,
            });
        }

        let batch_id = Uuid::new_v4();
        let span = info_span!("bulk_validation", %batch_id, count = addresses.len());

        async move {
            info!(concurrency = self.concurrency, "Starting bulk validation");

            let mut results: Vec<ValidationResult> = addresses
                .iter()
                .map(|email| ValidationResult::pending(email.clone()))
                .collect();

            let mut completed = stream::iter(addresses.into_iter().enumerate())
                .map(|(index, email)| {
                    let pipeline = Arc::clone(&self.pipeline);
                    async move {
                        let request = ValidationRequest::new(email.clone(), options);
                        let result = match pipeline.validate_isolated(request).await {
                            Ok(result) => result,
                            Err(error) => {
                                warn!(index, %error, "Validation aborted for address");
                                ValidationResult::aborted(email, error)
                            }
                        };
                        (index, result)
                    }
                })
                .buffer_unordered(self.concurrency);

            // Completion order; each result goes back to its input position.
            while let Some((index, result)) = completed.next().await {
                results[index] = result;
            }

            info!("Bulk validation finished");
            Ok(BulkResult::from(results))
        }
        .instrument(span)
        .await
    }
}
