//! Request orchestrator
//!
//! PROMPT → GENERATE → VALIDATE. One call per report, no retries.

use crate::error::{GenerationError, TransportError};
use crate::models::{parse_report, StrategyReport};
use crate::provider::GenerativeModel;
use crate::schema::response_schema;
use crate::Result;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod prompt;
pub use prompt::build_prompt;

/// Turns a company description into a validated `StrategyReport`
pub struct StrategyOrchestrator {
    model: Arc<dyn GenerativeModel>,
    timeout: Option<Duration>,
}

impl StrategyOrchestrator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            timeout: None,
        }
    }

    /// Fail with a transport error when the provider takes longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate a strategy report for `description`.
    ///
    /// The returned report is exactly what the model produced; nothing is
    /// normalized or filled in.
    pub async fn generate_report(&self, description: &str) -> Result<StrategyReport> {
        let start_time = Instant::now();
        let fingerprint = description_fingerprint(description);
        let prompt = build_prompt(description);

        info!(
            model = self.model.model_name(),
            description = %fingerprint,
            prompt_len = prompt.len(),
            "Generating strategy report"
        );

        let outcome = self.call_model(&prompt).await.and_then(|raw| {
            debug!(payload_len = raw.len(), "Model payload received");
            parse_report(&raw)
        });

        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        match &outcome {
            Ok(report) => info!(
                description = %fingerprint,
                company = %report.company_name,
                elapsed_ms,
                "Strategy report generated"
            ),
            Err(e) => warn!(
                description = %fingerprint,
                kind = e.kind(),
                error = %e,
                elapsed_ms,
                "Strategy generation failed"
            ),
        }

        outcome
    }

    async fn call_model(&self, prompt: &str) -> Result<String> {
        let schema = response_schema();

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.model.generate(prompt, schema))
                .await
                .map_err(|_| GenerationError::from(TransportError::Timeout(limit)))?,
            None => self.model.generate(prompt, schema).await,
        }
    }
}

/// Short stable hash so logs can correlate requests without the raw text
pub fn description_fingerprint(description: &str) -> String {
    let hash = Sha256::digest(description.as_bytes());
    hex::encode(&hash[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::full_report_text;
    use crate::provider::ScriptedModel;
    use tokio_test::assert_ok;

    fn orchestrator(model: &Arc<ScriptedModel>) -> StrategyOrchestrator {
        StrategyOrchestrator::new(model.clone())
    }

    #[tokio::test]
    async fn test_generate_report_success() {
        let model = Arc::new(ScriptedModel::new().respond_with(full_report_text("ElectroMax")));

        let report = assert_ok!(
            orchestrator(&model)
                .generate_report("Tienda de electrónica, 10 empleados")
                .await
        );

        assert_eq!(report.company_name, "ElectroMax");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Tienda de electrónica, 10 empleados"));
    }

    #[tokio::test]
    async fn test_empty_text_is_empty_response() {
        let model = Arc::new(ScriptedModel::new().respond_with(""));
        let err = orchestrator(&model).generate_report("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_partial_payload_is_malformed() {
        let model = Arc::new(ScriptedModel::new().respond_with(r#"{"companyName": "X"}"#));
        let err = orchestrator(&model).generate_report("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let model = Arc::new(ScriptedModel::new().fail_with(GenerationError::from(
            TransportError::Status {
                status: 429,
                body: "quota".to_string(),
            },
        )));

        let err = orchestrator(&model).generate_report("x").await.unwrap_err();
        assert_eq!(err.kind(), "transport_failure");
        assert!(err.to_string().contains("quota"));
        assert_eq!(model.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transport_failure() {
        let model = Arc::new(
            ScriptedModel::new()
                .respond_with(full_report_text("Slow"))
                .with_delay(Duration::from_secs(60)),
        );

        let err = orchestrator(&model)
            .with_timeout(Some(Duration::from_secs(5)))
            .generate_report("x")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::TransportFailure(TransportError::Timeout(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = description_fingerprint("Tienda");
        assert_eq!(a, description_fingerprint("Tienda"));
        assert_ne!(a, description_fingerprint("Tienda 2"));
        assert_eq!(a.len(), 12);
    }
}
