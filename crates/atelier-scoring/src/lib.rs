//! Atelier Scoring
//!
//! Wraps the external AI evaluator behind the [`ScoringGateway`]:
//! prompt construction, a bounded wait with cancellation, and parsing
//! of the evaluator's loosely structured output into a validated
//! [`ScoreReport`](atelier_domain::ScoreReport).
//!
//! The gateway is purely functional from the caller's perspective: a
//! timeout or malformed output means the evaluation did not happen and
//! nothing was persisted anywhere.

pub mod anthropic;
mod parser;
mod prompt;
pub mod scripted;

pub use anthropic::AnthropicEvaluator;
pub use parser::parse_score_report;
pub use prompt::{system_prompt, user_prompt};
pub use scripted::ScriptedEvaluator;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use atelier_domain::ScoreReport;

/// Default upper bound on the evaluator call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A specialized `Result` type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Errors surfaced by the scoring gateway.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// A required text input was empty after trimming.
    #[error("scoring input '{field}' must not be empty")]
    EmptyInput {
        /// Name of the empty input.
        field: &'static str,
    },

    /// The evaluator did not answer within the bound; the call was
    /// aborted and is considered not-performed.
    #[error("evaluator timed out after {timeout_secs}s")]
    Timeout {
        /// The bound that expired, in seconds.
        timeout_secs: u64,
    },

    /// The evaluator answered but no valid score report could be
    /// extracted. Terminal for this request, never retried here.
    #[error("invalid scoring output: {reason}")]
    InvalidOutput {
        /// What was wrong with the output.
        reason: String,
    },

    /// The evaluator call itself failed (network, API error).
    #[error("evaluator request failed: {message}")]
    Upstream {
        /// Description of the upstream failure.
        message: String,
    },
}

impl ScoringError {
    /// Creates an `InvalidOutput` error.
    #[must_use]
    pub fn invalid_output(reason: impl Into<String>) -> Self {
        Self::InvalidOutput {
            reason: reason.into(),
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// The external AI evaluator, as a black box: a system prompt and a
/// user prompt in, unstructured text out.
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    /// Runs one completion against the evaluator.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Wraps an [`Evaluator`] with input shape checks, a bounded wait, and
/// output parsing.
#[derive(Clone)]
pub struct ScoringGateway {
    evaluator: Arc<dyn Evaluator>,
    timeout: Duration,
}

impl ScoringGateway {
    /// Creates a gateway with the default 30 second bound.
    #[must_use]
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self::with_timeout(evaluator, DEFAULT_TIMEOUT)
    }

    /// Creates a gateway with an explicit bound on the evaluator call.
    #[must_use]
    pub const fn with_timeout(evaluator: Arc<dyn Evaluator>, timeout: Duration) -> Self {
        Self { evaluator, timeout }
    }

    /// Evaluates one deliverable against its briefing.
    ///
    /// All four inputs must be non-empty (shape check only; business
    /// validation belongs to the caller). On timeout the in-flight call
    /// is dropped, aborting the underlying request, and
    /// [`ScoringError::Timeout`] is returned with no partial report.
    pub async fn evaluate(
        &self,
        briefing: &str,
        deliverable: &str,
        module_title: &str,
        simulation_title: &str,
    ) -> Result<ScoreReport> {
        require_non_empty("briefing", briefing)?;
        require_non_empty("deliverable", deliverable)?;
        require_non_empty("module_title", module_title)?;
        require_non_empty("simulation_title", simulation_title)?;

        let system = system_prompt();
        let user = user_prompt(briefing, deliverable, module_title, simulation_title);

        let raw = match tokio::time::timeout(self.timeout, self.evaluator.complete(system, &user))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Evaluator timed out");
                return Err(ScoringError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let report = parse_score_report(&raw)?;
        debug!(
            global = report.global,
            mention = %report.mention,
            "Score report parsed"
        );
        Ok(report)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoringError::EmptyInput { field });
    }
    Ok(())
}
