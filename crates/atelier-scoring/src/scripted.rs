//! Scripted evaluator for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{Evaluator, Result, ScoringError};

/// An [`Evaluator`] that replays canned responses in order.
///
/// Used by the test suites and by the dev server's offline mode. Once
/// the queue is exhausted the last response is repeated, so a single
/// canned report serves any number of calls.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl ScriptedEvaluator {
    /// Creates an evaluator that replays `responses` in order.
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
        }
    }

    /// Creates an evaluator that always answers with `response`.
    #[must_use]
    pub fn always(response: impl Into<String>) -> Self {
        Self::with_responses(vec![response.into()])
    }
}

#[async_trait::async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        let next = self
            .responses
            .lock()
            .map_err(|_| ScoringError::upstream("scripted evaluator poisoned"))?
            .pop_front();

        let mut last = self
            .last
            .lock()
            .map_err(|_| ScoringError::upstream("scripted evaluator poisoned"))?;

        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None => last
                .clone()
                .ok_or_else(|| ScoringError::upstream("scripted evaluator has no responses")),
        }
    }
}
