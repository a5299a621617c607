//! Submission admission control.
//!
//! Validates and persists a learner's deliverable for a module. The
//! pipeline short-circuits on the first failure: length, ownership,
//! duplication, then the daily rate limit; only then is the pending row
//! written.

use std::sync::Arc;

use chrono::{DateTime, Local, LocalResult, NaiveTime, TimeZone, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use atelier_domain::SubmissionStatus;
use atelier_store::{NewSubmission, Store};

use crate::error::{PlatformError, Result};

/// Admits deliverables into the evaluation pipeline.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
    min_chars: usize,
    daily_limit: u64,
}

impl SubmissionService {
    /// Creates the service with the configured limits.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, min_chars: usize, daily_limit: u64) -> Self {
        Self {
            store,
            min_chars,
            daily_limit,
        }
    }

    /// Validates and persists one deliverable, returning the new
    /// submission's id.
    ///
    /// Checks run in order and short-circuit: trimmed length, enrollment
    /// existence and ownership, no evaluated duplicate for the
    /// (learner, module, enrollment) triple, daily rate limit. A still
    /// pending duplicate does not block re-submission.
    pub async fn submit(
        &self,
        learner_id: Uuid,
        module_id: Uuid,
        enrollment_id: Uuid,
        deliverable_text: &str,
    ) -> Result<Uuid> {
        let trimmed = deliverable_text.trim();
        if trimmed.chars().count() < self.min_chars {
            return Err(PlatformError::DeliverableTooShort {
                minimum: self.min_chars,
            });
        }

        let enrollment = self
            .store
            .enrollment(enrollment_id)
            .await?
            .ok_or(PlatformError::EnrollmentNotFound)?;
        if enrollment.learner_id != learner_id {
            warn!(%enrollment_id, "Submission attempt on another learner's enrollment");
            return Err(PlatformError::AccessDenied);
        }

        if let Some(existing) = self
            .store
            .find_submission(learner_id, module_id, enrollment_id)
            .await?
        {
            if existing.status == SubmissionStatus::Evaluated {
                return Err(PlatformError::AlreadyEvaluated);
            }
            // A pending duplicate is allowed through; see the note on
            // concurrent admissions in the store contract.
        }

        let since = start_of_day(Local::now());
        let today = self.store.count_submissions_since(learner_id, since).await?;
        if today >= self.daily_limit {
            return Err(PlatformError::RateLimitExceeded {
                limit: self.daily_limit,
            });
        }

        let submission = self
            .store
            .insert_submission(NewSubmission {
                learner_id,
                module_id,
                enrollment_id,
                text: trimmed.to_string(),
            })
            .await?;

        info!(
            submission_id = %submission.id,
            %module_id,
            %enrollment_id,
            "Submission admitted"
        );
        Ok(submission.id)
    }
}

/// Start of the local calendar day containing `now`, as a UTC instant.
///
/// The rate-limit window is `[start_of_day(now), now)`; no shared
/// counter, just a scoped count query.
#[must_use]
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        // A day whose midnight does not exist locally (DST gap): fall
        // back to the instant itself, which only narrows the window.
        LocalResult::None => now.with_timezone(&Utc),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use atelier_domain::Enrollment;
    use atelier_store::MemoryStore;

    const DELIVERABLE: &str =
        "Voici mon analyse du marché local, structurée en trois parties distinctes.";

    struct Fixture {
        store: Arc<MemoryStore>,
        service: SubmissionService,
        learner: Uuid,
        module: Uuid,
        enrollment: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let learner = Uuid::new_v4();
        let module = Uuid::new_v4();
        let enrollment = Enrollment::new(learner, Uuid::new_v4(), module);
        let enrollment_id = enrollment.id;
        store.seed_enrollment(enrollment).await;

        let service = SubmissionService::new(store.clone(), 50, 5);
        Fixture {
            store,
            service,
            learner,
            module,
            enrollment: enrollment_id,
        }
    }

    #[tokio::test]
    async fn test_short_deliverable_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .submit(f.learner, f.module, f.enrollment, "Trop court.")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlatformError::DeliverableTooShort { minimum: 50 }
        ));
    }

    #[tokio::test]
    async fn test_length_checked_after_trimming() {
        let f = fixture().await;
        let padded = format!("   {}   ", "x".repeat(49));
        let err = f
            .service
            .submit(f.learner, f.module, f.enrollment, &padded)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::DeliverableTooShort { .. }));

        // Exactly 50 characters once trimmed passes.
        let padded = format!("   {}   ", "x".repeat(50));
        f.service
            .submit(f.learner, f.module, f.enrollment, &padded)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_enrollment_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .submit(f.learner, f.module, Uuid::new_v4(), DELIVERABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::EnrollmentNotFound));
    }

    #[tokio::test]
    async fn test_foreign_enrollment_rejected() {
        let f = fixture().await;
        let intruder = Uuid::new_v4();
        let err = f
            .service
            .submit(intruder, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::AccessDenied));
    }

    #[tokio::test]
    async fn test_evaluated_module_conflicts() {
        let f = fixture().await;
        let id = f
            .service
            .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap();
        f.store.mark_submission_evaluated(id).await.unwrap();

        let err = f
            .service
            .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::AlreadyEvaluated));
    }

    #[tokio::test]
    async fn test_pending_duplicate_is_allowed() {
        let f = fixture().await;
        let first = f
            .service
            .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap();
        let second = f
            .service
            .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_sixth_submission_of_the_day_rate_limited() {
        let f = fixture().await;
        for _ in 0..5 {
            f.service
                .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
                .await
                .unwrap();
        }

        let err = f
            .service
            .submit(f.learner, f.module, f.enrollment, DELIVERABLE)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::RateLimitExceeded { limit: 5 }));
    }

    #[tokio::test]
    async fn test_stored_text_is_trimmed() {
        let f = fixture().await;
        let id = f
            .service
            .submit(f.learner, f.module, f.enrollment, &format!("  {DELIVERABLE}  "))
            .await
            .unwrap();

        let stored = f.store.submission(id).await.unwrap().unwrap();
        assert_eq!(stored.text, DELIVERABLE);
        assert_eq!(stored.status, SubmissionStatus::Pending);
    }

    #[test]
    fn test_start_of_day_is_midnight_local() {
        let now = Local::now();
        let start = start_of_day(now);
        assert!(start <= now.with_timezone(&Utc));
        let local_start = start.with_timezone(&Local);
        assert_eq!(local_start.time(), NaiveTime::MIN);
        assert_eq!(local_start.date_naive(), now.date_naive());
    }
}
