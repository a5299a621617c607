//! Feedback orchestration.
//!
//! Drives an admitted submission through scoring, persistence, and
//! enrollment advancement. The store writes are sequential and not
//! wrapped in a transaction: a failure after the feedback insert leaves
//! the feedback in place (the learner keeps it) and only the
//! advancement side at risk; nothing is rolled back.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use atelier_domain::{plan_advancement, Advancement, ScoreReport};
use atelier_scoring::ScoringGateway;
use atelier_store::{NewFeedback, Store};

use crate::certificate::CertificateService;
use crate::error::{PlatformError, Result};

/// Orchestrates scoring, feedback persistence, and progression.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn Store>,
    gateway: ScoringGateway,
    certificates: CertificateService,
}

impl FeedbackService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        gateway: ScoringGateway,
        certificates: CertificateService,
    ) -> Self {
        Self {
            store,
            gateway,
            certificates,
        }
    }

    /// Scores a submission and advances its enrollment.
    ///
    /// Ordering matters: the gateway call happens before any write, so
    /// a timeout or malformed output leaves no trace. After the
    /// feedback row lands the operation never fails the learner for
    /// advancement-side problems; those are logged and left to
    /// reconciliation.
    pub async fn process(
        &self,
        learner_id: Uuid,
        submission_id: Uuid,
        briefing: &str,
        deliverable: &str,
        module_title: &str,
        simulation_title: &str,
    ) -> Result<Uuid> {
        let submission = self
            .store
            .submission(submission_id)
            .await?
            .ok_or(PlatformError::SubmissionNotFound)?;
        if submission.learner_id != learner_id {
            warn!(%submission_id, "Feedback attempt on another learner's submission");
            return Err(PlatformError::AccessDenied);
        }

        // Not retried: a Timeout or InvalidOutput aborts the whole
        // operation before anything is written.
        let report = self
            .gateway
            .evaluate(briefing, deliverable, module_title, simulation_title)
            .await?;

        let feedback = self
            .store
            .insert_feedback(feedback_row(submission_id, &report))
            .await?;
        self.store.mark_submission_evaluated(submission_id).await?;

        info!(
            feedback_id = %feedback.id,
            %submission_id,
            global_score = report.global,
            mention = %report.mention,
            "Feedback recorded"
        );

        let Some(enrollment) = self.store.enrollment(submission.enrollment_id).await? else {
            // Recoverable inconsistency: the feedback exists, only the
            // advancement is missing.
            warn!(
                enrollment_id = %submission.enrollment_id,
                %submission_id,
                "Enrollment missing after feedback; progression skipped"
            );
            return Ok(feedback.id);
        };

        let modules = self
            .store
            .simulation_modules(enrollment.simulation_id)
            .await?;
        match plan_advancement(&modules, submission.module_id) {
            Advancement::NextModule(next_module_id) => {
                self.store
                    .advance_enrollment(enrollment.id, next_module_id)
                    .await?;
                info!(
                    enrollment_id = %enrollment.id,
                    %next_module_id,
                    "Enrollment advanced"
                );
            }
            Advancement::Complete => {
                self.store
                    .complete_enrollment(enrollment.id, report.global, Utc::now())
                    .await?;
                info!(
                    enrollment_id = %enrollment.id,
                    final_score = report.global,
                    "Enrollment complete"
                );

                // Best-effort and idempotent: the learner already has
                // their feedback, so issuance failures are logged, not
                // surfaced.
                if let Err(e) = self
                    .certificates
                    .issue(
                        enrollment.id,
                        enrollment.learner_id,
                        enrollment.simulation_id,
                        report.global,
                        report.mention,
                    )
                    .await
                {
                    error!(
                        enrollment_id = %enrollment.id,
                        error = %e,
                        "Certificate issuance failed"
                    );
                }
            }
        }

        Ok(feedback.id)
    }
}

fn feedback_row(submission_id: Uuid, report: &ScoreReport) -> NewFeedback {
    NewFeedback {
        submission_id,
        global_score: report.global,
        relevance_score: report.relevance,
        analysis_score: report.analysis,
        clarity_score: report.clarity,
        creativity_score: report.creativity,
        mention: report.mention,
        strengths: report.strengths.clone(),
        improvements: report.improvements.clone(),
        comment: report.comment.clone(),
    }
}
