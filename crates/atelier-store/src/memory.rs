//! In-memory [`Store`] implementation.
//!
//! Backs the dev server and the test suites. State lives in
//! `tokio::sync::RwLock`-wrapped maps; uniqueness constraints mirror
//! the relational schema (one certificate per enrollment, unique
//! certificate numbers).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use atelier_domain::{
    Certificate, Enrollment, EnrollmentStatus, Feedback, ModuleRef, Submission, SubmissionStatus,
};

use crate::{NewCertificate, NewFeedback, NewSubmission, Result, Store, StoreError};

#[derive(Debug, Default)]
struct Inner {
    enrollments: RwLock<HashMap<Uuid, Enrollment>>,
    submissions: RwLock<HashMap<Uuid, Submission>>,
    feedbacks: RwLock<HashMap<Uuid, Feedback>>,
    certificates: RwLock<HashMap<Uuid, Certificate>>,
    // simulation id -> modules ordered by position
    modules: RwLock<HashMap<Uuid, Vec<ModuleRef>>>,
}

/// In-process store with the same contracts as the relational backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an enrollment row. Test and dev-server helper.
    pub async fn seed_enrollment(&self, enrollment: Enrollment) {
        self.inner
            .enrollments
            .write()
            .await
            .insert(enrollment.id, enrollment);
    }

    /// Seeds a simulation's module list, sorted by position.
    pub async fn seed_modules(&self, simulation_id: Uuid, mut modules: Vec<ModuleRef>) {
        modules.sort_by_key(|m| m.position);
        self.inner
            .modules
            .write()
            .await
            .insert(simulation_id, modules);
    }

    /// Fetches a feedback row by id. Test helper.
    pub async fn feedback(&self, id: Uuid) -> Option<Feedback> {
        self.inner.feedbacks.read().await.get(&id).cloned()
    }

    /// Number of feedback rows held. Test helper.
    pub async fn feedback_count(&self) -> usize {
        self.inner.feedbacks.read().await.len()
    }

    /// Number of certificate rows held. Test helper.
    pub async fn certificate_count(&self) -> usize {
        self.inner.certificates.read().await.len()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn enrollment(&self, id: Uuid) -> Result<Option<Enrollment>> {
        Ok(self.inner.enrollments.read().await.get(&id).cloned())
    }

    async fn advance_enrollment(&self, id: Uuid, next_module_id: Uuid) -> Result<()> {
        let mut enrollments = self.inner.enrollments.write().await;
        let enrollment = enrollments
            .get_mut(&id)
            .ok_or(StoreError::row_not_found("enrollment", id))?;
        enrollment.current_module_id = Some(next_module_id);
        Ok(())
    }

    async fn complete_enrollment(
        &self,
        id: Uuid,
        final_score: u8,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut enrollments = self.inner.enrollments.write().await;
        let enrollment = enrollments
            .get_mut(&id)
            .ok_or(StoreError::row_not_found("enrollment", id))?;
        enrollment.status = EnrollmentStatus::Complete;
        enrollment.current_module_id = None;
        enrollment.final_score = Some(final_score);
        enrollment.completed_at = Some(completed_at);
        Ok(())
    }

    async fn submission(&self, id: Uuid) -> Result<Option<Submission>> {
        Ok(self.inner.submissions.read().await.get(&id).cloned())
    }

    async fn find_submission(
        &self,
        learner_id: Uuid,
        module_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<Option<Submission>> {
        let submissions = self.inner.submissions.read().await;
        let mut found: Option<&Submission> = None;
        for submission in submissions.values() {
            if submission.learner_id == learner_id
                && submission.module_id == module_id
                && submission.enrollment_id == enrollment_id
            {
                if submission.status == SubmissionStatus::Evaluated {
                    return Ok(Some(submission.clone()));
                }
                found = Some(submission);
            }
        }
        Ok(found.cloned())
    }

    async fn count_submissions_since(&self, learner_id: Uuid, since: DateTime<Utc>) -> Result<u64> {
        let submissions = self.inner.submissions.read().await;
        let count = submissions
            .values()
            .filter(|s| s.learner_id == learner_id && s.submitted_at >= since)
            .count();
        Ok(count as u64)
    }

    async fn insert_submission(&self, new: NewSubmission) -> Result<Submission> {
        let submission = Submission {
            id: Uuid::new_v4(),
            learner_id: new.learner_id,
            module_id: new.module_id,
            enrollment_id: new.enrollment_id,
            text: new.text,
            status: SubmissionStatus::Pending,
            submitted_at: Utc::now(),
        };
        self.inner
            .submissions
            .write()
            .await
            .insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn mark_submission_evaluated(&self, id: Uuid) -> Result<()> {
        let mut submissions = self.inner.submissions.write().await;
        let submission = submissions
            .get_mut(&id)
            .ok_or(StoreError::row_not_found("submission", id))?;
        submission.status = SubmissionStatus::Evaluated;
        Ok(())
    }

    async fn insert_feedback(&self, new: NewFeedback) -> Result<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            submission_id: new.submission_id,
            global_score: new.global_score,
            relevance_score: new.relevance_score,
            analysis_score: new.analysis_score,
            clarity_score: new.clarity_score,
            creativity_score: new.creativity_score,
            mention: new.mention,
            strengths: new.strengths,
            improvements: new.improvements,
            comment: new.comment,
            generated_at: Utc::now(),
        };
        self.inner
            .feedbacks
            .write()
            .await
            .insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    async fn simulation_modules(&self, simulation_id: Uuid) -> Result<Vec<ModuleRef>> {
        Ok(self
            .inner
            .modules
            .read()
            .await
            .get(&simulation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn certificate_for_enrollment(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<Certificate>> {
        let certificates = self.inner.certificates.read().await;
        Ok(certificates
            .values()
            .find(|c| c.enrollment_id == enrollment_id)
            .cloned())
    }

    async fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate> {
        let mut certificates = self.inner.certificates.write().await;
        if certificates
            .values()
            .any(|c| c.enrollment_id == new.enrollment_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "certificates_enrollment_id_key",
            });
        }
        if certificates.values().any(|c| c.number == new.number) {
            return Err(StoreError::UniqueViolation {
                constraint: "certificates_number_key",
            });
        }
        let certificate = Certificate {
            id: Uuid::new_v4(),
            learner_id: new.learner_id,
            simulation_id: new.simulation_id,
            enrollment_id: new.enrollment_id,
            final_score: new.final_score,
            mention: new.mention,
            number: new.number,
            issued_at: Utc::now(),
        };
        certificates.insert(certificate.id, certificate.clone());
        Ok(certificate)
    }
}
