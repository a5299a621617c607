//! Certificate issuance.
//!
//! Idempotent: the enrollment's existing certificate is returned when
//! one exists. Number generation retries once on a uniqueness
//! violation, then gives up.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use atelier_domain::Mention;
use atelier_store::{NewCertificate, Store};

use crate::error::{PlatformError, Result};

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 6;

/// Mints certificates for completed enrollments.
#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn Store>,
    prefix: String,
}

impl CertificateService {
    /// Creates the service with the configured number prefix.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Issues a certificate for a completed enrollment, exactly once.
    ///
    /// Safe to call repeatedly: an existing certificate's id is returned
    /// without a new row. A number collision triggers one regeneration;
    /// a second collision fails with
    /// [`PlatformError::CertificateNumberCollision`].
    pub async fn issue(
        &self,
        enrollment_id: Uuid,
        learner_id: Uuid,
        simulation_id: Uuid,
        final_score: u8,
        mention: Mention,
    ) -> Result<Uuid> {
        if let Some(existing) = self.store.certificate_for_enrollment(enrollment_id).await? {
            return Ok(existing.id);
        }

        for attempt in 0..2 {
            let number = certificate_number(&self.prefix);
            match self
                .store
                .insert_certificate(NewCertificate {
                    learner_id,
                    simulation_id,
                    enrollment_id,
                    final_score,
                    mention,
                    number,
                })
                .await
            {
                Ok(certificate) => {
                    info!(
                        certificate_id = %certificate.id,
                        %enrollment_id,
                        number = %certificate.number,
                        "Certificate issued"
                    );
                    return Ok(certificate.id);
                }
                Err(e) if e.is_unique_violation() => {
                    // A concurrent issuance may have won; defer to it.
                    if let Some(existing) =
                        self.store.certificate_for_enrollment(enrollment_id).await?
                    {
                        return Ok(existing.id);
                    }
                    if attempt == 0 {
                        continue;
                    }
                    return Err(PlatformError::CertificateNumberCollision);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(PlatformError::CertificateNumberCollision)
    }
}

/// Generates a human-shareable number: prefix, current year, and a
/// short random alphanumeric suffix, e.g. `ATELIER-2026-K3X9QZ`.
#[must_use]
pub fn certificate_number(prefix: &str) -> String {
    let year = Utc::now().year();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let i = rng.gen_range(0..SUFFIX_ALPHABET.len());
            SUFFIX_ALPHABET[i] as char
        })
        .collect();
    format!("{prefix}-{year}-{suffix}")
}
