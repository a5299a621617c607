//! Atelier Domain
//!
//! Domain types shared across the platform: enrollments, submissions,
//! feedback, certificates, mention banding, and the enrollment
//! progression engine.

pub mod certificate;
pub mod enrollment;
pub mod mention;
pub mod progression;
pub mod submission;

pub use certificate::Certificate;
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use mention::Mention;
pub use progression::{plan_advancement, Advancement, ModuleRef};
pub use submission::{Feedback, ScoreReport, Submission, SubmissionStatus};
