use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::submission::SubmissionRecord;

pub const SUBMISSION_ACCEPTED: &str = "Loan application submitted successfully";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub String);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submission record as handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub loan_id: LoanId,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: SubmissionRecord,
}

impl StoredSubmission {
    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            message: SUBMISSION_ACCEPTED.to_string(),
            loan_id: self.loan_id.clone(),
        }
    }
}

/// Acknowledgement returned to the caller once the store accepts a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub loan_id: LoanId,
}

/// Storage collaborator for completed submissions.
pub trait SubmissionStore: Send + Sync {
    fn store(&self, submission: StoredSubmission) -> Result<StoredSubmission, SubmissionStoreError>;
    fn fetch(&self, loan_id: &LoanId) -> Result<Option<StoredSubmission>, SubmissionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionStoreError {
    #[error("loan {0} has already been submitted")]
    Conflict(LoanId),
    #[error("submission store unavailable: {0}")]
    Unavailable(String),
}
