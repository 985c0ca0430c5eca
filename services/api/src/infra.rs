use dual_risk_rating::rating::{LoanId, StoredSubmission, SubmissionStore, SubmissionStoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store standing in for the loan storage service.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionStore {
    records: Arc<Mutex<HashMap<LoanId, StoredSubmission>>>,
}

impl InMemorySubmissionStore {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<LoanId, StoredSubmission>>, SubmissionStoreError> {
        self.records.lock().map_err(|_| {
            SubmissionStoreError::Unavailable("submission store lock poisoned".to_string())
        })
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn store(
        &self,
        submission: StoredSubmission,
    ) -> Result<StoredSubmission, SubmissionStoreError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&submission.loan_id) {
            return Err(SubmissionStoreError::Conflict(submission.loan_id));
        }
        guard.insert(submission.loan_id.clone(), submission.clone());
        Ok(submission)
    }

    fn fetch(&self, loan_id: &LoanId) -> Result<Option<StoredSubmission>, SubmissionStoreError> {
        Ok(self.lock()?.get(loan_id).cloned())
    }
}
