use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::rating::{
    grading_router, GradingRequest, LineOfBusiness, LoanGradingService, LoanId, LoanInput,
    LoanType, OverrideState, PropertyType, Rating, RatingModel, ScoreCalculator,
    StoredSubmission, SubmissionStore, SubmissionStoreError,
};

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn rating(value: u8) -> Rating {
    Rating::new(value).expect("rating within scale")
}

pub(super) fn calculator() -> ScoreCalculator {
    ScoreCalculator::standard()
}

/// Loan with every applicable factor rated the same.
pub(super) fn rated_loan(
    property_type: PropertyType,
    dscr: f64,
    occupancy: f64,
    ltv: f64,
    uniform_rating: u8,
) -> LoanInput {
    let mut loan = LoanInput {
        line_of_business: LineOfBusiness::CommercialRealEstate,
        loan_type: Some(LoanType::Mortgage),
        dscr: Some(dscr),
        occupancy: Some(occupancy),
        ltv: Some(ltv),
        ..LoanInput::default()
    };
    loan.select_property_type(property_type);
    for factor in loan.applicable_factors() {
        loan.rate(factor, rating(uniform_rating))
            .expect("factor applies");
    }
    loan
}

/// Office, DSCR 1.6, occupancy 96%, LTV 50%, all factors rated 4.
pub(super) fn office_loan() -> LoanInput {
    rated_loan(PropertyType::Office, 1.6, 96.0, 50.0, 4)
}

pub(super) fn office_request() -> GradingRequest {
    GradingRequest {
        loan: office_loan(),
        override_state: OverrideState::default(),
    }
}

pub(super) fn overridden_request() -> GradingRequest {
    GradingRequest {
        loan: office_loan(),
        override_state: OverrideState {
            enabled: true,
            brg: Some(6.0),
            frg: Some(3.0),
            justification: Some("  Sponsor recapitalization pending  ".to_string()),
        },
    }
}

pub(super) fn build_service() -> (LoanGradingService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service =
        LoanGradingService::new(store.clone(), RatingModel::standard()).expect("model is valid");
    (service, store)
}

pub(super) fn grading_router_with_store<S>(store: S) -> axum::Router
where
    S: SubmissionStore + 'static,
{
    let service = LoanGradingService::new(Arc::new(store), RatingModel::standard())
        .expect("model is valid");
    grading_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<BTreeMap<LoanId, StoredSubmission>>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<StoredSubmission> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl SubmissionStore for MemoryStore {
    fn store(
        &self,
        submission: StoredSubmission,
    ) -> Result<StoredSubmission, SubmissionStoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&submission.loan_id) {
            return Err(SubmissionStoreError::Conflict(submission.loan_id));
        }
        guard.insert(submission.loan_id.clone(), submission.clone());
        Ok(submission)
    }

    fn fetch(&self, loan_id: &LoanId) -> Result<Option<StoredSubmission>, SubmissionStoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(loan_id).cloned())
    }
}

pub(super) struct UnavailableStore;

impl SubmissionStore for UnavailableStore {
    fn store(
        &self,
        _submission: StoredSubmission,
    ) -> Result<StoredSubmission, SubmissionStoreError> {
        Err(SubmissionStoreError::Unavailable("storage offline".to_string()))
    }

    fn fetch(&self, _loan_id: &LoanId) -> Result<Option<StoredSubmission>, SubmissionStoreError> {
        Err(SubmissionStoreError::Unavailable("storage offline".to_string()))
    }
}

/// Store that has already seen every loan id it is offered.
pub(super) struct DuplicateStore;

impl SubmissionStore for DuplicateStore {
    fn store(
        &self,
        submission: StoredSubmission,
    ) -> Result<StoredSubmission, SubmissionStoreError> {
        Err(SubmissionStoreError::Conflict(submission.loan_id))
    }

    fn fetch(&self, _loan_id: &LoanId) -> Result<Option<StoredSubmission>, SubmissionStoreError> {
        Ok(None)
    }
}

pub(super) fn json_post(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(payload).expect("payload serializes"),
        ))
        .expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
