//! End-to-end grading scenarios driven through the public service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use dual_risk_rating::rating::{
        LoanGradingService, LoanId, LoanInput, LoanType, PropertyType, Rating, RatingModel,
        StoredSubmission, SubmissionStore, SubmissionStoreError,
    };

    #[derive(Default, Clone)]
    pub(super) struct RecordingStore {
        records: Arc<Mutex<HashMap<LoanId, StoredSubmission>>>,
    }

    impl RecordingStore {
        pub(super) fn get(&self, loan_id: &LoanId) -> Option<StoredSubmission> {
            self.records
                .lock()
                .expect("store mutex poisoned")
                .get(loan_id)
                .cloned()
        }
    }

    impl SubmissionStore for RecordingStore {
        fn store(
            &self,
            submission: StoredSubmission,
        ) -> Result<StoredSubmission, SubmissionStoreError> {
            self.records
                .lock()
                .expect("store mutex poisoned")
                .insert(submission.loan_id.clone(), submission.clone());
            Ok(submission)
        }

        fn fetch(
            &self,
            loan_id: &LoanId,
        ) -> Result<Option<StoredSubmission>, SubmissionStoreError> {
            Ok(self.get(loan_id))
        }
    }

    pub(super) fn service() -> (Arc<LoanGradingService<RecordingStore>>, RecordingStore) {
        let store = RecordingStore::default();
        let service = LoanGradingService::new(Arc::new(store.clone()), RatingModel::standard())
            .expect("published model is valid");
        (Arc::new(service), store)
    }

    /// Analyst flow: choose property type, enter metrics, then rate each listed factor.
    pub(super) fn office_draft() -> LoanInput {
        let mut loan = LoanInput::default();
        loan.select_property_type(PropertyType::Office);
        loan.loan_type = Some(LoanType::Permanent);
        loan.dscr = Some(1.6);
        loan.occupancy = Some(96.0);
        loan.ltv = Some(50.0);
        for factor in loan.applicable_factors() {
            loan.rate(factor, Rating::new(4).expect("in range"))
                .expect("factor applies");
        }
        loan
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use dual_risk_rating::rating::{
    grading_router, GradingRequest, LoanId, OverrideState, QualitativeFactor,
};

#[test]
fn office_loan_submits_with_computed_grades() {
    let (service, store) = common::service();
    let request = GradingRequest {
        loan: common::office_draft(),
        override_state: OverrideState::default(),
    };

    let preview = service.preview(&request).expect("preview succeeds");
    assert!(preview.validation.is_valid);

    let receipt = service.submit(request).expect("submission succeeds");
    let stored = store.get(&receipt.loan_id).expect("record stored");
    let payload = serde_json::to_value(&stored).expect("stored record serializes");

    assert_eq!(payload["loan_id"], json!(receipt.loan_id.0));
    assert_eq!(payload["weighted_brg"], json!(4));
    assert_eq!(payload["final_brg"], json!(4.0));
    assert_eq!(payload["weighted_frg"], json!(5));
    assert_eq!(payload["final_frg"], json!(5.0));
    assert_eq!(payload["loanType"], json!("Permanent"));
    assert_eq!(payload["override_brg"], Value::Null);
    assert_eq!(payload["override_frg"], Value::Null);
    assert_eq!(payload["justification"], Value::Null);
    assert!(payload.get("submitted_at").is_some());
}

#[test]
fn analyst_override_requires_justification_before_submission() {
    let (service, store) = common::service();
    let loan = common::office_draft();

    let computed = service
        .calculator()
        .compute(&loan)
        .expect("published model is valid");
    let mut override_state = OverrideState::default();
    override_state.engage(&computed);
    override_state.brg = Some(5.0);

    let mut request = GradingRequest {
        loan,
        override_state,
    };
    let rejected = service.submit(request.clone()).expect_err("justification missing");
    assert_eq!(
        rejected.validation().map(|report| report.missing_fields.clone()),
        Some(vec!["Justification for Override"])
    );

    request.override_state.justification = Some("Anchor tenant renewal signed".to_string());
    let receipt = service.submit(request).expect("submission succeeds");
    let stored = store.get(&receipt.loan_id).expect("record stored");

    assert_eq!(stored.record.weighted_brg, 4);
    assert_eq!(stored.record.final_brg, 5.0);
    assert_eq!(stored.record.override_frg, Some(5.0));
    assert_eq!(
        stored.record.justification.as_deref(),
        Some("Anchor tenant renewal signed")
    );
}

#[test]
fn property_type_switch_demands_new_ratings() {
    let (service, _) = common::service();
    let mut loan = common::office_draft();

    loan.select_property_type(dual_risk_rating::rating::PropertyType::Hotel);
    let request = GradingRequest {
        loan,
        override_state: OverrideState::default(),
    };

    assert!(request
        .loan
        .rating(QualitativeFactor::NumberOfUnits)
        .is_some());
    assert!(request
        .loan
        .rating(QualitativeFactor::LeaseExpiration)
        .is_none());

    let preview = service.preview(&request).expect("preview succeeds");
    assert_eq!(
        preview.validation.missing_fields,
        vec![
            QualitativeFactor::MarketRent.label(),
            QualitativeFactor::AccessToCapitalMarkets.label(),
            QualitativeFactor::Liquidity.label(),
        ]
    );
}

#[tokio::test]
async fn submit_route_persists_and_acknowledges() {
    let (service, store) = common::service();
    let router = grading_router(service);

    let request = GradingRequest {
        loan: common::office_draft(),
        override_state: OverrideState::default(),
    };
    let response = router
        .oneshot(
            Request::post("/submit-loan")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&request).expect("request serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(
        payload["message"],
        json!("Loan application submitted successfully")
    );

    let loan_id = LoanId(
        payload["loan_id"]
            .as_str()
            .expect("loan id present")
            .to_string(),
    );
    assert!(store.get(&loan_id).is_some());
}
