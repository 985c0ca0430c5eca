use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::calculator::{ComputedRatings, ScoreCalculator};
use super::domain::{Grade, InputError, LineOfBusiness, LoanInput};
use super::model::{RatingConfigError, RatingModel};
use super::store::{
    LoanId, StoredSubmission, SubmissionReceipt, SubmissionStore, SubmissionStoreError,
};
use super::submission::SubmissionAssembler;
use super::validation::{
    CompletionError, IncompleteApplication, OverrideState, OverrideValidator, ValidationReport,
};

/// Draft loan plus the analyst's override, as posted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradingRequest {
    #[serde(flatten)]
    pub loan: LoanInput,
    #[serde(default, rename = "override")]
    pub override_state: OverrideState,
}

/// Live grades and completeness for a draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePreview {
    pub computed: ComputedRatings,
    pub final_brg: Option<f64>,
    pub final_frg: Option<f64>,
    pub validation: ValidationReport,
}

/// Composes the calculator, validator and assembler around a submission store.
pub struct LoanGradingService<S> {
    calculator: Arc<ScoreCalculator>,
    store: Arc<S>,
}

static LOAN_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_loan_id() -> LoanId {
    let id = LOAN_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LoanId(format!("loan-{id:06}"))
}

impl<S> LoanGradingService<S>
where
    S: SubmissionStore + 'static,
{
    pub fn new(store: Arc<S>, model: RatingModel) -> Result<Self, GradingServiceError> {
        let calculator = ScoreCalculator::new(model)?;
        Ok(Self::with_calculator(calculator, store))
    }

    pub fn with_calculator(calculator: ScoreCalculator, store: Arc<S>) -> Self {
        Self {
            calculator: Arc::new(calculator),
            store,
        }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Grades as far as the draft allows, alongside what is still missing.
    pub fn preview(&self, request: &GradingRequest) -> Result<GradePreview, GradingServiceError> {
        request.loan.ensure_consistent()?;
        let computed = self.calculator.compute(&request.loan)?;
        let validation = OverrideValidator::validate(&request.loan, &request.override_state);

        Ok(GradePreview {
            final_brg: request.override_state.final_grade(Grade::Borrower, &computed),
            final_frg: request.override_state.final_grade(Grade::Facility, &computed),
            computed,
            validation,
        })
    }

    /// Validate, assemble and store a completed loan.
    pub fn submit(
        &self,
        request: GradingRequest,
    ) -> Result<SubmissionReceipt, GradingServiceError> {
        let GradingRequest {
            loan,
            override_state,
        } = request;

        if loan.line_of_business != LineOfBusiness::CommercialRealEstate {
            tracing::warn!(
                line_of_business = loan.line_of_business.code(),
                "rejected submission for a line of business without a rating model"
            );
            return Err(GradingServiceError::UnsupportedLineOfBusiness(
                loan.line_of_business,
            ));
        }

        loan.ensure_consistent()?;
        let application = OverrideValidator::complete(&loan, &override_state, &self.calculator)
            .inspect_err(|error| {
                if let CompletionError::Incomplete(incomplete) = error {
                    tracing::warn!(
                        missing = ?incomplete.0.missing_fields,
                        violations = incomplete.0.range_violations.len(),
                        "rejected incomplete loan submission"
                    );
                }
            })?;

        let record = SubmissionAssembler::assemble(&application);
        let stored = self.store.store(StoredSubmission {
            loan_id: next_loan_id(),
            submitted_at: Utc::now(),
            record,
        })?;

        tracing::info!(
            loan_id = %stored.loan_id,
            property_type = %application.property_type(),
            final_brg = stored.record.final_brg,
            final_frg = stored.record.final_frg,
            overridden = stored.record.override_enabled,
            "loan application submitted"
        );

        Ok(stored.receipt())
    }

    pub fn fetch(&self, loan_id: &LoanId) -> Result<Option<StoredSubmission>, GradingServiceError> {
        Ok(self.store.fetch(loan_id)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GradingServiceError {
    #[error("{0} loans have no rating model")]
    UnsupportedLineOfBusiness(LineOfBusiness),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Incomplete(#[from] IncompleteApplication),
    #[error(transparent)]
    Config(#[from] RatingConfigError),
    #[error(transparent)]
    Store(#[from] SubmissionStoreError),
}

impl From<CompletionError> for GradingServiceError {
    fn from(value: CompletionError) -> Self {
        match value {
            CompletionError::Incomplete(incomplete) => Self::Incomplete(incomplete),
            CompletionError::Config(error) => Self::Config(error),
        }
    }
}

impl GradingServiceError {
    /// Caller-correctable failures, as opposed to configuration or storage faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLineOfBusiness(_) | Self::Input(_) | Self::Incomplete(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(SubmissionStoreError::Conflict(_)))
    }

    pub fn validation(&self) -> Option<&ValidationReport> {
        match self {
            Self::Incomplete(incomplete) => Some(&incomplete.0),
            _ => None,
        }
    }
}
