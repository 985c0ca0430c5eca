//! Dual risk rating for commercial real-estate loans.
//!
//! A draft [`LoanInput`] is scored by the [`ScoreCalculator`] into a borrower
//! (BRG) and facility (FRG) grade, checked for completeness by the
//! [`OverrideValidator`], and flattened into a [`SubmissionRecord`] for the
//! storage collaborator.

pub mod bins;
pub mod calculator;
pub mod catalog;
pub mod domain;
pub mod model;
pub mod router;
pub mod service;
pub mod store;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use bins::{BinEntry, BinTable, BinTableError};
pub use calculator::{round_grade, ComputedRatings, GradeScores, ScoreCalculator};
pub use catalog::{FactorSet, FactorWeights, QualitativeFactorCatalog};
pub use domain::{
    Grade, InputError, LineOfBusiness, LoanInput, LoanType, MetricValue, PropertyType,
    QualitativeFactor, Rating,
};
pub use model::{
    PropertyBaseScores, QualitativeAdjustmentTable, RatingConfigError, RatingModel,
    RatingModelError, ScoredMetric,
};
pub use router::grading_router;
pub use service::{GradePreview, GradingRequest, GradingServiceError, LoanGradingService};
pub use store::{
    LoanId, StoredSubmission, SubmissionReceipt, SubmissionStore, SubmissionStoreError,
    SUBMISSION_ACCEPTED,
};
pub use submission::{SubmissionAssembler, SubmissionRecord};
pub use validation::{
    CompletedApplication, CompletionError, IncompleteApplication, OverrideState,
    OverrideValidator, RangeViolation, RatingResult, ValidationReport,
};
