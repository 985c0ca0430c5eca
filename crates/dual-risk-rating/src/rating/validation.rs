use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::calculator::{ComputedRatings, GradeScores, ScoreCalculator};
use super::domain::{
    Grade, LineOfBusiness, LoanInput, LoanType, MetricValue, PropertyType, QualitativeFactor,
    Rating,
};
use super::model::RatingConfigError;

pub const PROPERTY_TYPE_FIELD: &str = "Property Type";
pub const LOAN_TYPE_FIELD: &str = "Loan Type";
pub const DSCR_FIELD: &str = "DSCR";
pub const OCCUPANCY_FIELD: &str = "Occupancy Rate (%)";
pub const LTV_FIELD: &str = "LTV (%)";
pub const OVERRIDE_BRG_FIELD: &str = "Override BRG";
pub const OVERRIDE_FRG_FIELD: &str = "Override FRG";
pub const JUSTIFICATION_FIELD: &str = "Justification for Override";

/// Analyst override of the computed grades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideState {
    #[serde(default)]
    pub enabled: bool,
    pub brg: Option<f64>,
    pub frg: Option<f64>,
    pub justification: Option<String>,
}

impl OverrideState {
    /// Turn the override on, seeding both values with the current blended grades.
    pub fn engage(&mut self, computed: &ComputedRatings) {
        self.enabled = true;
        if let Some(scores) = computed.brg {
            self.brg = Some(scores.blended as f64);
        }
        if let Some(scores) = computed.frg {
            self.frg = Some(scores.blended as f64);
        }
    }

    /// Turn the override off and discard its values and justification.
    pub fn disengage(&mut self) {
        *self = Self::default();
    }

    pub fn value(&self, grade: Grade) -> Option<f64> {
        match grade {
            Grade::Borrower => self.brg,
            Grade::Facility => self.frg,
        }
    }

    pub fn justification(&self) -> Option<&str> {
        self.justification
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Override value when the override is on and filled in, else the blended grade.
    pub fn final_grade(&self, grade: Grade, computed: &ComputedRatings) -> Option<f64> {
        match self.value(grade) {
            Some(value) if self.enabled => Some(value),
            _ => computed.grade(grade).map(|scores| scores.blended as f64),
        }
    }
}

/// Field whose entered value falls outside its permitted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeViolation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Completeness and range state of a draft, in entry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub missing_fields: Vec<&'static str>,
    pub range_violations: Vec<RangeViolation>,
}

impl ValidationReport {
    fn new(missing_fields: Vec<&'static str>, range_violations: Vec<RangeViolation>) -> Self {
        Self {
            is_valid: missing_fields.is_empty() && range_violations.is_empty(),
            missing_fields,
            range_violations,
        }
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing_fields.is_empty() {
            parts.push(format!(
                "please fill in the following: {}",
                self.missing_fields.join(", ")
            ));
        }
        for violation in &self.range_violations {
            parts.push(format!("{}: {}", violation.field, violation.message));
        }
        if parts.is_empty() {
            "complete".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Per-grade outcome after the override has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingResult {
    pub quantitative: f64,
    pub adjustment: f64,
    pub qualitative_adjusted: f64,
    pub blended: i64,
    pub final_score: f64,
    pub overridden: bool,
    pub justification: Option<String>,
}

impl RatingResult {
    fn resolve(grade: Grade, scores: GradeScores, override_state: &OverrideState) -> Self {
        let override_value = override_state.value(grade).filter(|_| override_state.enabled);

        Self {
            quantitative: scores.quantitative,
            adjustment: scores.adjustment,
            qualitative_adjusted: scores.qualitative_adjusted,
            blended: scores.blended,
            final_score: override_value.unwrap_or(scores.blended as f64),
            overridden: override_value.is_some(),
            justification: override_value
                .and(override_state.justification())
                .map(str::to_string),
        }
    }
}

/// A loan that passed validation, with both grades resolved.
///
/// Only [`OverrideValidator::complete`] builds one, so anything accepting it
/// works on validated input.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedApplication {
    pub(crate) line_of_business: LineOfBusiness,
    pub(crate) property_type: PropertyType,
    pub(crate) loan_type: LoanType,
    pub(crate) dscr: f64,
    pub(crate) occupancy: f64,
    pub(crate) ltv: f64,
    pub(crate) ratings: Vec<(QualitativeFactor, Rating)>,
    pub(crate) metrics: BTreeMap<QualitativeFactor, MetricValue>,
    pub(crate) brg: RatingResult,
    pub(crate) frg: RatingResult,
    pub(crate) override_state: OverrideState,
}

impl CompletedApplication {
    pub fn line_of_business(&self) -> LineOfBusiness {
        self.line_of_business
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn brg(&self) -> &RatingResult {
        &self.brg
    }

    pub fn frg(&self) -> &RatingResult {
        &self.frg
    }

    pub fn override_state(&self) -> &OverrideState {
        &self.override_state
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("loan application is incomplete: {}", .0.summary())]
pub struct IncompleteApplication(pub ValidationReport);

#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteApplication),
    #[error(transparent)]
    Config(#[from] RatingConfigError),
}

/// Completeness, range and override rules that gate a final grade.
pub struct OverrideValidator;

impl OverrideValidator {
    pub fn validate(input: &LoanInput, override_state: &OverrideState) -> ValidationReport {
        let mut missing = Vec::new();

        if input.property_type.is_none() {
            missing.push(PROPERTY_TYPE_FIELD);
        }
        if input.loan_type.is_none() {
            missing.push(LOAN_TYPE_FIELD);
        }
        if input.dscr.is_none() {
            missing.push(DSCR_FIELD);
        }
        if input.occupancy.is_none() {
            missing.push(OCCUPANCY_FIELD);
        }
        if input.ltv.is_none() {
            missing.push(LTV_FIELD);
        }

        for factor in input.applicable_factors() {
            if input.rating(factor).is_none() {
                missing.push(factor.label());
            }
        }

        if override_state.enabled {
            if override_state.brg.is_none() {
                missing.push(OVERRIDE_BRG_FIELD);
            }
            if override_state.frg.is_none() {
                missing.push(OVERRIDE_FRG_FIELD);
            }
            if override_state.justification().is_none() {
                missing.push(JUSTIFICATION_FIELD);
            }
        }

        ValidationReport::new(missing, Self::range_violations(input, override_state))
    }

    /// Point-of-entry range checks, independent of completeness.
    pub fn range_violations(
        input: &LoanInput,
        override_state: &OverrideState,
    ) -> Vec<RangeViolation> {
        let mut violations = Vec::new();

        if input
            .dscr
            .is_some_and(|dscr| !dscr.is_finite() || dscr < 0.0)
        {
            violations.push(RangeViolation {
                field: DSCR_FIELD,
                message: "Invalid entry; enter a number ≥ 0.",
            });
        }
        if input
            .occupancy
            .is_some_and(|occupancy| !(0.0..=100.0).contains(&occupancy))
        {
            violations.push(RangeViolation {
                field: OCCUPANCY_FIELD,
                message: "Enter a number between 0 and 100.",
            });
        }
        if input.ltv.is_some_and(|ltv| !ltv.is_finite() || ltv < 0.0) {
            violations.push(RangeViolation {
                field: LTV_FIELD,
                message: "Enter a number ≥ 0.",
            });
        }

        if override_state.enabled {
            for (grade, field) in [
                (Grade::Borrower, OVERRIDE_BRG_FIELD),
                (Grade::Facility, OVERRIDE_FRG_FIELD),
            ] {
                if override_state
                    .value(grade)
                    .is_some_and(|value| !value.is_finite())
                {
                    violations.push(RangeViolation {
                        field,
                        message: "Enter a finite grade.",
                    });
                }
            }
        }

        violations
    }

    /// Validate and, when complete, grade the same input and resolve final grades
    /// for submission.
    pub fn complete(
        input: &LoanInput,
        override_state: &OverrideState,
        calculator: &ScoreCalculator,
    ) -> Result<CompletedApplication, CompletionError> {
        let report = Self::validate(input, override_state);
        if !report.is_valid {
            return Err(IncompleteApplication(report).into());
        }

        let computed = calculator.compute(input)?;

        let (
            Some(property_type),
            Some(loan_type),
            Some(dscr),
            Some(occupancy),
            Some(ltv),
            Some(brg),
            Some(frg),
        ) = (
            input.property_type,
            input.loan_type,
            input.dscr,
            input.occupancy,
            input.ltv,
            computed.brg,
            computed.frg,
        )
        else {
            return Err(IncompleteApplication(report).into());
        };

        let applicable = input.applicable_factors();
        let ratings = applicable
            .iter()
            .filter_map(|factor| input.rating(*factor).map(|rating| (*factor, rating)))
            .collect();
        let metrics = input
            .qualitative_metrics
            .iter()
            .filter(|(factor, _)| applicable.contains(factor))
            .map(|(factor, value)| (*factor, value.clone()))
            .collect();

        Ok(CompletedApplication {
            line_of_business: input.line_of_business,
            property_type,
            loan_type,
            dscr,
            occupancy,
            ltv,
            ratings,
            metrics,
            brg: RatingResult::resolve(Grade::Borrower, brg, override_state),
            frg: RatingResult::resolve(Grade::Facility, frg, override_state),
            override_state: override_state.clone(),
        })
    }
}
