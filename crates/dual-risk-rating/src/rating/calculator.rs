use serde::{Deserialize, Serialize};

use super::catalog::QualitativeFactorCatalog;
use super::domain::{Grade, LoanInput};
use super::model::{RatingConfigError, RatingModel, ScoredMetric};

/// Intermediate and blended scores for a single grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeScores {
    pub quantitative: f64,
    pub adjustment: f64,
    pub qualitative_adjusted: f64,
    pub blended: i64,
}

/// Scores for both grades. A grade stays `None` until its inputs are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputedRatings {
    pub brg: Option<GradeScores>,
    pub frg: Option<GradeScores>,
}

impl ComputedRatings {
    pub fn grade(&self, grade: Grade) -> Option<GradeScores> {
        match grade {
            Grade::Borrower => self.brg,
            Grade::Facility => self.frg,
        }
    }
}

/// Round to the nearest whole grade, halves away from zero.
pub fn round_grade(score: f64) -> i64 {
    score.round() as i64
}

/// Stateless calculator applying a validated rating model to draft input.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    model: RatingModel,
}

impl ScoreCalculator {
    pub fn new(model: RatingModel) -> Result<Self, RatingConfigError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn standard() -> Self {
        Self {
            model: RatingModel::standard(),
        }
    }

    pub fn model(&self) -> &RatingModel {
        &self.model
    }

    pub fn compute(&self, input: &LoanInput) -> Result<ComputedRatings, RatingConfigError> {
        let ratings = ComputedRatings {
            brg: self.borrower_grade(input)?,
            frg: self.facility_grade(input)?,
        };

        tracing::debug!(
            property_type = ?input.property_type,
            brg = ?ratings.brg.map(|scores| scores.blended),
            frg = ?ratings.frg.map(|scores| scores.blended),
            "computed risk grades"
        );

        Ok(ratings)
    }

    /// BRG from DSCR, occupancy and property type, adjusted by evenly weighted
    /// BRG factor ratings. Unrated factors contribute nothing.
    pub fn borrower_grade(
        &self,
        input: &LoanInput,
    ) -> Result<Option<GradeScores>, RatingConfigError> {
        let (Some(property_type), Some(dscr), Some(occupancy)) =
            (input.property_type, input.dscr, input.occupancy)
        else {
            return Ok(None);
        };

        let quantitative = self.model.lookup(ScoredMetric::Dscr, dscr)?
            + self.model.lookup(ScoredMetric::Occupancy, occupancy)?
            + self.model.property_base_scores.score(property_type);

        let adjustment: f64 = QualitativeFactorCatalog::weights_for(property_type)
            .brg
            .iter()
            .filter_map(|(factor, weight)| {
                input
                    .rating(*factor)
                    .map(|rating| self.model.qualitative_adjustments.adjustment(rating) * weight)
            })
            .sum();

        Ok(Some(self.blend(quantitative, adjustment)))
    }

    /// FRG from LTV, adjusted by the designated FRG factor at full weight.
    pub fn facility_grade(
        &self,
        input: &LoanInput,
    ) -> Result<Option<GradeScores>, RatingConfigError> {
        let Some(ltv) = input.ltv else {
            return Ok(None);
        };

        let quantitative = self.model.lookup(ScoredMetric::Ltv, ltv)?;

        let adjustment = input
            .property_type
            .and_then(|property_type| QualitativeFactorCatalog::weights_for(property_type).frg)
            .and_then(|(factor, weight)| {
                input
                    .rating(factor)
                    .map(|rating| self.model.qualitative_adjustments.adjustment(rating) * weight)
            })
            .unwrap_or(0.0);

        Ok(Some(self.blend(quantitative, adjustment)))
    }

    fn blend(&self, quantitative: f64, adjustment: f64) -> GradeScores {
        let qualitative_adjusted = quantitative + adjustment;
        let blended = quantitative * self.model.quantitative_blend_weight
            + qualitative_adjusted * self.model.qualitative_blend_weight;

        GradeScores {
            quantitative,
            adjustment,
            qualitative_adjusted,
            blended: round_grade(blended),
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::standard()
    }
}
