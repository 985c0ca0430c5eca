use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::bins::{BinEntry, BinTable, BinTableError};
use super::domain::{PropertyType, Rating};

/// Quantitative metrics discretized through a bin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredMetric {
    Dscr,
    Occupancy,
    Ltv,
}

impl ScoredMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dscr => "DSCR",
            Self::Occupancy => "occupancy",
            Self::Ltv => "LTV",
        }
    }
}

impl fmt::Display for ScoredMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flat per-property-type contribution to the quantitative BRG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyBaseScores {
    pub single_family: f64,
    pub multi_family: f64,
    pub retail: f64,
    pub office: f64,
    pub other: f64,
    pub hotel: f64,
    pub condo: f64,
    pub industrial: f64,
}

impl PropertyBaseScores {
    pub fn score(&self, property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::SingleFamily => self.single_family,
            PropertyType::MultiFamily => self.multi_family,
            PropertyType::Retail => self.retail,
            PropertyType::Office => self.office,
            PropertyType::Other => self.other,
            PropertyType::Hotel => self.hotel,
            PropertyType::Condo => self.condo,
            PropertyType::Industrial => self.industrial,
        }
    }
}

/// Signed adjustment per rating, indexed from rating 1 through 6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualitativeAdjustmentTable {
    adjustments: [f64; 6],
}

impl QualitativeAdjustmentTable {
    pub const fn new(adjustments: [f64; 6]) -> Self {
        Self { adjustments }
    }

    pub fn adjustment(&self, rating: Rating) -> f64 {
        self.adjustments[usize::from(rating.value() - Rating::MIN)]
    }
}

const BLEND_WEIGHT_TOLERANCE: f64 = 1e-9;

/// Numeric tables behind both grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingModel {
    pub dscr_bins: BinTable,
    pub occupancy_bins: BinTable,
    pub ltv_bins: BinTable,
    pub property_base_scores: PropertyBaseScores,
    pub qualitative_adjustments: QualitativeAdjustmentTable,
    /// Share of the blended grade taken from the purely quantitative score.
    pub quantitative_blend_weight: f64,
    /// Share taken from the qualitatively adjusted score. The two weights sum to 1.
    pub qualitative_blend_weight: f64,
}

impl RatingModel {
    /// Published CRE tables.
    pub fn standard() -> Self {
        Self {
            dscr_bins: BinTable::from_sorted(vec![
                BinEntry::below(1.2369855, 2.32498757),
                BinEntry::below(1.35681152, 2.10004291),
                BinEntry::below(1.44827282, 1.80353039),
                BinEntry::below(1.55134183, 1.57848138),
                BinEntry::unbounded(1.31712093),
            ]),
            occupancy_bins: BinTable::from_sorted(vec![
                BinEntry::below(93.55830581, 2.15293931),
                BinEntry::below(95.32196263, 2.04642977),
                BinEntry::below(97.89075, 1.62917375),
                BinEntry::unbounded(1.43304207),
            ]),
            ltv_bins: BinTable::from_sorted(vec![
                BinEntry::below(30.0, 4.0),
                BinEntry::below(66.0, 5.0),
                BinEntry::unbounded(6.0),
            ]),
            property_base_scores: PropertyBaseScores {
                single_family: 2.76797217,
                multi_family: 1.13998781,
                retail: 0.81092195,
                office: 1.20790535,
                other: 2.22592975,
                hotel: 1.71163097,
                condo: 3.24368739,
                industrial: 1.71280577,
            },
            qualitative_adjustments: QualitativeAdjustmentTable::new([
                -2.0, -1.2, -0.4, 0.4, 1.2, 2.0,
            ]),
            quantitative_blend_weight: 0.7,
            qualitative_blend_weight: 0.3,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RatingModelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RatingModelError> {
        let model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    pub fn bins(&self, metric: ScoredMetric) -> &BinTable {
        match metric {
            ScoredMetric::Dscr => &self.dscr_bins,
            ScoredMetric::Occupancy => &self.occupancy_bins,
            ScoredMetric::Ltv => &self.ltv_bins,
        }
    }

    pub fn lookup(&self, metric: ScoredMetric, value: f64) -> Result<f64, RatingConfigError> {
        self.bins(metric)
            .lookup(value)
            .map_err(|source| RatingConfigError::BinTable { metric, source })
    }

    pub fn validate(&self) -> Result<(), RatingConfigError> {
        for metric in [ScoredMetric::Dscr, ScoredMetric::Occupancy, ScoredMetric::Ltv] {
            self.bins(metric)
                .check()
                .map_err(|source| RatingConfigError::BinTable { metric, source })?;
        }

        for weight in [self.quantitative_blend_weight, self.qualitative_blend_weight] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(RatingConfigError::BlendWeight(weight));
            }
        }
        let total = self.quantitative_blend_weight + self.qualitative_blend_weight;
        if (total - 1.0).abs() > BLEND_WEIGHT_TOLERANCE {
            return Err(RatingConfigError::BlendWeightTotal(total));
        }

        if PropertyType::ordered()
            .iter()
            .any(|property_type| !self.property_base_scores.score(*property_type).is_finite())
        {
            return Err(RatingConfigError::NonFinite("property base score"));
        }

        if self
            .qualitative_adjustments
            .adjustments
            .iter()
            .any(|value| !value.is_finite())
        {
            return Err(RatingConfigError::NonFinite("qualitative adjustment"));
        }

        Ok(())
    }
}

impl Default for RatingModel {
    fn default() -> Self {
        Self::standard()
    }
}

/// Defect in the rating tables. Fatal to the computation, never a user error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingConfigError {
    #[error("{metric} bin table is misconfigured: {source}")]
    BinTable {
        metric: ScoredMetric,
        source: BinTableError,
    },
    #[error("blend weight must lie within [0, 1], found {0}")]
    BlendWeight(f64),
    #[error("blend weights must sum to 1, found {0}")]
    BlendWeightTotal(f64),
    #[error("{0} table contains a non-finite value")]
    NonFinite(&'static str),
}

/// Failure to load a rating model from disk.
#[derive(Debug, thiserror::Error)]
pub enum RatingModelError {
    #[error("failed to read rating model: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rating model JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] RatingConfigError),
}
