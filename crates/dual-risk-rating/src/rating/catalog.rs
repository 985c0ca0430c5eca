use serde::Serialize;

use super::domain::{PropertyType, QualitativeFactor};
use QualitativeFactor::*;

const SINGLE_FAMILY_BRG: &[QualitativeFactor] = &[MarketRent, GuarantorNetWorth];
const RENTAL_UNITS_BRG: &[QualitativeFactor] =
    &[NumberOfUnits, MarketRent, AccessToCapitalMarkets];
const TENANCY_BRG: &[QualitativeFactor] = &[LeaseExpiration, TenantRating, AccessToCapitalMarkets];
const OFFICE_BRG: &[QualitativeFactor] = &[LeaseExpiration, TenantRating, NumberOfUnits];
const OTHER_BRG: &[QualitativeFactor] = &[EconomicOutlook, GuarantorNetWorth, MarketRent];

const LIQUIDITY_FRG: &[QualitativeFactor] = &[Liquidity];
const COLLATERAL_FRG: &[QualitativeFactor] = &[CollateralValue];

/// Ordered qualitative factors feeding each grade for one property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorSet {
    pub brg: &'static [QualitativeFactor],
    pub frg: &'static [QualitativeFactor],
}

impl FactorSet {
    /// BRG factors followed by FRG factors, each listed once.
    pub fn applicable(&self) -> Vec<QualitativeFactor> {
        let mut factors = Vec::with_capacity(self.brg.len() + self.frg.len());
        for factor in self.brg.iter().chain(self.frg) {
            if !factors.contains(factor) {
                factors.push(*factor);
            }
        }
        factors
    }

    pub fn contains(&self, factor: QualitativeFactor) -> bool {
        self.brg.contains(&factor) || self.frg.contains(&factor)
    }

    /// Only the first FRG factor contributes to the facility adjustment.
    pub fn designated_frg(&self) -> Option<QualitativeFactor> {
        self.frg.first().copied()
    }
}

/// Per-factor weights for one property type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorWeights {
    pub brg: Vec<(QualitativeFactor, f64)>,
    pub frg: Option<(QualitativeFactor, f64)>,
}

impl FactorWeights {
    /// Even split across BRG factors; full weight on the designated FRG factor.
    pub fn even_split(factors: &FactorSet) -> Self {
        let share = if factors.brg.is_empty() {
            0.0
        } else {
            1.0 / factors.brg.len() as f64
        };

        Self {
            brg: factors.brg.iter().map(|factor| (*factor, share)).collect(),
            frg: factors.designated_frg().map(|factor| (factor, 1.0)),
        }
    }

    pub fn brg_weight(&self, factor: QualitativeFactor) -> Option<f64> {
        self.brg
            .iter()
            .find(|(candidate, _)| *candidate == factor)
            .map(|(_, weight)| *weight)
    }

    pub fn brg_total(&self) -> f64 {
        self.brg.iter().map(|(_, weight)| weight).sum()
    }
}

/// Registry of qualitative factors keyed by property type.
pub struct QualitativeFactorCatalog;

impl QualitativeFactorCatalog {
    pub const fn factors_for(property_type: PropertyType) -> FactorSet {
        let (brg, frg) = match property_type {
            PropertyType::SingleFamily => (SINGLE_FAMILY_BRG, LIQUIDITY_FRG),
            PropertyType::MultiFamily | PropertyType::Hotel | PropertyType::Condo => {
                (RENTAL_UNITS_BRG, LIQUIDITY_FRG)
            }
            PropertyType::Retail | PropertyType::Industrial => (TENANCY_BRG, COLLATERAL_FRG),
            PropertyType::Office => (OFFICE_BRG, COLLATERAL_FRG),
            PropertyType::Other => (OTHER_BRG, LIQUIDITY_FRG),
        };

        FactorSet { brg, frg }
    }

    pub fn weights_for(property_type: PropertyType) -> FactorWeights {
        FactorWeights::even_split(&Self::factors_for(property_type))
    }
}
