use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::QualitativeFactorCatalog;

/// Business lines offered on the origination landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineOfBusiness {
    #[default]
    #[serde(rename = "CRE")]
    CommercialRealEstate,
    #[serde(rename = "SNS")]
    SponsorSpecialtyFinance,
    #[serde(rename = "ABL")]
    AssetBasedLending,
    #[serde(rename = "MM")]
    MiddleMarket,
    #[serde(rename = "EF")]
    EquipmentFinance,
}

impl LineOfBusiness {
    pub const fn code(self) -> &'static str {
        match self {
            Self::CommercialRealEstate => "CRE",
            Self::SponsorSpecialtyFinance => "SNS",
            Self::AssetBasedLending => "ABL",
            Self::MiddleMarket => "MM",
            Self::EquipmentFinance => "EF",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CommercialRealEstate => "Commercial Real Estate (CRE)",
            Self::SponsorSpecialtyFinance => "Sponsor Specialty Finance (S&S)",
            Self::AssetBasedLending => "Asset Based Lending (ABL)",
            Self::MiddleMarket => "Middle Market (MM)",
            Self::EquipmentFinance => "Equipment Finance (EF)",
        }
    }
}

impl fmt::Display for LineOfBusiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Collateral categories with their own base score and qualitative factor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Single-Family")]
    SingleFamily,
    #[serde(rename = "Multi-Family")]
    MultiFamily,
    Retail,
    Office,
    Other,
    Hotel,
    Condo,
    Industrial,
}

impl PropertyType {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::SingleFamily,
            Self::MultiFamily,
            Self::Retail,
            Self::Office,
            Self::Other,
            Self::Hotel,
            Self::Condo,
            Self::Industrial,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleFamily => "Single-Family",
            Self::MultiFamily => "Multi-Family",
            Self::Retail => "Retail",
            Self::Office => "Office",
            Self::Other => "Other",
            Self::Hotel => "Hotel",
            Self::Condo => "Condo",
            Self::Industrial => "Industrial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Facility structure. Recorded with the submission but never scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanType {
    Mortgage,
    Permanent,
    Interim,
    Construction,
    Bridge,
    #[serde(rename = "Line of Credit")]
    LineOfCredit,
    Revolver,
}

impl LoanType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mortgage => "Mortgage",
            Self::Permanent => "Permanent",
            Self::Interim => "Interim",
            Self::Construction => "Construction",
            Self::Bridge => "Bridge",
            Self::LineOfCredit => "Line of Credit",
            Self::Revolver => "Revolver",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Analyst judgment factors. Which ones apply depends on the property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualitativeFactor {
    #[serde(rename = "Lease Expiration")]
    LeaseExpiration,
    #[serde(rename = "Tenant Rating")]
    TenantRating,
    #[serde(rename = "Access to Capital Markets")]
    AccessToCapitalMarkets,
    Liquidity,
    #[serde(rename = "Market Rent")]
    MarketRent,
    #[serde(rename = "Guarantor Net Worth")]
    GuarantorNetWorth,
    #[serde(rename = "Number of Units")]
    NumberOfUnits,
    #[serde(rename = "Economic Outlook")]
    EconomicOutlook,
    #[serde(rename = "Collateral Value")]
    CollateralValue,
}

impl QualitativeFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LeaseExpiration => "Lease Expiration",
            Self::TenantRating => "Tenant Rating",
            Self::AccessToCapitalMarkets => "Access to Capital Markets",
            Self::Liquidity => "Liquidity",
            Self::MarketRent => "Market Rent",
            Self::GuarantorNetWorth => "Guarantor Net Worth",
            Self::NumberOfUnits => "Number of Units",
            Self::EconomicOutlook => "Economic Outlook",
            Self::CollateralValue => "Collateral Value",
        }
    }

    /// Submission key: the label with all whitespace removed.
    pub fn normalized_key(self) -> String {
        self.label()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect()
    }
}

impl fmt::Display for QualitativeFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Analyst rating on the 1 (strongest) to 6 (weakest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(value: u8) -> Result<Self, InputError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::RatingOutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Supporting metric entered beside a qualitative rating: a figure or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Draft loan record owned by the caller between grading calls.
///
/// Scalar fields stay `None` until the analyst enters them; the validator reports
/// whatever is still absent. Qualitative entries are only accepted for factors the
/// catalog lists for the selected property type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    #[serde(default)]
    pub line_of_business: LineOfBusiness,
    pub property_type: Option<PropertyType>,
    pub loan_type: Option<LoanType>,
    pub dscr: Option<f64>,
    pub occupancy: Option<f64>,
    pub ltv: Option<f64>,
    #[serde(default)]
    pub qualitative_ratings: BTreeMap<QualitativeFactor, Rating>,
    #[serde(default)]
    pub qualitative_metrics: BTreeMap<QualitativeFactor, MetricValue>,
}

impl LoanInput {
    /// Switch the property type, dropping ratings and metrics for factors that no
    /// longer apply.
    pub fn select_property_type(&mut self, property_type: PropertyType) {
        let factors = QualitativeFactorCatalog::factors_for(property_type);
        self.qualitative_ratings
            .retain(|factor, _| factors.contains(*factor));
        self.qualitative_metrics
            .retain(|factor, _| factors.contains(*factor));
        self.property_type = Some(property_type);
    }

    pub fn rate(&mut self, factor: QualitativeFactor, rating: Rating) -> Result<(), InputError> {
        self.ensure_applicable(factor)?;
        self.qualitative_ratings.insert(factor, rating);
        Ok(())
    }

    pub fn record_metric(
        &mut self,
        factor: QualitativeFactor,
        value: impl Into<MetricValue>,
    ) -> Result<(), InputError> {
        self.ensure_applicable(factor)?;
        self.qualitative_metrics.insert(factor, value.into());
        Ok(())
    }

    pub fn rating(&self, factor: QualitativeFactor) -> Option<Rating> {
        self.qualitative_ratings.get(&factor).copied()
    }

    /// Factors the analyst must rate for the selected property type, BRG first.
    pub fn applicable_factors(&self) -> Vec<QualitativeFactor> {
        self.property_type
            .map(|property_type| QualitativeFactorCatalog::factors_for(property_type).applicable())
            .unwrap_or_default()
    }

    /// Rated or annotated factors outside the selected property type's catalog entry.
    pub fn inapplicable_factors(&self) -> Vec<QualitativeFactor> {
        let applicable = self.applicable_factors();
        let mut stray: Vec<QualitativeFactor> = self
            .qualitative_ratings
            .keys()
            .chain(self.qualitative_metrics.keys())
            .copied()
            .filter(|factor| !applicable.contains(factor))
            .collect();
        stray.sort();
        stray.dedup();
        stray
    }

    pub fn ensure_consistent(&self) -> Result<(), InputError> {
        match self.inapplicable_factors().first() {
            Some(factor) => self.ensure_applicable(*factor),
            None => Ok(()),
        }
    }

    fn ensure_applicable(&self, factor: QualitativeFactor) -> Result<(), InputError> {
        let property_type = self
            .property_type
            .ok_or(InputError::PropertyTypeNotSelected { factor })?;

        if QualitativeFactorCatalog::factors_for(property_type).contains(factor) {
            Ok(())
        } else {
            Err(InputError::InapplicableFactor {
                factor,
                property_type,
            })
        }
    }
}

/// Malformed draft input, as opposed to merely incomplete input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("qualitative rating must be between 1 and 6, found {0}")]
    RatingOutOfRange(u8),
    #[error("{factor} cannot be rated before a property type is selected")]
    PropertyTypeNotSelected { factor: QualitativeFactor },
    #[error("{factor} is not a qualitative factor for {property_type} properties")]
    InapplicableFactor {
        factor: QualitativeFactor,
        property_type: PropertyType,
    },
}

/// The two grades produced for every loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Borrower,
    Facility,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Borrower => "BRG",
            Self::Facility => "FRG",
        }
    }
}
