use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{LineOfBusiness, LoanType, MetricValue, PropertyType};
use super::validation::CompletedApplication;

const METRIC_SUFFIX: &str = "_Value";

/// Flat record transmitted to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "lineOfBusiness")]
    pub line_of_business: LineOfBusiness,
    #[serde(rename = "propertyType")]
    pub property_type: PropertyType,
    #[serde(rename = "loanType")]
    pub loan_type: LoanType,
    pub dscr: f64,
    pub occupancy: f64,
    pub ltv: f64,
    /// Ratings and `_Value` metrics keyed by whitespace-free factor name.
    #[serde(flatten)]
    pub qualitative: BTreeMap<String, Value>,
    pub quantitative_brg: f64,
    pub adjustment_score_brg: f64,
    pub q_adjusted_brg: f64,
    pub weighted_brg: i64,
    pub final_brg: f64,
    pub quantitative_frg: f64,
    pub adjustment_score_frg: f64,
    pub q_adjusted_frg: f64,
    pub weighted_frg: i64,
    pub final_frg: f64,
    #[serde(rename = "overrideEnabled")]
    pub override_enabled: bool,
    pub override_brg: Option<f64>,
    pub override_frg: Option<f64>,
    pub justification: Option<String>,
}

impl SubmissionRecord {
    pub fn rating_for(&self, key: &str) -> Option<&Value> {
        self.qualitative.get(key)
    }

    pub fn metric_for(&self, key: &str) -> Option<&Value> {
        self.qualitative.get(&format!("{key}{METRIC_SUFFIX}"))
    }
}

/// Builds the canonical submission record from a validated application.
pub struct SubmissionAssembler;

impl SubmissionAssembler {
    pub fn assemble(application: &CompletedApplication) -> SubmissionRecord {
        let mut qualitative = BTreeMap::new();
        for (factor, rating) in &application.ratings {
            let key = factor.normalized_key();
            let metric = application
                .metrics
                .get(factor)
                .map_or(Value::Null, metric_value);
            qualitative.insert(format!("{key}{METRIC_SUFFIX}"), metric);
            qualitative.insert(key, Value::from(rating.value()));
        }

        let overrides = &application.override_state;
        let (override_brg, override_frg, justification) = if overrides.enabled {
            (
                overrides.brg,
                overrides.frg,
                overrides.justification().map(str::to_string),
            )
        } else {
            (None, None, None)
        };

        let brg = &application.brg;
        let frg = &application.frg;

        SubmissionRecord {
            line_of_business: application.line_of_business,
            property_type: application.property_type,
            loan_type: application.loan_type,
            dscr: application.dscr,
            occupancy: application.occupancy,
            ltv: application.ltv,
            qualitative,
            quantitative_brg: brg.quantitative,
            adjustment_score_brg: brg.adjustment,
            q_adjusted_brg: brg.qualitative_adjusted,
            weighted_brg: brg.blended,
            final_brg: brg.final_score,
            quantitative_frg: frg.quantitative,
            adjustment_score_frg: frg.adjustment,
            q_adjusted_frg: frg.qualitative_adjusted,
            weighted_frg: frg.blended,
            final_frg: frg.final_score,
            override_enabled: overrides.enabled,
            override_brg,
            override_frg,
            justification,
        }
    }
}

/// Numbers pass through. Text becomes a number when it parses as one, trimmed
/// text otherwise, null when blank.
fn metric_value(metric: &MetricValue) -> Value {
    match metric {
        MetricValue::Number(number) => {
            serde_json::Number::from_f64(*number).map_or(Value::Null, Value::Number)
        }
        MetricValue::Text(text) => text_metric_value(text),
    }
}

fn text_metric_value(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(trimmed.to_string()), Value::Number)
}
