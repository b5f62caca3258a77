//! Metric domain inference and value validation.
//!
//! The measurement text attached to an indicator ("% of reuse", "EUR/year",
//! "tCO2e avoided", ...) determines which numeric rules a user-entered value
//! must satisfy. Inference is a priority-ordered rule list: percentage and
//! currency markers win over unit and count markers because formula text
//! often mentions units incidentally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric validation category inferred from a measurement description.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricDomain {
    Percent,
    Money,
    NonNeg,
    Integer,
    Free,
}

impl MetricDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Money => "money",
            Self::NonNeg => "nonneg",
            Self::Integer => "integer",
            Self::Free => "free",
        }
    }
}

/// Physical-unit markers checked by substring containment.
const UNIT_MARKERS: &[&str] = &[
    "tco2", "t co2", "t co₂", "t co2e", " t", "ton", "kg", "kwh", "m³", "m3", " l", " l/",
];

/// Counting markers (publication/patent counts, "nº de ...").
const COUNT_MARKERS: &[&str] = &["nº", "num", "publica", "patent", "contagem"];

fn is_percent(m: &str) -> bool {
    m.contains('%') || m.contains("percent")
}

fn is_money(m: &str) -> bool {
    m.contains('€') || m.contains("eur") || m.contains("euro") || m.contains("r$") || m.contains('$')
}

fn is_physical_unit(m: &str) -> bool {
    UNIT_MARKERS.iter().any(|u| m.contains(u))
}

fn is_hours(m: &str) -> bool {
    m.contains("hora") || m.trim() == "h" || m.contains(" h/")
}

fn is_count(m: &str) -> bool {
    COUNT_MARKERS.iter().any(|u| m.contains(u))
}

/// Ordered classification rules; first match wins.
const RULES: &[(fn(&str) -> bool, MetricDomain)] = &[
    (is_percent, MetricDomain::Percent),
    (is_money, MetricDomain::Money),
    (is_physical_unit, MetricDomain::NonNeg),
    (is_hours, MetricDomain::NonNeg),
    (is_count, MetricDomain::Integer),
];

/// Classify a measurement description into its [`MetricDomain`].
///
/// A missing description yields [`MetricDomain::Free`]; anything that no
/// rule claims defaults to a non-negative magnitude.
pub fn infer_domain(measurement: Option<&str>) -> MetricDomain {
    let Some(measurement) = measurement else {
        return MetricDomain::Free;
    };
    let m = measurement.to_lowercase();
    for (predicate, domain) in RULES {
        if predicate(&m) {
            return *domain;
        }
    }
    MetricDomain::NonNeg
}

/// A rejected measurement value. `Display` carries the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a value is required")]
    Required,
    #[error("fraction values must be between 0 and 1 (e.g. 0.25 for 25%)")]
    FractionOutOfRange,
    #[error("percentage must be between 0 and 100")]
    PercentOutOfRange,
    #[error("monetary value must be >= 0")]
    NegativeMoney,
    #[error("must be a non-negative integer")]
    NegativeInteger,
    #[error("value must be >= 0")]
    NegativeValue,
    #[error("invalid format: use numbers only, with period or comma as decimal separator")]
    InvalidFormat,
}

/// Validate and normalize a raw user-entered value against the domain
/// inferred from `measurement`.
///
/// The raw text is trimmed and a comma decimal separator converted to a
/// period before parsing. On success the returned value is in the domain's
/// canonical unit: percentages are always 0–100 (a fraction input is scaled
/// when `fraction` is set), integers are truncated toward zero.
pub fn validate_value(
    raw: &str,
    measurement: Option<&str>,
    fraction: bool,
) -> Result<f64, ValidationError> {
    let text = raw.trim().replace(',', ".");
    if text.is_empty() {
        return Err(ValidationError::Required);
    }
    let x: f64 = text.parse().map_err(|_| ValidationError::InvalidFormat)?;

    match infer_domain(measurement) {
        MetricDomain::Percent => {
            if fraction {
                if (0.0..=1.0).contains(&x) {
                    Ok(x * 100.0)
                } else {
                    Err(ValidationError::FractionOutOfRange)
                }
            } else if (0.0..=100.0).contains(&x) {
                Ok(x)
            } else {
                Err(ValidationError::PercentOutOfRange)
            }
        }
        MetricDomain::Money => {
            if x >= 0.0 {
                Ok(x)
            } else {
                Err(ValidationError::NegativeMoney)
            }
        }
        MetricDomain::Integer => {
            let n = x.trunc();
            if n >= 0.0 {
                Ok(n)
            } else {
                Err(ValidationError::NegativeInteger)
            }
        }
        MetricDomain::NonNeg | MetricDomain::Free => {
            if x >= 0.0 {
                Ok(x)
            } else {
                Err(ValidationError::NegativeValue)
            }
        }
    }
}
