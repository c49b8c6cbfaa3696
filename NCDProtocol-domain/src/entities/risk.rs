use serde::{Deserialize, Serialize};
use validator::Validate;

/// Patient sex as used by the risk charts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

/// Input to a cardiovascular risk assessment, derived from the patient's
/// demographics and latest vitals.
///
/// Exactly one of `cholesterol_mmol_l` / `bmi` contributes to the score,
/// selected by `use_lab_based`; the other is ignored even when present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CvdRiskInput {
    /// Patient age in years
    #[validate(range(min = 18, max = 120, message = "Age must be between 18 and 120"))]
    pub age: u32,

    /// Patient sex
    pub sex: Sex,

    /// Whether the patient currently smokes
    pub is_smoker: bool,

    /// Systolic blood pressure in mmHg
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic_bp: u16,

    /// Whether the patient has diabetes
    pub is_diabetic: bool,

    /// Choose the cholesterol-based branch (true) or the BMI-based branch
    /// (false) for the secondary risk factor
    pub use_lab_based: bool,

    /// Total cholesterol in mmol/L, used only when `use_lab_based` is true
    #[validate(range(min = 0.5, max = 30.0, message = "Cholesterol must be between 0.5 and 30 mmol/L"))]
    pub cholesterol_mmol_l: Option<f64>,

    /// Body mass index, used only when `use_lab_based` is false
    #[validate(range(min = 5.0, max = 100.0, message = "BMI must be between 5 and 100"))]
    pub bmi: Option<f64>,
}

/// 10-year cardiovascular risk category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskCategory {
    /// 10-year risk below 5%
    VeryLow,

    /// 10-year risk 5% to below 10%
    Low,

    /// 10-year risk 10% to below 20%
    Moderate,

    /// 10-year risk 20% to below 30%
    High,

    /// 10-year risk 30% or above
    VeryHigh,
}

impl RiskCategory {
    /// The 10-year risk range the category stands for
    pub fn ten_year_range(&self) -> &'static str {
        match self {
            RiskCategory::VeryLow => "<5%",
            RiskCategory::Low => "5-<10%",
            RiskCategory::Moderate => "10-<20%",
            RiskCategory::High => "20-<30%",
            RiskCategory::VeryHigh => "≥30%",
        }
    }
}

impl ToString for RiskCategory {
    fn to_string(&self) -> String {
        match self {
            RiskCategory::VeryLow => "Very Low".to_string(),
            RiskCategory::Low => "Low".to_string(),
            RiskCategory::Moderate => "Moderate".to_string(),
            RiskCategory::High => "High".to_string(),
            RiskCategory::VeryHigh => "Very High".to_string(),
        }
    }
}

/// Result of a cardiovascular risk assessment.
/// Produced fresh per assessment and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CvdRiskResult {
    /// Total additive risk score
    pub score: u8,

    /// Risk category the score falls into
    pub category: RiskCategory,

    /// Display label for the 10-year risk range
    pub ten_year_range_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CvdRiskInput {
        CvdRiskInput {
            age: 45,
            sex: Sex::Female,
            is_smoker: false,
            systolic_bp: 120,
            is_diabetic: false,
            use_lab_based: false,
            cholesterol_mmol_l: None,
            bmi: Some(24.0),
        }
    }

    #[test]
    fn test_valid_input_passes_validation() {
        assert!(base_input().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_age_rejected() {
        let input = CvdRiskInput {
            age: 130,
            ..base_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_out_of_range_cholesterol_rejected() {
        let input = CvdRiskInput {
            use_lab_based: true,
            cholesterol_mmol_l: Some(42.0),
            ..base_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_risk_category_ordering() {
        assert!(RiskCategory::VeryLow < RiskCategory::Low);
        assert!(RiskCategory::High < RiskCategory::VeryHigh);
    }
}
