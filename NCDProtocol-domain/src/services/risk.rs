use thiserror::Error;
use validator::Validate;

use crate::entities::risk::{CvdRiskInput, CvdRiskResult, RiskCategory};

/// Risk scoring errors
#[derive(Debug, Error)]
pub enum RiskScoringError {
    /// Input failed domain validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Score a patient's 10-year cardiovascular risk.
///
/// Deterministic additive model approximating the WHO/ISH risk charts for
/// South Asia; not a regression. The secondary factor branch is selected
/// by `use_lab_based` and the other branch is ignored even when present.
/// Range-invalid inputs are rejected before scoring and never coerced.
pub fn score_cvd_risk(input: &CvdRiskInput) -> Result<CvdRiskResult, RiskScoringError> {
    if let Err(validation_errors) = input.validate() {
        // Convert validation errors to a meaningful error message
        let error_message = validation_errors
            .field_errors()
            .iter()
            .map(|(field, errors)| {
                let error_msgs: Vec<String> = errors
                    .iter()
                    .map(|err| {
                        if let Some(msg) = &err.message {
                            msg.to_string()
                        } else {
                            format!("Invalid {}", field)
                        }
                    })
                    .collect();
                format!("{}: {}", field, error_msgs.join(", "))
            })
            .collect::<Vec<String>>()
            .join("; ");

        return Err(RiskScoringError::InvalidInput(error_message));
    }

    let mut score = age_points(input.age);
    if input.is_smoker {
        score += 2;
    }
    score += systolic_points(input.systolic_bp);
    if input.is_diabetic {
        score += 3;
    }
    score += if input.use_lab_based {
        cholesterol_points(input.cholesterol_mmol_l)
    } else {
        bmi_points(input.bmi)
    };

    let category = categorize_score(score);

    Ok(CvdRiskResult {
        score,
        category,
        ten_year_range_label: category.ten_year_range().to_string(),
    })
}

fn age_points(age: u32) -> u8 {
    if age >= 70 {
        4
    } else if age >= 60 {
        3
    } else if age >= 50 {
        2
    } else if age >= 40 {
        1
    } else {
        0
    }
}

fn systolic_points(systolic: u16) -> u8 {
    if systolic >= 180 {
        5
    } else if systolic >= 160 {
        3
    } else if systolic >= 140 {
        2
    } else if systolic >= 120 {
        1
    } else {
        0
    }
}

/// A missing selected factor contributes nothing rather than failing;
/// the caller chose the branch, the engine degrades to the safe default.
fn cholesterol_points(cholesterol_mmol_l: Option<f64>) -> u8 {
    match cholesterol_mmol_l {
        Some(cholesterol) if cholesterol >= 7.0 => 3,
        Some(cholesterol) if cholesterol >= 6.0 => 2,
        Some(cholesterol) if cholesterol >= 5.0 => 1,
        _ => 0,
    }
}

fn bmi_points(bmi: Option<f64>) -> u8 {
    match bmi {
        Some(bmi) if bmi >= 30.0 => 2,
        Some(bmi) if bmi >= 25.0 => 1,
        _ => 0,
    }
}

/// Bands are inclusive-lower-bound, checked highest first so ties resolve
/// to the higher category
fn categorize_score(score: u8) -> RiskCategory {
    if score >= 12 {
        RiskCategory::VeryHigh
    } else if score >= 9 {
        RiskCategory::High
    } else if score >= 6 {
        RiskCategory::Moderate
    } else if score >= 3 {
        RiskCategory::Low
    } else {
        RiskCategory::VeryLow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::risk::Sex;

    fn base_input() -> CvdRiskInput {
        CvdRiskInput {
            age: 35,
            sex: Sex::Male,
            is_smoker: false,
            systolic_bp: 110,
            is_diabetic: false,
            use_lab_based: false,
            cholesterol_mmol_l: None,
            bmi: Some(22.0),
        }
    }

    #[test]
    fn test_minimal_risk_scores_zero() {
        let result = score_cvd_risk(&base_input()).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.category, RiskCategory::VeryLow);
        assert_eq!(result.ten_year_range_label, "<5%");
    }

    #[test]
    fn test_all_factors_max_out() {
        let input = CvdRiskInput {
            age: 75,
            is_smoker: true,
            systolic_bp: 190,
            is_diabetic: true,
            use_lab_based: true,
            cholesterol_mmol_l: Some(7.5),
            ..base_input()
        };

        let result = score_cvd_risk(&input).unwrap();
        assert_eq!(result.score, 4 + 2 + 5 + 3 + 3);
        assert_eq!(result.category, RiskCategory::VeryHigh);
        assert_eq!(result.ten_year_range_label, "≥30%");
    }

    /// A score exactly at a band's lower bound resolves to that band
    #[test]
    fn test_category_band_boundaries() {
        let cases = [
            (3u8, RiskCategory::Low),
            (6u8, RiskCategory::Moderate),
            (9u8, RiskCategory::High),
            (12u8, RiskCategory::VeryHigh),
        ];
        for (score, expected) in cases {
            assert_eq!(categorize_score(score), expected);
            // One below the bound lands in the lower category
            assert!(categorize_score(score - 1) < expected);
        }
    }

    /// Increasing any single factor never decreases the score
    #[test]
    fn test_score_monotonic_per_factor() {
        let base = base_input();
        let base_score = score_cvd_risk(&base).unwrap().score;

        for age in [45, 55, 65, 80] {
            let score = score_cvd_risk(&CvdRiskInput { age, ..base.clone() })
                .unwrap()
                .score;
            assert!(score >= base_score);
        }

        let smoker = CvdRiskInput {
            is_smoker: true,
            ..base.clone()
        };
        assert!(score_cvd_risk(&smoker).unwrap().score >= base_score);

        let mut previous = base_score;
        for systolic_bp in [125, 145, 165, 185] {
            let score = score_cvd_risk(&CvdRiskInput {
                systolic_bp,
                ..base.clone()
            })
            .unwrap()
            .score;
            assert!(score >= previous);
            previous = score;
        }

        let diabetic = CvdRiskInput {
            is_diabetic: true,
            ..base.clone()
        };
        assert!(score_cvd_risk(&diabetic).unwrap().score >= base_score);
    }

    /// Only the branch selected by use_lab_based contributes
    #[test]
    fn test_secondary_factor_branch_exclusive() {
        // Lab-based: an obese BMI present alongside is ignored
        let lab = CvdRiskInput {
            use_lab_based: true,
            cholesterol_mmol_l: Some(6.2),
            bmi: Some(35.0),
            ..base_input()
        };
        assert_eq!(score_cvd_risk(&lab).unwrap().score, 2);

        // Non-lab: a high cholesterol present alongside is ignored
        let non_lab = CvdRiskInput {
            use_lab_based: false,
            cholesterol_mmol_l: Some(7.5),
            bmi: Some(35.0),
            ..base_input()
        };
        assert_eq!(score_cvd_risk(&non_lab).unwrap().score, 2);
    }

    #[test]
    fn test_missing_selected_factor_contributes_zero() {
        let input = CvdRiskInput {
            use_lab_based: true,
            cholesterol_mmol_l: None,
            bmi: Some(35.0),
            ..base_input()
        };
        assert_eq!(score_cvd_risk(&input).unwrap().score, 0);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let input = CvdRiskInput {
            systolic_bp: 400,
            ..base_input()
        };

        let result = score_cvd_risk(&input);
        assert!(matches!(result, Err(RiskScoringError::InvalidInput(_))));
        assert!(result.unwrap_err().to_string().contains("Systolic"));
    }

    /// Two calls with identical input produce identical results
    #[test]
    fn test_scoring_idempotent() {
        let input = CvdRiskInput {
            age: 62,
            is_smoker: true,
            systolic_bp: 158,
            use_lab_based: true,
            cholesterol_mmol_l: Some(5.4),
            ..base_input()
        };

        let first = score_cvd_risk(&input).unwrap();
        let second = score_cvd_risk(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.score, 3 + 2 + 2 + 1);
        assert_eq!(first.category, RiskCategory::Moderate);
    }
}
