use crate::entities::vitals::{
    BmiCategory, BpClassification, BpSeverity, GlucoseCategory, GlucoseTestType, VitalReading,
    VitalsClassification,
};

/// Classify a blood pressure reading into a severity band.
///
/// Bands are evaluated most severe first, with OR semantics between the
/// systolic and diastolic values: either one exceeding a band's threshold
/// qualifies the reading for that band. A missing value is never treated
/// as a clinical finding; the reading classifies as normal severity with
/// an "Unknown" label.
pub fn classify_blood_pressure(systolic: Option<u16>, diastolic: Option<u16>) -> BpClassification {
    let (systolic, diastolic) = match (systolic, diastolic) {
        (Some(systolic), Some(diastolic)) => (systolic, diastolic),
        _ => {
            return BpClassification {
                severity: BpSeverity::Normal,
                label: "Unknown".to_string(),
            }
        }
    };

    let severity = if systolic >= 180 || diastolic >= 120 {
        BpSeverity::Crisis
    } else if systolic >= 160 || diastolic >= 100 {
        BpSeverity::Stage2
    } else if systolic >= 140 || diastolic >= 90 {
        BpSeverity::Stage1
    } else if systolic >= 130 || diastolic >= 80 {
        BpSeverity::Elevated
    } else {
        BpSeverity::Normal
    };

    BpClassification {
        severity,
        label: severity.to_string(),
    }
}

/// Classify a body mass index value
pub fn classify_bmi(bmi: Option<f64>) -> BmiCategory {
    let bmi = match bmi {
        Some(bmi) => bmi,
        None => return BmiCategory::Unknown,
    };

    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Classify a blood glucose value for a given test type.
///
/// Both the value and the test type are required. A random plasma glucose
/// below the diabetes threshold is `Indeterminate`: RPG alone cannot rule
/// diabetes out, and resolving it to Normal would overstate certainty.
pub fn classify_glucose(
    glucose_mmol_l: Option<f64>,
    test_type: Option<GlucoseTestType>,
) -> GlucoseCategory {
    let (glucose, test_type) = match (glucose_mmol_l, test_type) {
        (Some(glucose), Some(test_type)) => (glucose, test_type),
        _ => return GlucoseCategory::Unknown,
    };

    match test_type {
        GlucoseTestType::Fpg => {
            if glucose >= 7.0 {
                GlucoseCategory::Diabetes
            } else if glucose >= 6.1 {
                GlucoseCategory::PreDiabetes
            } else {
                GlucoseCategory::Normal
            }
        }
        GlucoseTestType::Rpg => {
            if glucose >= 11.1 {
                GlucoseCategory::Diabetes
            } else {
                GlucoseCategory::Indeterminate
            }
        }
        _ => GlucoseCategory::Unknown,
    }
}

/// Classify all vitals of one reading in a single pass
pub fn classify_vitals(reading: &VitalReading) -> VitalsClassification {
    VitalsClassification {
        bp: classify_blood_pressure(reading.systolic_bp, reading.diastolic_bp),
        bmi: classify_bmi(reading.bmi()),
        glucose: classify_glucose(reading.blood_glucose, reading.glucose_test_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_bp_band_normal() {
        let classification = classify_blood_pressure(Some(110), Some(75));
        assert_eq!(classification.severity, BpSeverity::Normal);
        assert_eq!(classification.label, "Normal");
    }

    #[test]
    fn test_bp_band_elevated() {
        // Systolic in range
        let classification = classify_blood_pressure(Some(135), Some(75));
        assert_eq!(classification.severity, BpSeverity::Elevated);

        // Diastolic in range
        let classification = classify_blood_pressure(Some(110), Some(85));
        assert_eq!(classification.severity, BpSeverity::Elevated);
    }

    #[test]
    fn test_bp_band_stage1() {
        let classification = classify_blood_pressure(Some(145), Some(75));
        assert_eq!(classification.severity, BpSeverity::Stage1);

        let classification = classify_blood_pressure(Some(110), Some(95));
        assert_eq!(classification.severity, BpSeverity::Stage1);
    }

    #[test]
    fn test_bp_band_stage2() {
        let classification = classify_blood_pressure(Some(165), Some(75));
        assert_eq!(classification.severity, BpSeverity::Stage2);

        let classification = classify_blood_pressure(Some(110), Some(105));
        assert_eq!(classification.severity, BpSeverity::Stage2);
    }

    #[test]
    fn test_bp_band_crisis() {
        let classification = classify_blood_pressure(Some(185), Some(75));
        assert_eq!(classification.severity, BpSeverity::Crisis);
        assert_eq!(classification.label, "Hypertensive Crisis");

        let classification = classify_blood_pressure(Some(110), Some(125));
        assert_eq!(classification.severity, BpSeverity::Crisis);
    }

    /// Exact band boundaries
    #[test]
    fn test_bp_band_boundaries() {
        assert_eq!(
            classify_blood_pressure(Some(140), Some(89)).severity,
            BpSeverity::Stage1
        );
        assert_eq!(
            classify_blood_pressure(Some(139), Some(89)).severity,
            BpSeverity::Elevated
        );
        assert_eq!(
            classify_blood_pressure(Some(180), Some(70)).severity,
            BpSeverity::Crisis
        );
        assert_eq!(
            classify_blood_pressure(Some(129), Some(79)).severity,
            BpSeverity::Normal
        );
    }

    #[test]
    fn test_bp_missing_values_degrade_to_unknown() {
        for (systolic, diastolic) in [(None, None), (Some(150), None), (None, Some(95))] {
            let classification = classify_blood_pressure(systolic, diastolic);
            assert_eq!(classification.severity, BpSeverity::Normal);
            assert_eq!(classification.label, "Unknown");
        }
    }

    /// Raising either value never lowers the severity band
    #[test]
    fn test_bp_severity_monotonic() {
        let systolic_grid = [90u16, 125, 135, 145, 165, 185];
        let diastolic_grid = [60u16, 78, 85, 95, 105, 125];

        for &diastolic in &diastolic_grid {
            let mut previous = BpSeverity::Normal;
            for &systolic in &systolic_grid {
                let severity = classify_blood_pressure(Some(systolic), Some(diastolic)).severity;
                assert!(severity >= previous);
                previous = severity;
            }
        }

        for &systolic in &systolic_grid {
            let mut previous = BpSeverity::Normal;
            for &diastolic in &diastolic_grid {
                let severity = classify_blood_pressure(Some(systolic), Some(diastolic)).severity;
                assert!(severity >= previous);
                previous = severity;
            }
        }
    }

    #[test]
    fn test_bmi_bands() {
        assert_eq!(classify_bmi(Some(17.0)), BmiCategory::Underweight);
        assert_eq!(classify_bmi(Some(18.5)), BmiCategory::Normal);
        assert_eq!(classify_bmi(Some(24.9)), BmiCategory::Normal);
        assert_eq!(classify_bmi(Some(25.0)), BmiCategory::Overweight);
        assert_eq!(classify_bmi(Some(30.0)), BmiCategory::Obese);
        assert_eq!(classify_bmi(None), BmiCategory::Unknown);
    }

    #[test]
    fn test_glucose_fasting_bands() {
        assert_eq!(
            classify_glucose(Some(5.0), Some(GlucoseTestType::Fpg)),
            GlucoseCategory::Normal
        );
        assert_eq!(
            classify_glucose(Some(6.1), Some(GlucoseTestType::Fpg)),
            GlucoseCategory::PreDiabetes
        );
        assert_eq!(
            classify_glucose(Some(7.0), Some(GlucoseTestType::Fpg)),
            GlucoseCategory::Diabetes
        );
    }

    #[test]
    fn test_glucose_random_is_indeterminate_below_threshold() {
        assert_eq!(
            classify_glucose(Some(11.1), Some(GlucoseTestType::Rpg)),
            GlucoseCategory::Diabetes
        );

        // A low random glucose does not rule diabetes out
        assert_eq!(
            classify_glucose(Some(5.2), Some(GlucoseTestType::Rpg)),
            GlucoseCategory::Indeterminate
        );
    }

    #[test]
    fn test_glucose_other_test_types_unknown() {
        for test_type in [
            GlucoseTestType::TwoHourPg,
            GlucoseTestType::HbA1c,
            GlucoseTestType::Rbs,
        ] {
            assert_eq!(
                classify_glucose(Some(9.0), Some(test_type)),
                GlucoseCategory::Unknown
            );
        }
    }

    #[test]
    fn test_glucose_missing_inputs_unknown() {
        assert_eq!(classify_glucose(None, None), GlucoseCategory::Unknown);
        assert_eq!(
            classify_glucose(Some(8.0), None),
            GlucoseCategory::Unknown
        );
        assert_eq!(
            classify_glucose(None, Some(GlucoseTestType::Fpg)),
            GlucoseCategory::Unknown
        );
    }

    /// Classification reads nothing but the reading; two calls agree
    #[test]
    fn test_classify_vitals_idempotent() {
        let reading = VitalReading {
            systolic_bp: Some(152),
            diastolic_bp: Some(94),
            heart_rate: Some(80),
            temperature_c: None,
            respiratory_rate: None,
            oxygen_saturation: None,
            height_cm: Some(168.0),
            weight_kg: Some(82.0),
            blood_glucose: Some(6.4),
            glucose_test_type: Some(GlucoseTestType::Fpg),
            measurement_date: Utc::now(),
        };

        let first = classify_vitals(&reading);
        let second = classify_vitals(&reading);
        assert_eq!(first, second);
        assert_eq!(first.bp.severity, BpSeverity::Stage1);
        assert_eq!(first.bmi, BmiCategory::Overweight);
        assert_eq!(first.glucose, GlucoseCategory::PreDiabetes);
    }
}
