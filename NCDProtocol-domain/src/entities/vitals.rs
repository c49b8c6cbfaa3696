use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test type behind a blood glucose measurement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GlucoseTestType {
    /// Fasting plasma glucose
    #[serde(rename = "FPG")]
    Fpg,

    /// Random plasma glucose
    #[serde(rename = "RPG")]
    Rpg,

    /// 2-hour post-load plasma glucose
    #[serde(rename = "2h-PG")]
    TwoHourPg,

    /// Glycated haemoglobin
    #[serde(rename = "HbA1c")]
    HbA1c,

    /// Random blood sugar (point-of-care strip)
    #[serde(rename = "RBS")]
    Rbs,
}

/// Domain model for one clinical measurement event.
///
/// Every field is optional; a reading with partial data is still a valid
/// reading and classification degrades instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalReading {
    /// Systolic blood pressure in mmHg
    pub systolic_bp: Option<u16>,

    /// Diastolic blood pressure in mmHg
    pub diastolic_bp: Option<u16>,

    /// Heart rate in beats per minute
    pub heart_rate: Option<u16>,

    /// Body temperature in degrees Celsius
    pub temperature_c: Option<f64>,

    /// Respiratory rate in breaths per minute
    pub respiratory_rate: Option<u16>,

    /// Oxygen saturation as a percentage
    pub oxygen_saturation: Option<u8>,

    /// Height in centimetres
    pub height_cm: Option<f64>,

    /// Weight in kilograms
    pub weight_kg: Option<f64>,

    /// Blood glucose in mmol/L
    pub blood_glucose: Option<f64>,

    /// Test type behind the glucose value
    pub glucose_test_type: Option<GlucoseTestType>,

    /// When the measurement was taken
    pub measurement_date: DateTime<Utc>,
}

impl VitalReading {
    /// Body mass index derived from height and weight.
    ///
    /// Always recomputed; a BMI supplied from outside is never trusted.
    pub fn bmi(&self) -> Option<f64> {
        match (self.height_cm, self.weight_kg) {
            (Some(height_cm), Some(weight_kg)) if height_cm > 0.0 => {
                let height_m = height_cm / 100.0;
                Some(weight_kg / (height_m * height_m))
            }
            _ => None,
        }
    }
}

/// Blood pressure severity band, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BpSeverity {
    /// Below all treatment thresholds
    Normal,

    /// Elevated blood pressure (systolic ≥ 130 or diastolic ≥ 80)
    Elevated,

    /// Stage 1 Hypertension (systolic ≥ 140 or diastolic ≥ 90)
    Stage1,

    /// Stage 2 Hypertension (systolic ≥ 160 or diastolic ≥ 100)
    Stage2,

    /// Hypertensive crisis (systolic ≥ 180 or diastolic ≥ 120)
    Crisis,
}

impl ToString for BpSeverity {
    fn to_string(&self) -> String {
        match self {
            BpSeverity::Normal => "Normal".to_string(),
            BpSeverity::Elevated => "Elevated".to_string(),
            BpSeverity::Stage1 => "Hypertension Stage 1".to_string(),
            BpSeverity::Stage2 => "Hypertension Stage 2".to_string(),
            BpSeverity::Crisis => "Hypertensive Crisis".to_string(),
        }
    }
}

/// Severity band plus display label for a blood pressure reading.
/// The label is the band name, or "Unknown" when either value was missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BpClassification {
    /// Severity band
    pub severity: BpSeverity,

    /// Human-readable label for the band
    pub label: String,
}

/// Body mass index category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BmiCategory {
    /// BMI below 18.5
    Underweight,

    /// BMI 18.5 to below 25
    Normal,

    /// BMI 25 to below 30
    Overweight,

    /// BMI 30 or above
    Obese,

    /// Height or weight missing
    Unknown,
}

impl ToString for BmiCategory {
    fn to_string(&self) -> String {
        match self {
            BmiCategory::Underweight => "Underweight".to_string(),
            BmiCategory::Normal => "Normal".to_string(),
            BmiCategory::Overweight => "Overweight".to_string(),
            BmiCategory::Obese => "Obese".to_string(),
            BmiCategory::Unknown => "Unknown".to_string(),
        }
    }
}

/// Blood glucose category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GlucoseCategory {
    /// Below the pre-diabetes threshold for the test type
    Normal,

    /// Fasting glucose 6.1 to below 7.0 mmol/L
    PreDiabetes,

    /// At or above the diabetes threshold for the test type
    Diabetes,

    /// A random glucose below 11.1 mmol/L cannot rule diabetes in or out
    Indeterminate,

    /// Measurement or test type missing, or the test type has no
    /// classification thresholds here
    Unknown,
}

impl ToString for GlucoseCategory {
    fn to_string(&self) -> String {
        match self {
            GlucoseCategory::Normal => "Normal".to_string(),
            GlucoseCategory::PreDiabetes => "Pre-diabetes".to_string(),
            GlucoseCategory::Diabetes => "Diabetes".to_string(),
            GlucoseCategory::Indeterminate => "Indeterminate".to_string(),
            GlucoseCategory::Unknown => "Unknown".to_string(),
        }
    }
}

/// Combined classification of one vital reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalsClassification {
    /// Blood pressure band
    pub bp: BpClassification,

    /// BMI category
    pub bmi: BmiCategory,

    /// Glucose category
    pub glucose: GlucoseCategory,
}
