use serde::{Deserialize, Serialize};

/// Storage model for a program enrollment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NcdEnrollment {
    /// Unique identifier for the enrollment
    pub id: String,

    /// Identifier of the enrolled patient
    pub patient_id: String,

    /// Whether the patient is enrolled for hypertension management
    pub has_hypertension: bool,

    /// Whether the patient is enrolled for diabetes management
    pub has_diabetes: bool,

    /// When the patient was enrolled (RFC3339)
    pub enrolled_at: String,
}

/// Storage model for a prescribed medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationEntry {
    /// Medication name
    pub name: String,

    /// Dose in milligrams
    pub dose_mg: f64,

    /// Dosing frequency (e.g., "once daily")
    pub frequency: String,
}

/// Storage model for a treatment protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentProtocol {
    /// Unique identifier for the protocol
    pub id: String,

    /// Identifier of the patient the protocol belongs to
    pub patient_id: String,

    /// Identifier of the owning enrollment
    pub enrollment_id: String,

    /// Protocol type (e.g., "HTN-I", "HTN-II", "Diabetes", "IntegratedCVD")
    pub protocol_type: String,

    /// When the protocol was started (RFC3339)
    pub start_date: String,

    /// Systolic blood pressure target in mmHg
    pub bp_target_systolic: u16,

    /// Diastolic blood pressure target in mmHg
    pub bp_target_diastolic: u16,

    /// Optional blood glucose target in mmol/L
    pub glucose_target_mmol_l: Option<f64>,

    /// Optional weight goal in kilograms
    pub weight_goal_kg: Option<f64>,

    /// Medications currently prescribed under the protocol
    pub current_medications: Vec<MedicationEntry>,

    /// Number of escalation steps taken so far
    pub escalation_step: u8,

    /// Protocol status (e.g., "Active", "Escalated", "TargetMet",
    /// "Referred", "Discontinued")
    pub status: String,

    /// When the protocol is next due for review (RFC3339)
    pub next_review_date: String,

    /// Record version used for optimistic concurrency on updates
    pub version: u64,
}

/// Storage model for a follow-up visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpVisit {
    /// Unique identifier for the visit
    pub id: String,

    /// Identifier of the owning enrollment
    pub enrollment_id: String,

    /// Identifier of the protocol the visit was evaluated against, if any
    pub protocol_id: Option<String>,

    /// Systolic blood pressure measured at the visit in mmHg
    pub systolic_bp: Option<u16>,

    /// Diastolic blood pressure measured at the visit in mmHg
    pub diastolic_bp: Option<u16>,

    /// Blood glucose measured at the visit in mmol/L
    pub blood_glucose: Option<f64>,

    /// Weight measured at the visit in kilograms
    pub weight_kg: Option<f64>,

    /// Whether the blood pressure target was met (evaluator-computed)
    pub bp_target_met: Option<bool>,

    /// Whether the glucose target was met (evaluator-computed)
    pub glucose_target_met: Option<bool>,

    /// Whether the weight goal was met (evaluator-computed)
    pub weight_target_met: Option<bool>,

    /// When the visit took place (RFC3339)
    pub visit_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_record_serde_round_trip() {
        let protocol = TreatmentProtocol {
            id: "protocol-1".to_string(),
            patient_id: "patient-1".to_string(),
            enrollment_id: "enrollment-1".to_string(),
            protocol_type: "HTN-II".to_string(),
            start_date: "2024-01-10T09:00:00+00:00".to_string(),
            bp_target_systolic: 140,
            bp_target_diastolic: 90,
            glucose_target_mmol_l: None,
            weight_goal_kg: Some(78.0),
            current_medications: vec![MedicationEntry {
                name: "losartan".to_string(),
                dose_mg: 50.0,
                frequency: "once daily".to_string(),
            }],
            escalation_step: 0,
            status: "Active".to_string(),
            next_review_date: "2024-02-09T09:00:00+00:00".to_string(),
            version: 0,
        };

        let json = serde_json::to_string(&protocol).unwrap();
        let parsed: TreatmentProtocol = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, protocol.status);
        assert_eq!(parsed.current_medications, protocol.current_medications);
        assert_eq!(parsed.version, protocol.version);
    }
}
