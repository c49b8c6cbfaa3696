// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use ncd_protocol_data::repository::tests::MockProtocolRepository;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::entities::protocol::{
    MedicationEntry, NcdEnrollment, ProtocolStatus, ProtocolType, TreatmentProtocol,
};
use crate::entities::vitals::VitalReading;

/// Build an enrollment for tests
pub fn sample_enrollment() -> NcdEnrollment {
    NcdEnrollment {
        id: Uuid::new_v4().to_string(),
        patient_id: Uuid::new_v4().to_string(),
        has_hypertension: true,
        has_diabetes: false,
        enrolled_at: Utc::now(),
    }
}

/// Build a vital reading for tests; all fields beyond blood pressure are
/// left unset
pub fn sample_reading(systolic: u16, diastolic: u16) -> VitalReading {
    VitalReading {
        systolic_bp: Some(systolic),
        diastolic_bp: Some(diastolic),
        heart_rate: None,
        temperature_c: None,
        respiratory_rate: None,
        oxygen_saturation: None,
        height_cm: None,
        weight_kg: None,
        blood_glucose: None,
        glucose_test_type: None,
        measurement_date: Utc::now(),
    }
}

/// Build an open HTN-I protocol for tests
pub fn sample_protocol(enrollment: &NcdEnrollment) -> TreatmentProtocol {
    let now = Utc::now();
    TreatmentProtocol {
        id: Uuid::new_v4().to_string(),
        patient_id: enrollment.patient_id.clone(),
        enrollment_id: enrollment.id.clone(),
        protocol_type: ProtocolType::HtnStage1,
        start_date: now,
        bp_target_systolic: 140,
        bp_target_diastolic: 90,
        glucose_target_mmol_l: None,
        weight_goal_kg: None,
        current_medications: vec![MedicationEntry {
            name: "amlodipine".to_string(),
            dose_mg: 5.0,
            frequency: "once daily".to_string(),
        }],
        escalation_step: 0,
        status: ProtocolStatus::Active,
        next_review_date: now + Duration::days(30),
        version: 0,
    }
}
