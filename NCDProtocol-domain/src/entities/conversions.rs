use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::protocol::{
    FollowUpVisit, MedicationEntry, NcdEnrollment, TreatmentProtocol,
};

/// Conversion functions between domain entities and storage records.
/// Functions follow the pattern convert_to_[target_layer]_[model_name];
/// the storage-to-domain direction is fallible because enum and date
/// fields are stringly typed at the storage layer.

/// Helper function to safely parse a string ID to UUID
///
/// This centralizes UUID parsing logic to ensure consistent handling across the application.
/// When an invalid UUID is provided, it returns a descriptive error message.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Helper function to parse an RFC3339 timestamp from a storage record
fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid RFC3339 timestamp: {}", value))
}

/// Convert from domain entity to data model for a medication entry
pub fn convert_to_data_medication(
    domain_medication: &MedicationEntry,
) -> ncd_protocol_data::models::protocol::MedicationEntry {
    ncd_protocol_data::models::protocol::MedicationEntry {
        name: domain_medication.name.clone(),
        dose_mg: domain_medication.dose_mg,
        frequency: domain_medication.frequency.clone(),
    }
}

/// Convert from data model to domain entity for a medication entry
pub fn convert_to_domain_medication(
    data_medication: ncd_protocol_data::models::protocol::MedicationEntry,
) -> MedicationEntry {
    MedicationEntry {
        name: data_medication.name,
        dose_mg: data_medication.dose_mg,
        frequency: data_medication.frequency,
    }
}

/// Convert from domain entity to data model for a treatment protocol
pub fn convert_to_data_protocol(
    domain_protocol: &TreatmentProtocol,
) -> ncd_protocol_data::models::protocol::TreatmentProtocol {
    ncd_protocol_data::models::protocol::TreatmentProtocol {
        id: domain_protocol.id.clone(),
        patient_id: domain_protocol.patient_id.clone(),
        enrollment_id: domain_protocol.enrollment_id.clone(),
        protocol_type: domain_protocol.protocol_type.to_string(),
        start_date: domain_protocol.start_date.to_rfc3339(),
        bp_target_systolic: domain_protocol.bp_target_systolic,
        bp_target_diastolic: domain_protocol.bp_target_diastolic,
        glucose_target_mmol_l: domain_protocol.glucose_target_mmol_l,
        weight_goal_kg: domain_protocol.weight_goal_kg,
        current_medications: domain_protocol
            .current_medications
            .iter()
            .map(convert_to_data_medication)
            .collect(),
        escalation_step: domain_protocol.escalation_step,
        status: domain_protocol.status.to_string(),
        next_review_date: domain_protocol.next_review_date.to_rfc3339(),
        version: domain_protocol.version,
    }
}

/// Convert from data model to domain entity for a treatment protocol.
/// Fails when the stored status, type, or dates do not parse.
pub fn convert_to_domain_protocol(
    data_protocol: ncd_protocol_data::models::protocol::TreatmentProtocol,
) -> Result<TreatmentProtocol, String> {
    Ok(TreatmentProtocol {
        protocol_type: data_protocol.protocol_type.parse()?,
        status: data_protocol.status.parse()?,
        start_date: parse_rfc3339(&data_protocol.start_date)?,
        next_review_date: parse_rfc3339(&data_protocol.next_review_date)?,
        id: data_protocol.id,
        patient_id: data_protocol.patient_id,
        enrollment_id: data_protocol.enrollment_id,
        bp_target_systolic: data_protocol.bp_target_systolic,
        bp_target_diastolic: data_protocol.bp_target_diastolic,
        glucose_target_mmol_l: data_protocol.glucose_target_mmol_l,
        weight_goal_kg: data_protocol.weight_goal_kg,
        current_medications: data_protocol
            .current_medications
            .into_iter()
            .map(convert_to_domain_medication)
            .collect(),
        escalation_step: data_protocol.escalation_step,
        version: data_protocol.version,
    })
}

/// Convert from domain entity to data model for an enrollment
pub fn convert_to_data_enrollment(
    domain_enrollment: &NcdEnrollment,
) -> ncd_protocol_data::models::protocol::NcdEnrollment {
    ncd_protocol_data::models::protocol::NcdEnrollment {
        id: domain_enrollment.id.clone(),
        patient_id: domain_enrollment.patient_id.clone(),
        has_hypertension: domain_enrollment.has_hypertension,
        has_diabetes: domain_enrollment.has_diabetes,
        enrolled_at: domain_enrollment.enrolled_at.to_rfc3339(),
    }
}

/// Convert from data model to domain entity for an enrollment
pub fn convert_to_domain_enrollment(
    data_enrollment: ncd_protocol_data::models::protocol::NcdEnrollment,
) -> Result<NcdEnrollment, String> {
    Ok(NcdEnrollment {
        enrolled_at: parse_rfc3339(&data_enrollment.enrolled_at)?,
        id: data_enrollment.id,
        patient_id: data_enrollment.patient_id,
        has_hypertension: data_enrollment.has_hypertension,
        has_diabetes: data_enrollment.has_diabetes,
    })
}

/// Convert from domain entity to data model for a follow-up visit
pub fn convert_to_data_visit(
    domain_visit: &FollowUpVisit,
) -> ncd_protocol_data::models::protocol::FollowUpVisit {
    ncd_protocol_data::models::protocol::FollowUpVisit {
        id: domain_visit.id.clone(),
        enrollment_id: domain_visit.enrollment_id.clone(),
        protocol_id: domain_visit.protocol_id.clone(),
        systolic_bp: domain_visit.systolic_bp,
        diastolic_bp: domain_visit.diastolic_bp,
        blood_glucose: domain_visit.blood_glucose,
        weight_kg: domain_visit.weight_kg,
        bp_target_met: domain_visit.bp_target_met,
        glucose_target_met: domain_visit.glucose_target_met,
        weight_target_met: domain_visit.weight_target_met,
        visit_date: domain_visit.visit_date.to_rfc3339(),
    }
}

/// Convert from data model to domain entity for a follow-up visit
pub fn convert_to_domain_visit(
    data_visit: ncd_protocol_data::models::protocol::FollowUpVisit,
) -> Result<FollowUpVisit, String> {
    Ok(FollowUpVisit {
        visit_date: parse_rfc3339(&data_visit.visit_date)?,
        id: data_visit.id,
        enrollment_id: data_visit.enrollment_id,
        protocol_id: data_visit.protocol_id,
        systolic_bp: data_visit.systolic_bp,
        diastolic_bp: data_visit.diastolic_bp,
        blood_glucose: data_visit.blood_glucose,
        weight_kg: data_visit.weight_kg,
        bp_target_met: data_visit.bp_target_met,
        glucose_target_met: data_visit.glucose_target_met,
        weight_target_met: data_visit.weight_target_met,
    })
}
