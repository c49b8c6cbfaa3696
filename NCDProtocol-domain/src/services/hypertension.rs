use thiserror::Error;
use tracing::debug;

use crate::entities::protocol::{
    MedicationEntry, ProtocolDecision, ProtocolStatus, ProtocolType, ReferralReason,
    TreatmentProtocol,
};
use crate::entities::vitals::VitalReading;

/// Hypertension protocol engine errors
#[derive(Debug, Error)]
pub enum HypertensionEngineError {
    /// A transition was requested on a protocol already in a terminal
    /// state. This indicates a caller bug (double-processing a follow-up)
    /// and must not be swallowed.
    #[error("Invalid state transition: protocol is already {0}")]
    InvalidStateTransition(String),

    /// The protocol type has no escalation ladder in this engine
    #[error("Unsupported protocol type for escalation: {0}")]
    UnsupportedProtocol(String),
}

fn amlodipine(dose_mg: f64) -> MedicationEntry {
    MedicationEntry {
        name: "amlodipine".to_string(),
        dose_mg,
        frequency: "once daily".to_string(),
    }
}

fn losartan(dose_mg: f64) -> MedicationEntry {
    MedicationEntry {
        name: "losartan".to_string(),
        dose_mg,
        frequency: "once daily".to_string(),
    }
}

fn hydrochlorothiazide(dose_mg: f64) -> MedicationEntry {
    MedicationEntry {
        name: "hydrochlorothiazide".to_string(),
        dose_mg,
        frequency: "once daily".to_string(),
    }
}

/// Select the initial treatment response for a first blood pressure
/// reading.
///
/// The pregnancy check takes priority over every other band: hypertension
/// in pregnancy routes to obstetric care regardless of how high the
/// reading is. Referrals and advisories create no protocol; only the two
/// protocol bands do.
pub fn select_initial_protocol(reading: &VitalReading, is_pregnant: bool) -> ProtocolDecision {
    let (systolic, diastolic) = match (reading.systolic_bp, reading.diastolic_bp) {
        (Some(systolic), Some(diastolic)) => (systolic, diastolic),
        _ => {
            return ProtocolDecision::Advisory {
                message: "Blood pressure reading incomplete. Repeat the measurement before \
                          selecting a protocol."
                    .to_string(),
            }
        }
    };

    if is_pregnant && (systolic >= 140 || diastolic >= 90) {
        return ProtocolDecision::Referral {
            reason: ReferralReason::PregnancyHypertension,
        };
    }

    if systolic >= 180 || diastolic >= 120 {
        return ProtocolDecision::Referral {
            reason: ReferralReason::HypertensiveCrisis,
        };
    }

    if systolic >= 160 || diastolic >= 100 {
        return ProtocolDecision::Protocol {
            protocol_type: ProtocolType::HtnStage2,
            medications: vec![amlodipine(5.0), losartan(50.0)],
        };
    }

    if systolic >= 140 || diastolic >= 90 {
        return ProtocolDecision::Protocol {
            protocol_type: ProtocolType::HtnStage1,
            medications: vec![amlodipine(5.0)],
        };
    }

    if systolic >= 130 || diastolic >= 80 {
        return ProtocolDecision::Advisory {
            message: "Elevated blood pressure. Recheck in 3 to 6 months.".to_string(),
        };
    }

    ProtocolDecision::Advisory {
        message: "Normal blood pressure. Continue annual screening.".to_string(),
    }
}

/// Set an existing medication's dose, or add the medication if it is not
/// on the list yet
fn set_dose(medications: &mut Vec<MedicationEntry>, medication: MedicationEntry) {
    if let Some(entry) = medications.iter_mut().find(|m| m.name == medication.name) {
        entry.dose_mg = medication.dose_mg;
    } else {
        medications.push(medication);
    }
}

/// Advance a protocol one escalation step.
///
/// Escalation is monotonic and bounded: each step intensifies treatment,
/// and once the ladder is exhausted the protocol terminates in `Referred`.
/// The step counter records the last medication change actually made, so
/// the referral transition leaves it untouched.
pub fn escalate(protocol: &TreatmentProtocol) -> Result<TreatmentProtocol, HypertensionEngineError> {
    if protocol.status.is_terminal() {
        return Err(HypertensionEngineError::InvalidStateTransition(
            protocol.status.to_string(),
        ));
    }

    let mut updated = protocol.clone();

    match protocol.protocol_type {
        ProtocolType::HtnStage1 => match protocol.escalation_step {
            0 => {
                set_dose(&mut updated.current_medications, amlodipine(10.0));
                updated.escalation_step += 1;
                updated.status = ProtocolStatus::Escalated;
            }
            _ => {
                updated.status = ProtocolStatus::Referred;
            }
        },
        ProtocolType::HtnStage2 => match protocol.escalation_step {
            0 => {
                set_dose(&mut updated.current_medications, losartan(100.0));
                updated.escalation_step += 1;
                updated.status = ProtocolStatus::Escalated;
            }
            1 => {
                set_dose(&mut updated.current_medications, hydrochlorothiazide(12.5));
                updated.escalation_step += 1;
                updated.status = ProtocolStatus::Escalated;
            }
            _ => {
                updated.status = ProtocolStatus::Referred;
            }
        },
        other => {
            return Err(HypertensionEngineError::UnsupportedProtocol(
                other.to_string(),
            ))
        }
    }

    debug!(
        "Escalated protocol {}: step {} -> {}, status {:?}",
        protocol.id, protocol.escalation_step, updated.escalation_step, updated.status
    );

    Ok(updated)
}

/// Close a protocol whose targets were met at a follow-up. Terminal;
/// re-enrollment requires a new protocol, not a reopened one.
pub fn mark_target_met(
    protocol: &TreatmentProtocol,
) -> Result<TreatmentProtocol, HypertensionEngineError> {
    if protocol.status.is_terminal() {
        return Err(HypertensionEngineError::InvalidStateTransition(
            protocol.status.to_string(),
        ));
    }

    let mut updated = protocol.clone();
    updated.status = ProtocolStatus::TargetMet;
    Ok(updated)
}

/// Stop a protocol on clinician decision. Terminal.
pub fn discontinue(
    protocol: &TreatmentProtocol,
) -> Result<TreatmentProtocol, HypertensionEngineError> {
    if protocol.status.is_terminal() {
        return Err(HypertensionEngineError::InvalidStateTransition(
            protocol.status.to_string(),
        ));
    }

    let mut updated = protocol.clone();
    updated.status = ProtocolStatus::Discontinued;
    Ok(updated)
}
