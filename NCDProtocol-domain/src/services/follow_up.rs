use serde::{Deserialize, Serialize};

use crate::entities::protocol::{
    FollowUpOutcome, FollowUpTargets, FollowUpVisit, TreatmentProtocol,
};
use crate::services::hypertension::{self, HypertensionEngineError};

/// Environment variable overriding the weight tolerance
const WEIGHT_TOLERANCE_ENV: &str = "NCD_WEIGHT_TOLERANCE_KG";

/// Tunable thresholds for follow-up target evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// How far a weight may sit from its goal, in kilograms, and still
    /// count as met
    pub weight_tolerance_kg: f64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            weight_tolerance_kg: 2.0,
        }
    }
}

impl EvaluationSettings {
    /// Read settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let default = Self::default();
        let weight_tolerance_kg = std::env::var(WEIGHT_TOLERANCE_ENV)
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(default.weight_tolerance_kg);

        Self {
            weight_tolerance_kg,
        }
    }
}

/// Compare a follow-up visit's measurements against the protocol's stored
/// targets.
///
/// Each flag is computed independently by direct comparison. A flag is
/// `None` when the measurement or the target is absent; missing data can
/// neither meet a target nor count against it.
pub fn evaluate_targets(
    protocol: &TreatmentProtocol,
    visit: &FollowUpVisit,
    settings: &EvaluationSettings,
) -> FollowUpTargets {
    let bp_target_met = match (visit.systolic_bp, visit.diastolic_bp) {
        (Some(systolic), Some(diastolic)) => Some(
            systolic <= protocol.bp_target_systolic && diastolic <= protocol.bp_target_diastolic,
        ),
        _ => None,
    };

    let glucose_target_met = match (visit.blood_glucose, protocol.glucose_target_mmol_l) {
        (Some(current), Some(target)) => Some(current <= target),
        _ => None,
    };

    let weight_target_met = match (visit.weight_kg, protocol.weight_goal_kg) {
        (Some(current), Some(goal)) => {
            Some((current - goal).abs() <= settings.weight_tolerance_kg)
        }
        _ => None,
    };

    FollowUpTargets {
        bp_target_met,
        glucose_target_met,
        weight_target_met,
    }
}

/// Evaluate a follow-up visit and apply the resulting protocol transition.
///
/// The evaluator computes the target flags; the protocol engine performs
/// the transition those flags call for. For hypertension protocols the
/// blood pressure flag drives the state machine; diabetes and integrated
/// protocols close on their glucose target and are never auto-escalated.
/// A protocol already in a terminal state is a caller error.
pub fn evaluate_follow_up(
    protocol: &TreatmentProtocol,
    visit: &FollowUpVisit,
    settings: &EvaluationSettings,
) -> Result<FollowUpOutcome, HypertensionEngineError> {
    if protocol.status.is_terminal() {
        return Err(HypertensionEngineError::InvalidStateTransition(
            protocol.status.to_string(),
        ));
    }

    let targets = evaluate_targets(protocol, visit, settings);

    let updated_protocol = if protocol.protocol_type.is_hypertension() {
        match targets.bp_target_met {
            Some(true) => hypertension::mark_target_met(protocol)?,
            Some(false) => hypertension::escalate(protocol)?,
            None => protocol.clone(),
        }
    } else {
        match targets.glucose_target_met {
            Some(true) => hypertension::mark_target_met(protocol)?,
            _ => protocol.clone(),
        }
    };

    Ok(FollowUpOutcome {
        targets,
        updated_protocol,
    })
}
