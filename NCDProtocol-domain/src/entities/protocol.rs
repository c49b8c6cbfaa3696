use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Treatment protocol type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProtocolType {
    /// Stage 1 hypertension protocol (single medication)
    #[serde(rename = "HTN-I")]
    HtnStage1,

    /// Stage 2 hypertension protocol (two initial medications)
    #[serde(rename = "HTN-II")]
    HtnStage2,

    /// Diabetes management protocol
    Diabetes,

    /// Integrated cardiovascular protocol
    #[serde(rename = "IntegratedCVD")]
    IntegratedCvd,
}

impl ProtocolType {
    /// Whether the stepwise hypertension escalation ladder applies
    pub fn is_hypertension(&self) -> bool {
        matches!(self, ProtocolType::HtnStage1 | ProtocolType::HtnStage2)
    }
}

impl ToString for ProtocolType {
    fn to_string(&self) -> String {
        match self {
            ProtocolType::HtnStage1 => "HTN-I".to_string(),
            ProtocolType::HtnStage2 => "HTN-II".to_string(),
            ProtocolType::Diabetes => "Diabetes".to_string(),
            ProtocolType::IntegratedCvd => "IntegratedCVD".to_string(),
        }
    }
}

impl FromStr for ProtocolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTN-I" => Ok(ProtocolType::HtnStage1),
            "HTN-II" => Ok(ProtocolType::HtnStage2),
            "Diabetes" => Ok(ProtocolType::Diabetes),
            "IntegratedCVD" => Ok(ProtocolType::IntegratedCvd),
            other => Err(format!("Unknown protocol type: {}", other)),
        }
    }
}

/// Lifecycle status of a treatment protocol.
///
/// `TargetMet`, `Referred` and `Discontinued` are terminal; a protocol
/// never re-enters `Active` once it has left the open states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProtocolStatus {
    /// Initial treatment underway
    Active,

    /// At least one escalation step has been taken
    Escalated,

    /// Treatment targets were met at a follow-up
    TargetMet,

    /// Escalation exhausted or clinical trigger; routed to higher care
    Referred,

    /// Stopped by clinician decision
    Discontinued,
}

impl ProtocolStatus {
    /// Whether the status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProtocolStatus::TargetMet | ProtocolStatus::Referred | ProtocolStatus::Discontinued
        )
    }
}

impl ToString for ProtocolStatus {
    fn to_string(&self) -> String {
        match self {
            ProtocolStatus::Active => "Active".to_string(),
            ProtocolStatus::Escalated => "Escalated".to_string(),
            ProtocolStatus::TargetMet => "TargetMet".to_string(),
            ProtocolStatus::Referred => "Referred".to_string(),
            ProtocolStatus::Discontinued => "Discontinued".to_string(),
        }
    }
}

impl FromStr for ProtocolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(ProtocolStatus::Active),
            "Escalated" => Ok(ProtocolStatus::Escalated),
            "TargetMet" => Ok(ProtocolStatus::TargetMet),
            "Referred" => Ok(ProtocolStatus::Referred),
            "Discontinued" => Ok(ProtocolStatus::Discontinued),
            other => Err(format!("Unknown protocol status: {}", other)),
        }
    }
}

/// A medication prescribed under a protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationEntry {
    /// Medication name
    pub name: String,

    /// Dose in milligrams
    pub dose_mg: f64,

    /// Dosing frequency (e.g., "once daily")
    pub frequency: String,
}

/// Domain model for a treatment protocol tied to a management episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentProtocol {
    /// Unique identifier for the protocol
    pub id: String,

    /// Identifier of the patient the protocol belongs to
    pub patient_id: String,

    /// Identifier of the owning enrollment
    pub enrollment_id: String,

    /// Protocol type
    pub protocol_type: ProtocolType,

    /// When the protocol was started
    pub start_date: DateTime<Utc>,

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

    /// Number of escalation steps taken so far; only ever increases while
    /// the protocol is open
    pub escalation_step: u8,

    /// Lifecycle status
    pub status: ProtocolStatus,

    /// When the protocol is next due for review
    pub next_review_date: DateTime<Utc>,

    /// Record version used for optimistic concurrency on updates
    pub version: u64,
}

/// Domain model for a program enrollment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NcdEnrollment {
    /// Unique identifier for the enrollment
    pub id: String,

    /// Identifier of the enrolled patient
    pub patient_id: String,

    /// Whether the patient is enrolled for hypertension management
    pub has_hypertension: bool,

    /// Whether the patient is enrolled for diabetes management
    pub has_diabetes: bool,

    /// When the patient was enrolled
    pub enrolled_at: DateTime<Utc>,
}

/// Domain model for a follow-up visit.
///
/// The target-met flags are owned by the follow-up evaluator; a UI may
/// display them but never supplies them as ground truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

    /// Whether the blood pressure target was met; `None` when the visit
    /// had no assessable blood pressure
    pub bp_target_met: Option<bool>,

    /// Whether the glucose target was met; `None` when not assessable
    pub glucose_target_met: Option<bool>,

    /// Whether the weight goal was met; `None` when not assessable
    pub weight_target_met: Option<bool>,

    /// When the visit took place
    pub visit_date: DateTime<Utc>,
}

/// Request payload for recording a follow-up visit
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFollowUpRequest {
    /// Systolic blood pressure in mmHg
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic_bp: Option<u16>,

    /// Diastolic blood pressure in mmHg
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic_bp: Option<u16>,

    /// Blood glucose in mmol/L
    #[validate(range(min = 0.5, max = 50.0, message = "Glucose must be between 0.5 and 50 mmol/L"))]
    pub blood_glucose: Option<f64>,

    /// Weight in kilograms
    #[validate(range(min = 1.0, max = 500.0, message = "Weight must be between 1 and 500 kg"))]
    pub weight_kg: Option<f64>,

    /// When the visit took place
    pub visit_date: DateTime<Utc>,
}

/// Target-met flags computed by the follow-up evaluator.
///
/// `None` means "not assessable" (a measurement or a target was absent);
/// absence of data neither meets a target nor triggers escalation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowUpTargets {
    /// Blood pressure at or below target
    pub bp_target_met: Option<bool>,

    /// Glucose at or below target
    pub glucose_target_met: Option<bool>,

    /// Weight within tolerance of the goal
    pub weight_target_met: Option<bool>,
}

/// Result of evaluating a follow-up visit against a protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowUpOutcome {
    /// Target-met flags for the visit
    pub targets: FollowUpTargets,

    /// The protocol after any state transition; unchanged when no target
    /// was assessable
    pub updated_protocol: TreatmentProtocol,
}

/// Reason a reading routes straight to referral
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReferralReason {
    /// Hypertension in pregnancy; route to obstetric care
    PregnancyHypertension,

    /// Blood pressure in the crisis band
    HypertensiveCrisis,

    /// The escalation ladder is exhausted
    MaxEscalationReached,
}

impl ToString for ReferralReason {
    fn to_string(&self) -> String {
        match self {
            ReferralReason::PregnancyHypertension => {
                "Hypertension in pregnancy; refer to obstetric care".to_string()
            }
            ReferralReason::HypertensiveCrisis => {
                "Hypertensive crisis; refer for immediate care".to_string()
            }
            ReferralReason::MaxEscalationReached => {
                "Blood pressure target not met after maximum escalation; refer to physician"
                    .to_string()
            }
        }
    }
}

/// Decision produced when selecting an initial protocol from a reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ProtocolDecision {
    /// Route the patient to a referral pathway; no protocol is created
    Referral {
        /// Why the referral was raised
        reason: ReferralReason,
    },

    /// Start a treatment protocol with the listed medications
    Protocol {
        /// Protocol type to start
        protocol_type: ProtocolType,

        /// Initial medications
        medications: Vec<MedicationEntry>,
    },

    /// No protocol warranted; advisory guidance only, nothing persisted
    Advisory {
        /// Guidance for the clinician
        message: String,
    },
}

/// Result of starting a protocol from a reading: the decision plus the
/// persisted protocol when the decision was to start one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartProtocolOutcome {
    /// The decision taken
    pub decision: ProtocolDecision,

    /// The stored protocol for `Protocol` decisions, `None` otherwise
    pub protocol: Option<TreatmentProtocol>,
}
