// Domain entities and value objects
pub mod conversions;
pub mod protocol;
pub mod risk;
pub mod vitals;

// Re-export common types for easier imports
pub use protocol::{
    CreateFollowUpRequest, FollowUpOutcome, FollowUpTargets, FollowUpVisit, MedicationEntry,
    NcdEnrollment, ProtocolDecision, ProtocolStatus, ProtocolType, ReferralReason,
    StartProtocolOutcome, TreatmentProtocol,
};
pub use risk::{CvdRiskInput, CvdRiskResult, RiskCategory, Sex};
pub use vitals::{
    BmiCategory, BpClassification, BpSeverity, GlucoseCategory, GlucoseTestType, VitalReading,
    VitalsClassification,
};
