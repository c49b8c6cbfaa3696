// Storage models for NCD protocol records
pub mod protocol;

// Re-export commonly used types
pub use protocol::{
    FollowUpVisit, MedicationEntry, NcdEnrollment, TreatmentProtocol,
};
