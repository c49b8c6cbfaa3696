pub mod classification;
pub mod follow_up;
pub mod hypertension;
pub mod protocol;
pub mod risk;

// Domain services
// This module contains the protocol engine components.

// Re-export service traits and factory functions
pub use protocol::{create_default_protocol_service, ProtocolServiceTrait};
