// NCDProtocol Domain
// This crate contains the clinical protocol engine for the NCD program

// Services that implement the engine components
pub mod services;

// Domain entities
pub mod entities;

// Re-export the repository module from ncd-protocol-data for convenience
pub use ncd_protocol_data::repository;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
