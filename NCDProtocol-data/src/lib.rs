// NCDProtocol Data
// This crate handles storage models and the repository contract for the
// clinical protocol engine

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
