// Repository module structure
pub mod errors;
mod in_memory;
mod protocol;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use protocol::{ProtocolRepository, ProtocolRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use protocol::tests;
