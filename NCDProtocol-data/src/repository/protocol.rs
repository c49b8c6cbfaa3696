use async_trait::async_trait;
use chrono::DateTime;
use tracing::debug;
use uuid::Uuid;

use crate::models::protocol::{FollowUpVisit, NcdEnrollment, TreatmentProtocol};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;

/// Repository trait for NCD protocol records.
///
/// The protocol engine itself is storage-agnostic; this trait is the
/// contract the host application implements against its own store. Writes
/// to the same protocol must be serialized by the caller; `update_protocol`
/// backs that contract with a version check.
#[async_trait]
pub trait ProtocolRepositoryTrait {
    /// Create a new program enrollment
    async fn create_enrollment(
        &self,
        enrollment: NcdEnrollment,
    ) -> Result<NcdEnrollment, RepositoryError>;

    /// Get an enrollment by ID
    async fn get_enrollment(&self, id: Uuid) -> Result<Option<NcdEnrollment>, RepositoryError>;

    /// Create a new treatment protocol
    async fn create_protocol(
        &self,
        protocol: TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError>;

    /// Get a treatment protocol by ID
    async fn get_protocol(&self, id: Uuid) -> Result<Option<TreatmentProtocol>, RepositoryError>;

    /// Get the open (Active or Escalated) protocol for an enrollment
    async fn get_active_protocol(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<TreatmentProtocol>, RepositoryError>;

    /// Update a treatment protocol. Fails with `RepositoryError::Conflict`
    /// when the stored version does not match the incoming record's version.
    async fn update_protocol(
        &self,
        protocol: TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError>;

    /// Record a follow-up visit
    async fn create_follow_up(
        &self,
        visit: FollowUpVisit,
    ) -> Result<FollowUpVisit, RepositoryError>;

    /// Get all follow-up visits for an enrollment, oldest first
    async fn list_follow_ups(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<FollowUpVisit>, RepositoryError>;
}

/// Reference repository for NCD protocol records backed by in-memory
/// storage. Host applications with a durable store provide their own
/// `ProtocolRepositoryTrait` implementation instead.
#[derive(Debug, Clone, Default)]
pub struct ProtocolRepository {
    storage: InMemoryStorage,
}

impl ProtocolRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl ProtocolRepositoryTrait for ProtocolRepository {
    /// Create a new program enrollment
    async fn create_enrollment(
        &self,
        enrollment: NcdEnrollment,
    ) -> Result<NcdEnrollment, RepositoryError> {
        if enrollment.id.is_empty() {
            return Err(RepositoryError::Validation(
                "Enrollment ID must not be empty".to_string(),
            ));
        }

        debug!("Storing enrollment: {}", enrollment.id);
        self.storage.store_enrollment(&enrollment).await
    }

    /// Get an enrollment by ID
    async fn get_enrollment(&self, id: Uuid) -> Result<Option<NcdEnrollment>, RepositoryError> {
        debug!("Getting enrollment by ID: {}", id);
        self.storage.get_enrollment(&id.to_string()).await
    }

    /// Create a new treatment protocol
    async fn create_protocol(
        &self,
        protocol: TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError> {
        if protocol.id.is_empty() {
            return Err(RepositoryError::Validation(
                "Protocol ID must not be empty".to_string(),
            ));
        }

        if protocol.version != 0 {
            return Err(RepositoryError::Validation(format!(
                "New protocol must start at version 0, got {}",
                protocol.version
            )));
        }

        if DateTime::parse_from_rfc3339(&protocol.start_date).is_err() {
            return Err(RepositoryError::DateParse(format!(
                "Invalid protocol start date: {}",
                protocol.start_date
            )));
        }

        debug!(
            "Storing protocol {} for enrollment {}",
            protocol.id, protocol.enrollment_id
        );
        self.storage.store_protocol(&protocol).await
    }

    /// Get a treatment protocol by ID
    async fn get_protocol(&self, id: Uuid) -> Result<Option<TreatmentProtocol>, RepositoryError> {
        debug!("Getting protocol by ID: {}", id);
        self.storage.get_protocol(&id.to_string()).await
    }

    /// Get the open (Active or Escalated) protocol for an enrollment
    async fn get_active_protocol(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Option<TreatmentProtocol>, RepositoryError> {
        debug!("Getting active protocol for enrollment: {}", enrollment_id);
        self.storage
            .get_active_protocol(&enrollment_id.to_string())
            .await
    }

    /// Update a treatment protocol with a version check
    async fn update_protocol(
        &self,
        protocol: TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError> {
        debug!(
            "Updating protocol {} at version {}",
            protocol.id, protocol.version
        );
        self.storage.update_protocol(&protocol).await
    }

    /// Record a follow-up visit
    async fn create_follow_up(
        &self,
        visit: FollowUpVisit,
    ) -> Result<FollowUpVisit, RepositoryError> {
        if visit.id.is_empty() {
            return Err(RepositoryError::Validation(
                "Visit ID must not be empty".to_string(),
            ));
        }

        if DateTime::parse_from_rfc3339(&visit.visit_date).is_err() {
            return Err(RepositoryError::DateParse(format!(
                "Invalid visit date: {}",
                visit.visit_date
            )));
        }

        debug!(
            "Storing follow-up visit {} for enrollment {}",
            visit.id, visit.enrollment_id
        );
        self.storage.store_visit(&visit).await
    }

    /// Get all follow-up visits for an enrollment, oldest first
    async fn list_follow_ups(
        &self,
        enrollment_id: Uuid,
    ) -> Result<Vec<FollowUpVisit>, RepositoryError> {
        debug!("Listing follow-up visits for enrollment: {}", enrollment_id);
        self.storage.get_visits(&enrollment_id.to_string()).await
    }
}

/// Mock protocol repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Mock implementation of ProtocolRepositoryTrait for testing.
    /// Reads come from the predefined records; writes echo the record back
    /// without storing it.
    pub struct MockProtocolRepository {
        enrollments: Vec<NcdEnrollment>,
        protocols: Vec<TreatmentProtocol>,
        visits: Vec<FollowUpVisit>,
    }

    impl Default for MockProtocolRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockProtocolRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self {
                enrollments: Vec::new(),
                protocols: Vec::new(),
                visits: Vec::new(),
            }
        }

        /// Create a mock repository with predefined protocols
        pub fn with_protocols(protocols: Vec<TreatmentProtocol>) -> Self {
            Self {
                enrollments: Vec::new(),
                protocols,
                visits: Vec::new(),
            }
        }

        /// Add a predefined enrollment to the mock
        pub fn with_enrollment(mut self, enrollment: NcdEnrollment) -> Self {
            self.enrollments.push(enrollment);
            self
        }

        /// Add a predefined follow-up visit to the mock
        pub fn with_visit(mut self, visit: FollowUpVisit) -> Self {
            self.visits.push(visit);
            self
        }
    }

    #[async_trait]
    impl ProtocolRepositoryTrait for MockProtocolRepository {
        async fn create_enrollment(
            &self,
            enrollment: NcdEnrollment,
        ) -> Result<NcdEnrollment, RepositoryError> {
            Ok(enrollment)
        }

        async fn get_enrollment(
            &self,
            id: Uuid,
        ) -> Result<Option<NcdEnrollment>, RepositoryError> {
            let enrollment = self
                .enrollments
                .iter()
                .find(|e| e.id == id.to_string())
                .cloned();
            Ok(enrollment)
        }

        async fn create_protocol(
            &self,
            protocol: TreatmentProtocol,
        ) -> Result<TreatmentProtocol, RepositoryError> {
            Ok(protocol)
        }

        async fn get_protocol(
            &self,
            id: Uuid,
        ) -> Result<Option<TreatmentProtocol>, RepositoryError> {
            let protocol = self
                .protocols
                .iter()
                .find(|p| p.id == id.to_string())
                .cloned();
            Ok(protocol)
        }

        async fn get_active_protocol(
            &self,
            enrollment_id: Uuid,
        ) -> Result<Option<TreatmentProtocol>, RepositoryError> {
            let protocol = self
                .protocols
                .iter()
                .find(|p| {
                    p.enrollment_id == enrollment_id.to_string()
                        && (p.status == "Active" || p.status == "Escalated")
                })
                .cloned();
            Ok(protocol)
        }

        async fn update_protocol(
            &self,
            protocol: TreatmentProtocol,
        ) -> Result<TreatmentProtocol, RepositoryError> {
            let mut updated = protocol;
            updated.version += 1;
            Ok(updated)
        }

        async fn create_follow_up(
            &self,
            visit: FollowUpVisit,
        ) -> Result<FollowUpVisit, RepositoryError> {
            Ok(visit)
        }

        async fn list_follow_ups(
            &self,
            enrollment_id: Uuid,
        ) -> Result<Vec<FollowUpVisit>, RepositoryError> {
            let visits = self
                .visits
                .iter()
                .filter(|v| v.enrollment_id == enrollment_id.to_string())
                .cloned()
                .collect();
            Ok(visits)
        }
    }
}
