use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::protocol::{FollowUpVisit, NcdEnrollment, TreatmentProtocol};
use super::errors::RepositoryError;

/// Protocol statuses under which a protocol is considered open for updates
const OPEN_STATUSES: [&str; 2] = ["Active", "Escalated"];

/// In-memory storage implementation for NCD protocol records
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    /// Storage for program enrollments
    enrollments: Arc<Mutex<HashMap<String, NcdEnrollment>>>,

    /// Storage for treatment protocols
    protocols: Arc<Mutex<HashMap<String, TreatmentProtocol>>>,

    /// Storage for follow-up visits
    visits: Arc<Mutex<HashMap<String, FollowUpVisit>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            enrollments: Arc::new(Mutex::new(HashMap::new())),
            protocols: Arc::new(Mutex::new(HashMap::new())),
            visits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store an enrollment in memory
    pub async fn store_enrollment(
        &self,
        enrollment: &NcdEnrollment,
    ) -> Result<NcdEnrollment, RepositoryError> {
        let mut store = self
            .enrollments
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        store.insert(enrollment.id.clone(), enrollment.clone());
        Ok(enrollment.clone())
    }

    /// Get an enrollment by ID from memory
    pub async fn get_enrollment(
        &self,
        id: &str,
    ) -> Result<Option<NcdEnrollment>, RepositoryError> {
        let store = self
            .enrollments
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    /// Store a new protocol in memory
    pub async fn store_protocol(
        &self,
        protocol: &TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError> {
        let mut store = self
            .protocols
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        store.insert(protocol.id.clone(), protocol.clone());
        Ok(protocol.clone())
    }

    /// Get a protocol by ID from memory
    pub async fn get_protocol(
        &self,
        id: &str,
    ) -> Result<Option<TreatmentProtocol>, RepositoryError> {
        let store = self
            .protocols
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    /// Get the open protocol for an enrollment, if any
    pub async fn get_active_protocol(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<TreatmentProtocol>, RepositoryError> {
        let store = self
            .protocols
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        let active = store
            .values()
            .find(|p| {
                p.enrollment_id == enrollment_id
                    && OPEN_STATUSES.contains(&p.status.as_str())
            })
            .cloned();
        Ok(active)
    }

    /// Update a stored protocol, enforcing the version check.
    /// The stored version must match the incoming record's version; the
    /// stored copy is then advanced by one.
    pub async fn update_protocol(
        &self,
        protocol: &TreatmentProtocol,
    ) -> Result<TreatmentProtocol, RepositoryError> {
        let mut store = self
            .protocols
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        let existing = store.get(&protocol.id).ok_or_else(|| {
            RepositoryError::NotFound(format!("Protocol {} not found", protocol.id))
        })?;

        if existing.version != protocol.version {
            return Err(RepositoryError::Conflict(format!(
                "Protocol {} was modified concurrently (stored version {}, incoming {})",
                protocol.id, existing.version, protocol.version
            )));
        }

        let mut updated = protocol.clone();
        updated.version += 1;
        store.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    /// Store a follow-up visit in memory
    pub async fn store_visit(
        &self,
        visit: &FollowUpVisit,
    ) -> Result<FollowUpVisit, RepositoryError> {
        let mut store = self
            .visits
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;
        store.insert(visit.id.clone(), visit.clone());
        Ok(visit.clone())
    }

    /// Get all follow-up visits for an enrollment, oldest first
    pub async fn get_visits(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<FollowUpVisit>, RepositoryError> {
        let store = self
            .visits
            .lock()
            .map_err(|e| RepositoryError::Lock(e.to_string()))?;

        let mut visits: Vec<FollowUpVisit> = store
            .values()
            .filter(|v| v.enrollment_id == enrollment_id)
            .cloned()
            .collect();

        visits.sort_by(|a, b| a.visit_date.cmp(&b.visit_date));
        Ok(visits)
    }
}
