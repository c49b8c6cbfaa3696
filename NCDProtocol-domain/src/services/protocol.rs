use async_trait::async_trait;
use chrono::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::protocol::{
    CreateFollowUpRequest, FollowUpOutcome, FollowUpVisit, NcdEnrollment, ProtocolDecision,
    StartProtocolOutcome, TreatmentProtocol,
};
use crate::entities::vitals::VitalReading;
use crate::services::follow_up::{self, EvaluationSettings};
use crate::services::hypertension::{self, HypertensionEngineError};
use ncd_protocol_data::repository::{ProtocolRepositoryTrait, RepositoryError};

/// Default blood pressure target for a new hypertension protocol, in mmHg
const DEFAULT_BP_TARGET: (u16, u16) = (140, 90);

/// Days until a freshly started protocol is due for review
const REVIEW_INTERVAL_DAYS: i64 = 30;

/// Protocol service errors
#[derive(Debug, Error)]
pub enum ProtocolServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A transition was requested on a protocol in a terminal state
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The protocol type is not driven by this engine
    #[error("Unsupported protocol type: {0}")]
    UnsupportedProtocol(String),

    /// Two writers raced on the same protocol
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<HypertensionEngineError> for ProtocolServiceError {
    fn from(err: HypertensionEngineError) -> Self {
        match err {
            HypertensionEngineError::InvalidStateTransition(status) => {
                ProtocolServiceError::InvalidStateTransition(status)
            }
            HypertensionEngineError::UnsupportedProtocol(protocol_type) => {
                ProtocolServiceError::UnsupportedProtocol(protocol_type)
            }
        }
    }
}

/// Trait for protocol service operations
#[async_trait]
pub trait ProtocolServiceTrait {
    /// Validate a follow-up request
    fn validate_follow_up_request(
        &self,
        request: &CreateFollowUpRequest,
    ) -> Result<(), ProtocolServiceError>;

    /// Create a new program enrollment
    async fn create_enrollment(
        &self,
        enrollment: NcdEnrollment,
    ) -> Result<NcdEnrollment, ProtocolServiceError>;

    /// Decide and, when warranted, start a treatment protocol from a first
    /// blood pressure reading
    async fn start_protocol(
        &self,
        enrollment: &NcdEnrollment,
        reading: &VitalReading,
        is_pregnant: bool,
    ) -> Result<StartProtocolOutcome, ProtocolServiceError>;

    /// Evaluate a follow-up visit against its protocol, persist the
    /// transition and the visit, and return the outcome
    async fn record_follow_up(
        &self,
        protocol_id: &str,
        request: CreateFollowUpRequest,
    ) -> Result<FollowUpOutcome, ProtocolServiceError>;

    /// Get a treatment protocol by ID
    async fn get_protocol(&self, id: &str) -> Result<TreatmentProtocol, ProtocolServiceError>;

    /// Get the open protocol for an enrollment, if any
    async fn get_active_protocol(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<TreatmentProtocol>, ProtocolServiceError>;
}

/// Protocol service wiring the pure engine components to persistence
pub struct ProtocolService<R: ProtocolRepositoryTrait> {
    repository: R,
    settings: EvaluationSettings,
}

impl<R: ProtocolRepositoryTrait> ProtocolService<R> {
    /// Create a new protocol service with default evaluation settings
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            settings: EvaluationSettings::default(),
        }
    }

    /// Create a new protocol service with explicit evaluation settings
    pub fn with_settings(repository: R, settings: EvaluationSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ProtocolServiceError {
        match err {
            RepositoryError::NotFound(msg) => ProtocolServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ProtocolServiceError::ValidationError(msg),
            RepositoryError::Conflict(msg) => ProtocolServiceError::Conflict(msg),
            _ => ProtocolServiceError::RepositoryError(err.to_string()),
        }
    }

    /// Map a storage-record parse failure to a service error
    fn map_conversion_error(&self, msg: String) -> ProtocolServiceError {
        ProtocolServiceError::RepositoryError(msg)
    }
}

#[async_trait]
impl<R: ProtocolRepositoryTrait + Send + Sync> ProtocolServiceTrait for ProtocolService<R> {
    /// Validate a follow-up request
    fn validate_follow_up_request(
        &self,
        request: &CreateFollowUpRequest,
    ) -> Result<(), ProtocolServiceError> {
        // Use the validator crate's validation
        if let Err(validation_errors) = request.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(ProtocolServiceError::ValidationError(error_message));
        }

        // Additional validation: systolic must exceed diastolic when both
        // are present
        if let (Some(systolic), Some(diastolic)) = (request.systolic_bp, request.diastolic_bp) {
            if systolic <= diastolic {
                return Err(ProtocolServiceError::ValidationError(
                    "Systolic pressure must be greater than diastolic pressure".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Create a new program enrollment
    async fn create_enrollment(
        &self,
        enrollment: NcdEnrollment,
    ) -> Result<NcdEnrollment, ProtocolServiceError> {
        let data_enrollment = conversions::convert_to_data_enrollment(&enrollment);

        let stored = self
            .repository
            .create_enrollment(data_enrollment)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_enrollment(stored)
            .map_err(|e| self.map_conversion_error(e))
    }

    /// Decide and, when warranted, start a treatment protocol from a first
    /// blood pressure reading
    async fn start_protocol(
        &self,
        enrollment: &NcdEnrollment,
        reading: &VitalReading,
        is_pregnant: bool,
    ) -> Result<StartProtocolOutcome, ProtocolServiceError> {
        let decision = hypertension::select_initial_protocol(reading, is_pregnant);

        let (protocol_type, medications) = match &decision {
            ProtocolDecision::Protocol {
                protocol_type,
                medications,
            } => (*protocol_type, medications.clone()),
            // Referrals and advisories persist nothing
            _ => {
                debug!(
                    "No protocol started for enrollment {}: {:?}",
                    enrollment.id, decision
                );
                return Ok(StartProtocolOutcome {
                    decision,
                    protocol: None,
                });
            }
        };

        let start_date = reading.measurement_date;
        let protocol = TreatmentProtocol {
            id: Uuid::new_v4().to_string(),
            patient_id: enrollment.patient_id.clone(),
            enrollment_id: enrollment.id.clone(),
            protocol_type,
            start_date,
            bp_target_systolic: DEFAULT_BP_TARGET.0,
            bp_target_diastolic: DEFAULT_BP_TARGET.1,
            glucose_target_mmol_l: None,
            weight_goal_kg: None,
            current_medications: medications,
            escalation_step: 0,
            status: crate::entities::protocol::ProtocolStatus::Active,
            next_review_date: start_date + Duration::days(REVIEW_INTERVAL_DAYS),
            version: 0,
        };

        let data_protocol = conversions::convert_to_data_protocol(&protocol);
        let stored = self
            .repository
            .create_protocol(data_protocol)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let protocol = conversions::convert_to_domain_protocol(stored)
            .map_err(|e| self.map_conversion_error(e))?;

        debug!(
            "Started {:?} protocol {} for enrollment {}",
            protocol.protocol_type, protocol.id, enrollment.id
        );

        Ok(StartProtocolOutcome {
            decision,
            protocol: Some(protocol),
        })
    }

    /// Evaluate a follow-up visit against its protocol, persist the
    /// transition and the visit, and return the outcome
    async fn record_follow_up(
        &self,
        protocol_id: &str,
        request: CreateFollowUpRequest,
    ) -> Result<FollowUpOutcome, ProtocolServiceError> {
        self.validate_follow_up_request(&request)?;

        let id_uuid = conversions::parse_string_to_uuid(protocol_id)
            .map_err(ProtocolServiceError::ValidationError)?;

        let data_protocol = self
            .repository
            .get_protocol(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                ProtocolServiceError::NotFound(format!("Protocol {} not found", protocol_id))
            })?;

        let protocol = conversions::convert_to_domain_protocol(data_protocol)
            .map_err(|e| self.map_conversion_error(e))?;

        let visit = FollowUpVisit {
            id: Uuid::new_v4().to_string(),
            enrollment_id: protocol.enrollment_id.clone(),
            protocol_id: Some(protocol.id.clone()),
            systolic_bp: request.systolic_bp,
            diastolic_bp: request.diastolic_bp,
            blood_glucose: request.blood_glucose,
            weight_kg: request.weight_kg,
            bp_target_met: None,
            glucose_target_met: None,
            weight_target_met: None,
            visit_date: request.visit_date,
        };

        let outcome = follow_up::evaluate_follow_up(&protocol, &visit, &self.settings)?;

        // Persist the protocol transition under the version check
        let updated_data =
            conversions::convert_to_data_protocol(&outcome.updated_protocol);
        let stored = self
            .repository
            .update_protocol(updated_data)
            .await
            .map_err(|e| self.map_repo_error(e))?;
        let updated_protocol = conversions::convert_to_domain_protocol(stored)
            .map_err(|e| self.map_conversion_error(e))?;

        // Persist the visit with the evaluator-computed flags
        let stored_visit = FollowUpVisit {
            bp_target_met: outcome.targets.bp_target_met,
            glucose_target_met: outcome.targets.glucose_target_met,
            weight_target_met: outcome.targets.weight_target_met,
            ..visit
        };
        self.repository
            .create_follow_up(conversions::convert_to_data_visit(&stored_visit))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        debug!(
            "Recorded follow-up for protocol {}: status {:?}, step {}",
            updated_protocol.id, updated_protocol.status, updated_protocol.escalation_step
        );

        Ok(FollowUpOutcome {
            targets: outcome.targets,
            updated_protocol,
        })
    }

    /// Get a treatment protocol by ID
    async fn get_protocol(&self, id: &str) -> Result<TreatmentProtocol, ProtocolServiceError> {
        let id_uuid = conversions::parse_string_to_uuid(id)
            .map_err(ProtocolServiceError::ValidationError)?;

        let data_protocol = self
            .repository
            .get_protocol(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                ProtocolServiceError::NotFound(format!("Protocol {} not found", id))
            })?;

        conversions::convert_to_domain_protocol(data_protocol)
            .map_err(|e| self.map_conversion_error(e))
    }

    /// Get the open protocol for an enrollment, if any
    async fn get_active_protocol(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<TreatmentProtocol>, ProtocolServiceError> {
        let id_uuid = conversions::parse_string_to_uuid(enrollment_id)
            .map_err(ProtocolServiceError::ValidationError)?;

        let data_protocol = self
            .repository
            .get_active_protocol(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        match data_protocol {
            Some(data_protocol) => conversions::convert_to_domain_protocol(data_protocol)
                .map(Some)
                .map_err(|e| self.map_conversion_error(e)),
            None => Ok(None),
        }
    }
}

/// Create a default protocol service using the repository from the data
/// layer
pub fn create_default_protocol_service() -> impl ProtocolServiceTrait + Send + Sync {
    let repository = ncd_protocol_data::repository::ProtocolRepository::new();
    ProtocolService::new(repository)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::protocol::ProtocolStatus;
    use chrono::Utc;
    use ncd_protocol_data::repository::tests::MockProtocolRepository;

    fn test_enrollment() -> NcdEnrollment {
        NcdEnrollment {
            id: Uuid::new_v4().to_string(),
            patient_id: "patient-1".to_string(),
            has_hypertension: true,
            has_diabetes: false,
            enrolled_at: Utc::now(),
        }
    }

    fn test_reading(systolic: u16, diastolic: u16) -> VitalReading {
        VitalReading {
            systolic_bp: Some(systolic),
            diastolic_bp: Some(diastolic),
            heart_rate: None,
            temperature_c: None,
            respiratory_rate: None,
            oxygen_saturation: None,
            height_cm: None,
            weight_kg: None,
            blood_glucose: None,
            glucose_test_type: None,
            measurement_date: Utc::now(),
        }
    }

    fn follow_up_request(systolic: u16, diastolic: u16) -> CreateFollowUpRequest {
        CreateFollowUpRequest {
            systolic_bp: Some(systolic),
            diastolic_bp: Some(diastolic),
            blood_glucose: None,
            weight_kg: None,
            visit_date: Utc::now(),
        }
    }

    #[test]
    fn test_validate_follow_up_request_valid() {
        let service = ProtocolService::new(MockProtocolRepository::new());
        assert!(service
            .validate_follow_up_request(&follow_up_request(130, 85))
            .is_ok());
    }

    #[test]
    fn test_validate_follow_up_request_out_of_range() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let mut request = follow_up_request(130, 85);
        request.systolic_bp = Some(350);

        let result = service.validate_follow_up_request(&request);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Systolic"));
    }

    #[test]
    fn test_validate_follow_up_request_systolic_not_above_diastolic() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let result = service.validate_follow_up_request(&follow_up_request(85, 85));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("greater than"));
    }

    #[tokio::test]
    async fn test_start_protocol_persists_for_protocol_band() {
        let service = ProtocolService::new(MockProtocolRepository::new());
        let enrollment = test_enrollment();

        let outcome = service
            .start_protocol(&enrollment, &test_reading(165, 95), false)
            .await
            .unwrap();

        let protocol = outcome.protocol.expect("protocol should be persisted");
        assert_eq!(protocol.status, ProtocolStatus::Active);
        assert_eq!(protocol.escalation_step, 0);
        assert_eq!(protocol.bp_target_systolic, 140);
        assert_eq!(protocol.current_medications.len(), 2);
        assert_eq!(protocol.enrollment_id, enrollment.id);
        assert_eq!(
            protocol.next_review_date - protocol.start_date,
            Duration::days(30)
        );
    }

    #[tokio::test]
    async fn test_start_protocol_advisory_persists_nothing() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let outcome = service
            .start_protocol(&test_enrollment(), &test_reading(118, 76), false)
            .await
            .unwrap();

        assert!(outcome.protocol.is_none());
        assert!(matches!(
            outcome.decision,
            ProtocolDecision::Advisory { .. }
        ));
    }

    #[tokio::test]
    async fn test_start_protocol_referral_persists_nothing() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let outcome = service
            .start_protocol(&test_enrollment(), &test_reading(185, 95), false)
            .await
            .unwrap();

        assert!(outcome.protocol.is_none());
        assert!(matches!(
            outcome.decision,
            ProtocolDecision::Referral { .. }
        ));
    }

    #[tokio::test]
    async fn test_record_follow_up_escalates_unmet_protocol() {
        let enrollment_id = Uuid::new_v4();
        let protocol_id = Uuid::new_v4();

        let service = ProtocolService::new(MockProtocolRepository::new());
        let enrollment = NcdEnrollment {
            id: enrollment_id.to_string(),
            ..test_enrollment()
        };
        // Seed the mock with a stored HTN-I protocol
        let seed = service
            .start_protocol(&enrollment, &test_reading(145, 85), false)
            .await
            .unwrap()
            .protocol
            .unwrap();
        let mut data_seed = conversions::convert_to_data_protocol(&seed);
        data_seed.id = protocol_id.to_string();
        let service =
            ProtocolService::new(MockProtocolRepository::with_protocols(vec![data_seed]));

        let outcome = service
            .record_follow_up(&protocol_id.to_string(), follow_up_request(152, 94))
            .await
            .unwrap();

        assert_eq!(outcome.targets.bp_target_met, Some(false));
        assert_eq!(outcome.updated_protocol.status, ProtocolStatus::Escalated);
        assert_eq!(outcome.updated_protocol.escalation_step, 1);
        // The mock bumps the version on update
        assert_eq!(outcome.updated_protocol.version, 1);
    }

    #[tokio::test]
    async fn test_record_follow_up_unknown_protocol() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let result = service
            .record_follow_up(&Uuid::new_v4().to_string(), follow_up_request(130, 85))
            .await;

        assert!(matches!(result, Err(ProtocolServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_record_follow_up_rejects_bad_uuid() {
        let service = ProtocolService::new(MockProtocolRepository::new());

        let result = service
            .record_follow_up("not-a-uuid", follow_up_request(130, 85))
            .await;

        assert!(matches!(
            result,
            Err(ProtocolServiceError::ValidationError(_))
        ));
    }
}
