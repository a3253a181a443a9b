//! Service wiring.
//!
//! All services are built once at startup and shared through the depot; the
//! per-request state is the claims principal and the request context, never
//! the services themselves.

use std::sync::Arc;
use std::time::Duration;

use salvo::async_trait;

use crate::error::{AppError, AppResult};
use gateway_core::config::Settings;
use gateway_core::error::CoreError;
use gateway_db::db::DbProvider;
use gateway_service::auth::{AuthorizationService, DbResourceDelegateStore, TokenVerifier};
use gateway_service::comment::CommentService;
use gateway_service::communication::CommunicationService;
use gateway_service::delegation::DelegationService;
use gateway_service::dependent::DependentService;
use gateway_service::feedback::UserFeedbackService;
use gateway_service::note::NoteService;
use gateway_service::notification::NotificationService;
use gateway_service::patient::{PatientRegistry, RegistryPatientLookup, RestPatientRegistry};
use gateway_service::profile::UserProfileService;

pub struct AppServices {
    pub token_verifier: TokenVerifier,
    pub authorization: AuthorizationService,
    pub delegation: DelegationService,
    pub profiles: UserProfileService,
    pub comments: CommentService,
    pub notes: NoteService,
    pub dependents: DependentService,
    pub communications: CommunicationService,
    pub feedback: UserFeedbackService,
    pub notifications: NotificationService,
}

impl AppServices {
    /// ## Summary
    /// Builds the full service graph from settings and the connection pool.
    ///
    /// ## Errors
    /// Returns an error when crypto or registry configuration is invalid.
    pub fn build(settings: &Settings, provider: Arc<dyn DbProvider>) -> anyhow::Result<Self> {
        let registry: Arc<dyn PatientRegistry> =
            Arc::new(RestPatientRegistry::new(&settings.patient_registry)?);
        let delegates = Arc::new(DbResourceDelegateStore::new(Arc::clone(&provider)));
        let patients = Arc::new(RegistryPatientLookup::new(Arc::clone(&registry)));

        Ok(Self {
            token_verifier: TokenVerifier::new(&settings.auth)?,
            authorization: AuthorizationService::from_settings(settings, delegates, patients),
            delegation: DelegationService::from_settings(
                settings,
                Arc::clone(&provider),
                Arc::clone(&registry),
            )?,
            profiles: UserProfileService::from_settings(
                settings,
                Arc::clone(&provider),
                Arc::clone(&registry),
            ),
            comments: CommentService::new(Arc::clone(&provider)),
            notes: NoteService::new(Arc::clone(&provider)),
            dependents: DependentService::from_settings(
                settings,
                Arc::clone(&provider),
                registry,
            ),
            communications: CommunicationService::new(
                Arc::clone(&provider),
                Duration::from_secs(settings.communication.cache_ttl_seconds),
            ),
            feedback: UserFeedbackService::new(Arc::clone(&provider)),
            notifications: NotificationService::new(provider),
        })
    }
}

pub struct ServicesHandler {
    pub services: Arc<AppServices>,
}

#[async_trait]
impl salvo::Handler for ServicesHandler {
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.services));
    }
}

/// ## Summary
/// Retrieves the service graph from the depot.
///
/// ## Errors
/// Returns an error if the services are not found in the depot.
pub fn get_services_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppServices>> {
    depot.obtain::<Arc<AppServices>>().cloned().map_err(|_err| {
        AppError::CoreError(CoreError::InvariantViolation("Services not found in depot"))
    })
}
