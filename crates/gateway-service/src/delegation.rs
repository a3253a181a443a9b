//! Delegation invitations.
//!
//! A resource owner invites a delegate by email. The invite email carries an
//! encrypted delegation id; the sharing code travels out of band and only
//! its Argon2 hash is stored. A delegate redeems the invite by presenting
//! the encrypted id, which binds their profile to the delegation row.

use std::sync::Arc;

use diesel_async::scoped_futures::ScopedFutureExt;
use serde::{Deserialize, Serialize};

use crate::crypto::Protector;
use crate::crypto::sharing_code;
use crate::error::{ServiceError, ServiceResult};
use crate::patient::{PatientRegistry, require_details};
use gateway_core::config::Settings;
use gateway_db::db::query::{delegation, email, resource_delegate};
use gateway_db::db::transaction::with_transaction;
use gateway_db::db::{DbProvider, enums::EmailStatus};
use gateway_db::model::delegation::{Delegation, NewDelegation};
use gateway_db::model::email::NewEmail;
use gateway_db::model::resource_delegate::{NewResourceDelegate, REASON_SHARING};

const NICKNAME_MAX_CHARS: usize = 25;
const INVITE_EMAIL_PRIORITY: i32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDelegationRequest {
    pub nickname: String,
    pub email: String,
    pub expiry_date: chrono::NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDelegationResponse {
    pub delegation_id: uuid::Uuid,
    /// Plaintext sharing code, shown once to the owner.
    pub sharing_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociateDelegationRequest {
    pub encrypted_delegation_id: String,
}

pub struct DelegationService {
    provider: Arc<dyn DbProvider>,
    registry: Arc<dyn PatientRegistry>,
    protector: Protector,
    invite_expiry_hours: i64,
    activation_host: String,
    timezone: chrono_tz::Tz,
}

impl DelegationService {
    /// ## Summary
    /// Wires the service from settings.
    ///
    /// ## Errors
    /// Returns an error when the protector key or timezone configuration is
    /// invalid.
    pub fn from_settings(
        settings: &Settings,
        provider: Arc<dyn DbProvider>,
        registry: Arc<dyn PatientRegistry>,
    ) -> ServiceResult<Self> {
        let timezone = settings
            .local_timezone()
            .map_err(|e| ServiceError::InvalidConfiguration(e.to_string()))?;
        Ok(Self {
            provider,
            registry,
            protector: Protector::from_base64_key(&settings.delegation_invite.protector_key)?,
            invite_expiry_hours: settings.delegation_invite.expiry_hours,
            activation_host: settings.email.activation_host.clone(),
            timezone,
        })
    }

    /// ## Summary
    /// Creates a delegation invitation: validates the request, stores the
    /// hashed sharing code, and queues the invite email in the same
    /// transaction. Returns the plaintext sharing code.
    ///
    /// ## Errors
    /// Returns a validation error for a bad request, `NotFound` when the
    /// owner has no registry record, and database or crypto errors otherwise.
    pub async fn create_delegation(
        &self,
        owner_hdid: &str,
        request: &CreateDelegationRequest,
    ) -> ServiceResult<CreateDelegationResponse> {
        let reference_date = chrono::Utc::now().with_timezone(&self.timezone).date_naive();
        validate_invite_request(request, reference_date)?;

        let owner = require_details(self.registry.as_ref(), owner_hdid).await?;
        let owner_identifier = owner.short_identifier();

        let code = sharing_code::generate_sharing_code();
        let code_hash = sharing_code::hash_sharing_code(&code)?;

        let delegation_id = uuid::Uuid::new_v4();
        let protected_id = self.protector.protect(&delegation_id.to_string())?;
        let body = invite_email_body(&self.activation_host, &protected_id, &owner_identifier);

        let row = NewDelegation {
            id: delegation_id,
            resource_owner_hdid: owner_hdid,
            resource_owner_identifier: &owner_identifier,
            nickname: &request.nickname,
            expiry_date: request.expiry_date,
            sharing_code_hash: &code_hash,
        };
        let invite = NewEmail {
            id: uuid::Uuid::new_v4(),
            to_address: &request.email,
            subject: "You have been invited to access health records",
            body: &body,
            status: EmailStatus::New,
            priority: INVITE_EMAIL_PRIORITY,
        };

        let mut conn = self.provider.get_connection().await?;
        with_transaction::<_, ServiceError, _>(&mut conn, |conn| {
            async move {
                delegation::insert(conn, &row).await?;
                email::queue(conn, &invite).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;

        tracing::info!(owner = owner_hdid, %delegation_id, "Delegation invitation created");
        Ok(CreateDelegationResponse {
            delegation_id,
            sharing_code: code,
        })
    }

    /// ## Summary
    /// Redeems an invitation for a delegate: unprotects the id, checks the
    /// invite is still open, and binds the delegate's profile to it. The
    /// accepted invitation becomes a sharing delegate relationship, which is
    /// what the authorization engine's delegation checks consume; it expires
    /// with the invitation's expiry date.
    ///
    /// ## Errors
    /// Returns a validation error for bad ciphertext, an expired or claimed
    /// invite, or a self-delegation attempt; `NotFound` when the delegation
    /// does not exist.
    pub async fn associate_delegation(
        &self,
        delegate_hdid: &str,
        request: &AssociateDelegationRequest,
    ) -> ServiceResult<Delegation> {
        let id = self
            .protector
            .unprotect(&request.encrypted_delegation_id)
            .map_err(|_| {
                ServiceError::ValidationError("Invalid delegation invitation".to_string())
            })?;
        let id = id.parse::<uuid::Uuid>().map_err(|_| {
            ServiceError::ValidationError("Invalid delegation invitation".to_string())
        })?;

        let resource_owner_hdid: String;
        let mut conn = self.provider.get_connection().await?;
        let row = delegation::find(&mut conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Delegation {id} not found")))?;

        let now = chrono::Utc::now();
        if invite_expired(row.created_at, self.invite_expiry_hours, now) {
            return Err(ServiceError::ValidationError(
                "Delegation invitation has expired".to_string(),
            ));
        }
        if row.resource_owner_hdid == delegate_hdid {
            return Err(ServiceError::ValidationError(
                "Cannot accept a delegation to your own records".to_string(),
            ));
        }
        if row.is_claimed() {
            return Err(ServiceError::ValidationError(
                "Delegation invitation has already been accepted".to_string(),
            ));
        }

        resource_owner_hdid = row.resource_owner_hdid.clone();
        let relationship = NewResourceDelegate {
            resource_owner_hdid: &resource_owner_hdid,
            profile_hdid: delegate_hdid,
            reason_code: REASON_SHARING,
            expiry_date: Some(row.expiry_date),
        };
        with_transaction::<_, ServiceError, _>(&mut conn, |conn| {
            async move {
                delegation::claim(conn, id, delegate_hdid).await?;
                resource_delegate::insert(conn, &relationship).await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await?;
        tracing::info!(delegate = delegate_hdid, %id, "Delegation invitation accepted");

        delegation::find(&mut conn, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Delegation {id} not found")))
    }

    /// ## Summary
    /// Lists invitations created by a resource owner, newest first.
    ///
    /// ## Errors
    /// Returns database errors.
    pub async fn list_for_owner(&self, owner_hdid: &str) -> ServiceResult<Vec<Delegation>> {
        let mut conn = self.provider.get_connection().await?;
        Ok(delegation::list_for_owner(&mut conn, owner_hdid).await?)
    }
}

fn validate_invite_request(
    request: &CreateDelegationRequest,
    reference_date: chrono::NaiveDate,
) -> ServiceResult<()> {
    let nickname = request.nickname.trim();
    if nickname.is_empty() {
        return Err(ServiceError::ValidationError(
            "Nickname must not be empty".to_string(),
        ));
    }
    if nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(ServiceError::ValidationError(format!(
            "Nickname must be at most {NICKNAME_MAX_CHARS} characters"
        )));
    }
    if !plausible_email(&request.email) {
        return Err(ServiceError::ValidationError(
            "Email address is not valid".to_string(),
        ));
    }
    if request.expiry_date < reference_date {
        return Err(ServiceError::ValidationError(
            "Expiry date must not be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Syntactic plausibility only; deliverability is the mailer's problem.
fn plausible_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn invite_expired(
    created_at: chrono::DateTime<chrono::Utc>,
    expiry_hours: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> bool {
    now - created_at > chrono::Duration::hours(expiry_hours)
}

fn invite_email_body(activation_host: &str, protected_id: &str, owner_identifier: &str) -> String {
    format!(
        "{owner_identifier} has invited you to access their health records.\n\
         Accept the invitation at {activation_host}/delegation/accept?invite={protected_id}\n\
         You will need the sharing code they gave you."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn request(nickname: &str, email: &str, expiry: chrono::NaiveDate) -> CreateDelegationRequest {
        CreateDelegationRequest {
            nickname: nickname.to_string(),
            email: email.to_string(),
            expiry_date: expiry,
        }
    }

    #[test]
    fn valid_request_passes() {
        let today = date(2026, 8, 23);
        assert!(
            validate_invite_request(&request("Grandma", "g@example.ca", today), today).is_ok()
        );
    }

    #[test]
    fn nickname_rules() {
        let today = date(2026, 8, 23);
        assert!(
            validate_invite_request(&request("  ", "g@example.ca", today), today).is_err()
        );
        let long = "x".repeat(26);
        assert!(
            validate_invite_request(&request(&long, "g@example.ca", today), today).is_err()
        );
        let max = "x".repeat(25);
        assert!(validate_invite_request(&request(&max, "g@example.ca", today), today).is_ok());
    }

    #[test]
    fn email_plausibility() {
        assert!(plausible_email("someone@example.ca"));
        assert!(!plausible_email("someone"));
        assert!(!plausible_email("@example.ca"));
        assert!(!plausible_email("someone@nodot"));
        assert!(!plausible_email("someone@.ca"));
    }

    #[test]
    fn past_expiry_date_is_rejected() {
        let today = date(2026, 8, 23);
        assert!(
            validate_invite_request(&request("Grandma", "g@example.ca", date(2026, 8, 22)), today)
                .is_err()
        );
        assert!(
            validate_invite_request(&request("Grandma", "g@example.ca", today), today).is_ok()
        );
    }

    #[test]
    fn invite_age_gate() {
        let created = chrono::Utc::now();
        assert!(!invite_expired(created, 48, created + chrono::Duration::hours(47)));
        assert!(invite_expired(created, 48, created + chrono::Duration::hours(49)));
    }

    #[test]
    fn invite_body_contains_link_and_host() {
        let body = invite_email_body("https://gw.example.ca", "OPAQUE", "Alex R");
        assert!(body.contains("https://gw.example.ca/delegation/accept?invite=OPAQUE"));
        assert!(body.contains("Alex R"));
    }
}
