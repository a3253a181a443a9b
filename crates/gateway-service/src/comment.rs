//! Timeline entry comments.
//!
//! Comment bodies are stored sealed under the owning profile's encryption
//! key. The key is created lazily on first write; reads against a profile
//! that never wrote anything answer ActionRequired so the client can prompt
//! key setup instead of treating it as a fault.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::crypto::RecordCipher;
use crate::crypto::record;
use crate::error::{ServiceError, ServiceResult};
use gateway_core::types::{RequestError, RequestResult};
use gateway_db::db::DbProvider;
use gateway_db::db::connection::DbConnection;
use gateway_db::db::query::{comment, user_profile};
use gateway_db::model::comment::NewComment;

#[derive(Debug, Clone, Deserialize)]
pub struct WriteCommentRequest {
    pub entry_type_code: String,
    pub parent_entry_id: Option<String>,
    pub text: String,
}

/// A comment with its body decrypted for the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: uuid::Uuid,
    pub entry_type_code: String,
    pub parent_entry_id: Option<String>,
    pub text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct CommentService {
    provider: Arc<dyn DbProvider>,
}

impl CommentService {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }

    /// ## Summary
    /// Adds a comment, sealing the body under the profile key (created on
    /// first write).
    ///
    /// ## Errors
    /// Returns database or crypto errors; a missing profile is an error
    /// envelope.
    pub async fn add(
        &self,
        hdid: &str,
        request: &WriteCommentRequest,
    ) -> ServiceResult<RequestResult<CommentView>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match ensure_profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => return Ok(missing_profile()),
        };

        let sealed = cipher.seal(&request.text)?;
        let stored = comment::insert(
            &mut conn,
            &NewComment {
                id: uuid::Uuid::new_v4(),
                user_profile_hdid: hdid,
                entry_type_code: &request.entry_type_code,
                parent_entry_id: request.parent_entry_id.as_deref(),
                text: Some(&sealed),
            },
        )
        .await?;

        Ok(RequestResult::success(CommentView {
            id: stored.id,
            entry_type_code: stored.entry_type_code,
            parent_entry_id: stored.parent_entry_id,
            text: Some(request.text.clone()),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    /// ## Summary
    /// Lists a profile's comments for one timeline entry, decrypted.
    ///
    /// ## Errors
    /// Returns database or crypto errors; a profile without a key answers
    /// ActionRequired.
    pub async fn list_for_entry(
        &self,
        hdid: &str,
        parent_entry_id: &str,
    ) -> ServiceResult<RequestResult<Vec<CommentView>>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => return Ok(missing_key()),
        };

        let rows = comment::list_for_entry(&mut conn, hdid, parent_entry_id).await?;
        let views = rows
            .into_iter()
            .map(|row| decrypt_view(&cipher, row))
            .collect::<ServiceResult<Vec<_>>>()?;
        let count = i64::try_from(views.len()).unwrap_or(i64::MAX);
        Ok(RequestResult::success(views).with_total_count(count))
    }

    /// ## Summary
    /// Updates a comment's body, re-sealing it.
    ///
    /// ## Errors
    /// Returns `NotFound` when the comment is not the profile's, database or
    /// crypto errors otherwise.
    pub async fn update(
        &self,
        hdid: &str,
        id: uuid::Uuid,
        text: &str,
    ) -> ServiceResult<RequestResult<()>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => return Ok(missing_key()),
        };

        let sealed = cipher.seal(text)?;
        if comment::update_text(&mut conn, id, hdid, &sealed).await? == 0 {
            return Err(ServiceError::NotFound(format!("Comment {id} not found")));
        }
        Ok(RequestResult::success(()))
    }

    /// ## Summary
    /// Deletes a comment belonging to the profile.
    ///
    /// ## Errors
    /// Returns `NotFound` when no row matches, or database errors.
    pub async fn remove(&self, hdid: &str, id: uuid::Uuid) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if comment::remove(&mut conn, id, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!("Comment {id} not found")));
        }
        Ok(())
    }
}

pub(crate) enum CipherLookup {
    Ready(RecordCipher),
    NoProfile,
}

/// Loads the profile's cipher for reading. A profile without a key has never
/// written an encrypted record.
pub(crate) async fn profile_cipher(
    conn: &mut DbConnection<'_>,
    hdid: &str,
) -> ServiceResult<CipherLookup> {
    let Some(profile) = user_profile::find(conn, hdid).await? else {
        return Ok(CipherLookup::NoProfile);
    };
    match profile.encryption_key {
        Some(key) => Ok(CipherLookup::Ready(RecordCipher::from_stored_key(&key)?)),
        None => Ok(CipherLookup::NoProfile),
    }
}

/// Loads the profile's cipher for writing, generating and storing a key on
/// first use.
pub(crate) async fn ensure_profile_cipher(
    conn: &mut DbConnection<'_>,
    hdid: &str,
) -> ServiceResult<CipherLookup> {
    let Some(profile) = user_profile::find(conn, hdid).await? else {
        return Ok(CipherLookup::NoProfile);
    };
    if let Some(key) = profile.encryption_key {
        return Ok(CipherLookup::Ready(RecordCipher::from_stored_key(&key)?));
    }

    let key = record::generate_key();
    user_profile::set_encryption_key(conn, hdid, &key).await?;
    // The write-once filter may have lost a race; re-read the winner.
    let Some(profile) = user_profile::find(conn, hdid).await? else {
        return Ok(CipherLookup::NoProfile);
    };
    match profile.encryption_key {
        Some(key) => Ok(CipherLookup::Ready(RecordCipher::from_stored_key(&key)?)),
        None => Err(ServiceError::InvariantViolation(
            "profile key missing immediately after creation",
        )),
    }
}

pub(crate) fn missing_key<T>() -> RequestResult<T> {
    RequestResult::action_required(RequestError::new(
        "missing_encryption_key",
        "Profile has no encryption key yet",
    ))
}

fn missing_profile<T>() -> RequestResult<T> {
    RequestResult::error(RequestError::new(
        "profile_not_found",
        "No profile exists for this user",
    ))
}

fn decrypt_view(
    cipher: &RecordCipher,
    row: gateway_db::model::comment::Comment,
) -> ServiceResult<CommentView> {
    let text = row.text.as_deref().map(|t| cipher.open(t)).transpose()?;
    Ok(CommentView {
        id: row.id,
        entry_type_code: row.entry_type_code,
        parent_entry_id: row.parent_entry_id,
        text,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
