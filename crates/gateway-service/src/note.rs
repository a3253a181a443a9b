//! Private journal notes.
//!
//! Titles and bodies are sealed under the profile key with the same lazy
//! key-setup rule as comments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::comment::{CipherLookup, ensure_profile_cipher, missing_key, profile_cipher};
use crate::crypto::RecordCipher;
use crate::error::{ServiceError, ServiceResult};
use gateway_core::types::{RequestError, RequestResult};
use gateway_db::db::DbProvider;
use gateway_db::db::query::note;
use gateway_db::model::note::NewNote;

#[derive(Debug, Clone, Deserialize)]
pub struct WriteNoteRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub journal_date: chrono::NaiveDate,
}

/// A note with its fields decrypted for the caller.
#[derive(Debug, Clone, Serialize)]
pub struct NoteView {
    pub id: uuid::Uuid,
    pub title: Option<String>,
    pub text: Option<String>,
    pub journal_date: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct NoteService {
    provider: Arc<dyn DbProvider>,
}

impl NoteService {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }

    /// ## Summary
    /// Adds a note, sealing title and body under the profile key (created on
    /// first write).
    ///
    /// ## Errors
    /// Returns database or crypto errors; a missing profile is an error
    /// envelope.
    pub async fn add(
        &self,
        hdid: &str,
        request: &WriteNoteRequest,
    ) -> ServiceResult<RequestResult<NoteView>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match ensure_profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => {
                return Ok(RequestResult::error(RequestError::new(
                    "profile_not_found",
                    "No profile exists for this user",
                )));
            }
        };

        let sealed_title = request.title.as_deref().map(|t| cipher.seal(t)).transpose()?;
        let sealed_text = request.text.as_deref().map(|t| cipher.seal(t)).transpose()?;
        let stored = note::insert(
            &mut conn,
            &NewNote {
                id: uuid::Uuid::new_v4(),
                hdid,
                title: sealed_title.as_deref(),
                text: sealed_text.as_deref(),
                journal_date: request.journal_date,
            },
        )
        .await?;

        Ok(RequestResult::success(NoteView {
            id: stored.id,
            title: request.title.clone(),
            text: request.text.clone(),
            journal_date: stored.journal_date,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    /// ## Summary
    /// Lists a profile's notes, decrypted, newest journal date first.
    ///
    /// ## Errors
    /// Returns database or crypto errors; a profile without a key answers
    /// ActionRequired.
    pub async fn list(&self, hdid: &str) -> ServiceResult<RequestResult<Vec<NoteView>>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => return Ok(missing_key()),
        };

        let rows = note::list(&mut conn, hdid).await?;
        let views = rows
            .into_iter()
            .map(|row| decrypt_view(&cipher, row))
            .collect::<ServiceResult<Vec<_>>>()?;
        let count = i64::try_from(views.len()).unwrap_or(i64::MAX);
        Ok(RequestResult::success(views).with_total_count(count))
    }

    /// ## Summary
    /// Updates a note, re-sealing its fields.
    ///
    /// ## Errors
    /// Returns `NotFound` when the note is not the profile's, database or
    /// crypto errors otherwise.
    pub async fn update(
        &self,
        hdid: &str,
        id: uuid::Uuid,
        request: &WriteNoteRequest,
    ) -> ServiceResult<RequestResult<()>> {
        let mut conn = self.provider.get_connection().await?;
        let cipher = match profile_cipher(&mut conn, hdid).await? {
            CipherLookup::Ready(cipher) => cipher,
            CipherLookup::NoProfile => return Ok(missing_key()),
        };

        let sealed_title = request.title.as_deref().map(|t| cipher.seal(t)).transpose()?;
        let sealed_text = request.text.as_deref().map(|t| cipher.seal(t)).transpose()?;
        if note::update(
            &mut conn,
            id,
            hdid,
            sealed_title.as_deref(),
            sealed_text.as_deref(),
            request.journal_date,
        )
        .await?
            == 0
        {
            return Err(ServiceError::NotFound(format!("Note {id} not found")));
        }
        Ok(RequestResult::success(()))
    }

    /// ## Summary
    /// Deletes a note belonging to the profile.
    ///
    /// ## Errors
    /// Returns `NotFound` when no row matches, or database errors.
    pub async fn remove(&self, hdid: &str, id: uuid::Uuid) -> ServiceResult<()> {
        let mut conn = self.provider.get_connection().await?;
        if note::remove(&mut conn, id, hdid).await? == 0 {
            return Err(ServiceError::NotFound(format!("Note {id} not found")));
        }
        Ok(())
    }
}

fn decrypt_view(cipher: &RecordCipher, row: gateway_db::model::note::Note) -> ServiceResult<NoteView> {
    let title = row.title.as_deref().map(|t| cipher.open(t)).transpose()?;
    let text = row.text.as_deref().map(|t| cipher.open(t)).transpose()?;
    Ok(NoteView {
        id: row.id,
        title,
        text,
        journal_date: row.journal_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
