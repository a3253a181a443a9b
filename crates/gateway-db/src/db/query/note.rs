use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::note;
use crate::error::DbResult;
use crate::model::note::{NewNote, Note};

/// ## Summary
/// Inserts a note and returns the stored row.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(conn: &mut DbConnection<'_>, row: &NewNote<'_>) -> DbResult<Note> {
    Ok(diesel::insert_into(note::table)
        .values(row)
        .returning(Note::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Lists a profile's notes, newest journal date first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list(conn: &mut DbConnection<'_>, hdid: &str) -> DbResult<Vec<Note>> {
    Ok(note::table
        .filter(note::hdid.eq(hdid))
        .order(note::journal_date.desc())
        .select(Note::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Updates a note's ciphertext fields. Scoped to the owning profile.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    hdid: &str,
    title: Option<&str>,
    text: Option<&str>,
    journal_date: chrono::NaiveDate,
) -> DbResult<usize> {
    Ok(
        diesel::update(note::table.find(id).filter(note::hdid.eq(hdid)))
            .set((
                note::title.eq(title),
                note::text.eq(text),
                note::journal_date.eq(journal_date),
                note::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(conn)
            .await?,
    )
}

/// ## Summary
/// Deletes a note. Scoped to the owning profile.
///
/// ## Errors
/// Returns an error if the delete fails.
pub async fn remove(conn: &mut DbConnection<'_>, id: uuid::Uuid, hdid: &str) -> DbResult<usize> {
    Ok(
        diesel::delete(note::table.find(id).filter(note::hdid.eq(hdid)))
            .execute(conn)
            .await?,
    )
}
