use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::comment;
use crate::error::DbResult;
use crate::model::comment::{Comment, NewComment};

/// ## Summary
/// Inserts a comment and returns the stored row.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(conn: &mut DbConnection<'_>, row: &NewComment<'_>) -> DbResult<Comment> {
    Ok(diesel::insert_into(comment::table)
        .values(row)
        .returning(Comment::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Lists a profile's comments for one timeline entry, oldest first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_for_entry(
    conn: &mut DbConnection<'_>,
    user_profile_hdid: &str,
    parent_entry_id: &str,
) -> DbResult<Vec<Comment>> {
    Ok(comment::table
        .filter(comment::user_profile_hdid.eq(user_profile_hdid))
        .filter(comment::parent_entry_id.eq(parent_entry_id))
        .order(comment::created_at.asc())
        .select(Comment::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Lists all comments belonging to a profile.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_for_profile(
    conn: &mut DbConnection<'_>,
    user_profile_hdid: &str,
) -> DbResult<Vec<Comment>> {
    Ok(comment::table
        .filter(comment::user_profile_hdid.eq(user_profile_hdid))
        .order(comment::created_at.asc())
        .select(Comment::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Updates a comment's ciphertext. Scoped to the owning profile.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn update_text(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    user_profile_hdid: &str,
    text: &str,
) -> DbResult<usize> {
    Ok(diesel::update(
        comment::table
            .find(id)
            .filter(comment::user_profile_hdid.eq(user_profile_hdid)),
    )
    .set((
        comment::text.eq(text),
        comment::updated_at.eq(chrono::Utc::now()),
    ))
    .execute(conn)
    .await?)
}

/// ## Summary
/// Deletes a comment. Scoped to the owning profile.
///
/// ## Errors
/// Returns an error if the delete fails.
pub async fn remove(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    user_profile_hdid: &str,
) -> DbResult<usize> {
    Ok(diesel::delete(
        comment::table
            .find(id)
            .filter(comment::user_profile_hdid.eq(user_profile_hdid)),
    )
    .execute(conn)
    .await?)
}
