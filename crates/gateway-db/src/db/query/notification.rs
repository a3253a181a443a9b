use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::notification;
use crate::error::DbResult;
use crate::model::notification::{NewNotification, Notification};

/// ## Summary
/// Lists notifications scheduled on or before `now`, newest first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list(
    conn: &mut DbConnection<'_>,
    hdid: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> DbResult<Vec<Notification>> {
    Ok(notification::table
        .filter(notification::hdid.eq(hdid))
        .filter(notification::scheduled_at.le(now))
        .order(notification::scheduled_at.desc())
        .select(Notification::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Inserts a notification and returns it.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewNotification<'_>,
) -> DbResult<Notification> {
    Ok(diesel::insert_into(notification::table)
        .values(row)
        .returning(Notification::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Deletes a notification. Scoped to the owning profile.
///
/// ## Errors
/// Returns an error if the delete fails.
pub async fn remove(conn: &mut DbConnection<'_>, id: uuid::Uuid, hdid: &str) -> DbResult<usize> {
    Ok(diesel::delete(
        notification::table
            .find(id)
            .filter(notification::hdid.eq(hdid)),
    )
    .execute(conn)
    .await?)
}

/// ## Summary
/// Marks a notification as read.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn mark_read(conn: &mut DbConnection<'_>, id: uuid::Uuid, hdid: &str) -> DbResult<usize> {
    Ok(diesel::update(
        notification::table
            .find(id)
            .filter(notification::hdid.eq(hdid)),
    )
    .set(notification::read_at.eq(chrono::Utc::now()))
    .execute(conn)
    .await?)
}
