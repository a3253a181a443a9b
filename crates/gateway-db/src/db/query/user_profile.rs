use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{user_profile, user_profile_history};
use crate::error::DbResult;
use crate::model::user_profile::{
    NewUserProfile, NewUserProfileHistory, UserProfile, UserProfileHistory,
};

/// ## Summary
/// Finds a profile by hdid.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn find(conn: &mut DbConnection<'_>, hdid: &str) -> DbResult<Option<UserProfile>> {
    Ok(user_profile::table
        .find(hdid)
        .select(UserProfile::as_select())
        .first::<UserProfile>(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Inserts a new profile and returns the stored row.
///
/// ## Errors
/// Returns an error if the insert fails (including duplicate hdid).
pub async fn insert(
    conn: &mut DbConnection<'_>,
    profile: &NewUserProfile<'_>,
) -> DbResult<UserProfile> {
    Ok(diesel::insert_into(user_profile::table)
        .values(profile)
        .returning(UserProfile::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Marks a profile as closed. Returns the number of rows touched.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn close(conn: &mut DbConnection<'_>, hdid: &str) -> DbResult<usize> {
    Ok(diesel::update(user_profile::table.find(hdid))
        .set((
            user_profile::closed_at.eq(chrono::Utc::now()),
            user_profile::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)
        .await?)
}

/// ## Summary
/// Clears a profile's closed timestamp.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn recover(conn: &mut DbConnection<'_>, hdid: &str) -> DbResult<usize> {
    Ok(diesel::update(user_profile::table.find(hdid))
        .set((
            user_profile::closed_at.eq(None::<chrono::DateTime<chrono::Utc>>),
            user_profile::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)
        .await?)
}

/// ## Summary
/// Stores the profile's encryption key. Keys are write-once; the service
/// layer refuses to overwrite an existing key.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn set_encryption_key(
    conn: &mut DbConnection<'_>,
    hdid: &str,
    key: &str,
) -> DbResult<usize> {
    Ok(diesel::update(user_profile::table.find(hdid))
        .filter(user_profile::encryption_key.is_null())
        .set(user_profile::encryption_key.eq(key))
        .execute(conn)
        .await?)
}

/// ## Summary
/// Updates the last-login timestamp.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn touch_login(conn: &mut DbConnection<'_>, hdid: &str) -> DbResult<usize> {
    Ok(diesel::update(user_profile::table.find(hdid))
        .set(user_profile::last_login_at.eq(chrono::Utc::now()))
        .execute(conn)
        .await?)
}

/// ## Summary
/// Appends a history record for a profile operation.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn record_history(
    conn: &mut DbConnection<'_>,
    entry: &NewUserProfileHistory<'_>,
) -> DbResult<usize> {
    Ok(diesel::insert_into(user_profile_history::table)
        .values(entry)
        .execute(conn)
        .await?)
}

/// ## Summary
/// Returns the most recent history records, newest first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn recent_history(
    conn: &mut DbConnection<'_>,
    hdid: &str,
    limit: i64,
) -> DbResult<Vec<UserProfileHistory>> {
    Ok(user_profile_history::table
        .filter(user_profile_history::hdid.eq(hdid))
        .order(user_profile_history::recorded_at.desc())
        .limit(limit)
        .select(UserProfileHistory::as_select())
        .load(conn)
        .await?)
}
