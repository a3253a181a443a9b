use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::user_feedback;
use crate::error::DbResult;
use crate::model::user_feedback::{NewUserFeedback, UserFeedback};

/// ## Summary
/// Inserts a feedback row and returns it.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewUserFeedback<'_>,
) -> DbResult<UserFeedback> {
    Ok(diesel::insert_into(user_feedback::table)
        .values(row)
        .returning(UserFeedback::as_select())
        .get_result(conn)
        .await?)
}
