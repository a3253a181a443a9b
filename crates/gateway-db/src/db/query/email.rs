use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::email;
use crate::error::DbResult;
use crate::model::email::{Email, NewEmail};

/// ## Summary
/// Queues an email in the outbox. An external worker drains `new` rows.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn queue(conn: &mut DbConnection<'_>, row: &NewEmail<'_>) -> DbResult<Email> {
    Ok(diesel::insert_into(email::table)
        .values(row)
        .returning(Email::as_select())
        .get_result(conn)
        .await?)
}
