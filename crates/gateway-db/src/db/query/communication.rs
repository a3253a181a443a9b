use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::enums::{CommunicationStatus, CommunicationType};
use crate::db::schema::communication;
use crate::error::DbResult;
use crate::model::communication::Communication;

/// ## Summary
/// Finds the published communication of the given type whose effective
/// window contains `now`. When several overlap, the most recently created
/// wins.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn active(
    conn: &mut DbConnection<'_>,
    communication_type: CommunicationType,
    now: chrono::DateTime<chrono::Utc>,
) -> DbResult<Option<Communication>> {
    Ok(communication::table
        .filter(communication::communication_type.eq(communication_type))
        .filter(communication::communication_status.eq(CommunicationStatus::Published))
        .filter(communication::effective_at.le(now))
        .filter(communication::expires_at.gt(now))
        .order(communication::created_at.desc())
        .select(Communication::as_select())
        .first::<Communication>(conn)
        .await
        .optional()?)
}
