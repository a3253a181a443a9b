use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::delegation;
use crate::error::DbResult;
use crate::model::delegation::{Delegation, NewDelegation};

/// ## Summary
/// Finds a delegation invitation by id.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn find(conn: &mut DbConnection<'_>, id: uuid::Uuid) -> DbResult<Option<Delegation>> {
    Ok(delegation::table
        .find(id)
        .select(Delegation::as_select())
        .first::<Delegation>(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Inserts a new invitation and returns the stored row.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(conn: &mut DbConnection<'_>, row: &NewDelegation<'_>) -> DbResult<Delegation> {
    Ok(diesel::insert_into(delegation::table)
        .values(row)
        .returning(Delegation::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Claims an invitation for a delegate profile.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn claim(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    profile_hdid: &str,
) -> DbResult<usize> {
    Ok(diesel::update(delegation::table.find(id))
        .set((
            delegation::profile_hdid.eq(profile_hdid),
            delegation::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)
        .await?)
}

/// ## Summary
/// Lists invitations created by a resource owner, newest first.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_for_owner(
    conn: &mut DbConnection<'_>,
    resource_owner_hdid: &str,
) -> DbResult<Vec<Delegation>> {
    Ok(delegation::table
        .filter(delegation::resource_owner_hdid.eq(resource_owner_hdid))
        .order(delegation::created_at.desc())
        .select(Delegation::as_select())
        .load(conn)
        .await?)
}
