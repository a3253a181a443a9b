use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::resource_delegate;
use crate::error::DbResult;
use crate::model::resource_delegate::{NewResourceDelegate, ResourceDelegate};

/// ## Summary
/// Checks whether a delegation relationship exists between the resource
/// owner and the delegate. Rows with a past expiry date do not count.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn exists(
    conn: &mut DbConnection<'_>,
    resource_owner_hdid: &str,
    profile_hdid: &str,
) -> DbResult<bool> {
    let today = chrono::Utc::now().date_naive();
    Ok(diesel::select(diesel::dsl::exists(
        resource_delegate::table
            .filter(resource_delegate::resource_owner_hdid.eq(resource_owner_hdid))
            .filter(resource_delegate::profile_hdid.eq(profile_hdid))
            .filter(
                resource_delegate::expiry_date
                    .is_null()
                    .or(resource_delegate::expiry_date.ge(today)),
            ),
    ))
    .get_result::<bool>(conn)
    .await?)
}

/// ## Summary
/// Inserts a delegation relationship.
///
/// ## Errors
/// Returns an error if the insert fails (including duplicate pair).
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewResourceDelegate<'_>,
) -> DbResult<ResourceDelegate> {
    Ok(diesel::insert_into(resource_delegate::table)
        .values(row)
        .returning(ResourceDelegate::as_select())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Lists relationships where the given profile acts as delegate.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn list_for_delegate(
    conn: &mut DbConnection<'_>,
    profile_hdid: &str,
    reason_code: Option<&str>,
) -> DbResult<Vec<ResourceDelegate>> {
    let mut query = resource_delegate::table
        .filter(resource_delegate::profile_hdid.eq(profile_hdid))
        .into_boxed();
    if let Some(reason) = reason_code {
        query = query.filter(resource_delegate::reason_code.eq(reason));
    }
    Ok(query
        .order(resource_delegate::created_at.asc())
        .select(ResourceDelegate::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Removes a delegation relationship. Returns the number of rows removed.
///
/// ## Errors
/// Returns an error if the delete fails.
pub async fn remove(
    conn: &mut DbConnection<'_>,
    resource_owner_hdid: &str,
    profile_hdid: &str,
) -> DbResult<usize> {
    Ok(diesel::delete(
        resource_delegate::table
            .filter(resource_delegate::resource_owner_hdid.eq(resource_owner_hdid))
            .filter(resource_delegate::profile_hdid.eq(profile_hdid)),
    )
    .execute(conn)
    .await?)
}
