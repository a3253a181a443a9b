use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A user-granted delegation relationship.
///
/// `resource_owner_hdid` is the subject whose records are shared;
/// `profile_hdid` is the delegate permitted to act on them. Dependents are
/// stored as rows with `reason_code = "guardian"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::resource_delegate)]
#[diesel(primary_key(resource_owner_hdid, profile_hdid))]
#[diesel(check_for_backend(Pg))]
pub struct ResourceDelegate {
    pub resource_owner_hdid: String,
    pub profile_hdid: String,
    pub reason_code: String,
    pub expiry_date: Option<chrono::NaiveDate>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::resource_delegate)]
pub struct NewResourceDelegate<'a> {
    pub resource_owner_hdid: &'a str,
    pub profile_hdid: &'a str,
    pub reason_code: &'a str,
    pub expiry_date: Option<chrono::NaiveDate>,
}

pub const REASON_GUARDIAN: &str = "guardian";
pub const REASON_SHARING: &str = "sharing";
