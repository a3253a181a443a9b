use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A pending or claimed delegation invitation.
///
/// `profile_hdid` stays `NULL` until a delegate redeems the invite. Only the
/// Argon2 hash of the sharing code is stored.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::delegation)]
#[diesel(check_for_backend(Pg))]
pub struct Delegation {
    pub id: uuid::Uuid,
    pub resource_owner_hdid: String,
    pub resource_owner_identifier: String,
    pub nickname: String,
    pub profile_hdid: Option<String>,
    pub expiry_date: chrono::NaiveDate,
    pub sharing_code_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Delegation {
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.profile_hdid.is_some()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::delegation)]
pub struct NewDelegation<'a> {
    pub id: uuid::Uuid,
    pub resource_owner_hdid: &'a str,
    pub resource_owner_identifier: &'a str,
    pub nickname: &'a str,
    pub expiry_date: chrono::NaiveDate,
    pub sharing_code_hash: &'a str,
}
