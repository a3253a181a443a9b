use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A comment attached to a timeline entry.
///
/// `text` holds ciphertext (base64) produced with the owning profile's
/// encryption key; the service layer is responsible for the round trip.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::comment)]
#[diesel(check_for_backend(Pg))]
pub struct Comment {
    pub id: uuid::Uuid,
    pub user_profile_hdid: String,
    pub entry_type_code: String,
    pub parent_entry_id: Option<String>,
    pub text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::comment)]
pub struct NewComment<'a> {
    pub id: uuid::Uuid,
    pub user_profile_hdid: &'a str,
    pub entry_type_code: &'a str,
    pub parent_entry_id: Option<&'a str>,
    pub text: Option<&'a str>,
}
