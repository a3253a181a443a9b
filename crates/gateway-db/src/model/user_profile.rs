use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::user_profile)]
#[diesel(primary_key(hdid))]
#[diesel(check_for_backend(Pg))]
pub struct UserProfile {
    pub hdid: String,
    pub email: Option<String>,
    pub sms_number: Option<String>,
    /// Base64 key used to encrypt this profile's comments and notes.
    pub encryption_key: Option<String>,
    pub accepted_terms_version: Option<String>,
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::user_profile)]
pub struct NewUserProfile<'a> {
    pub hdid: &'a str,
    pub email: Option<&'a str>,
    pub sms_number: Option<&'a str>,
    pub encryption_key: Option<&'a str>,
    pub accepted_terms_version: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::user_profile_history)]
#[diesel(check_for_backend(Pg))]
pub struct UserProfileHistory {
    pub id: uuid::Uuid,
    pub hdid: String,
    pub operation_code: String,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::user_profile_history)]
pub struct NewUserProfileHistory<'a> {
    pub id: uuid::Uuid,
    pub hdid: &'a str,
    pub operation_code: &'a str,
}
