use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::enums::{CommunicationStatus, CommunicationType};
use crate::db::schema;

/// A site-wide announcement with an effective window.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::communication)]
#[diesel(check_for_backend(Pg))]
pub struct Communication {
    pub id: uuid::Uuid,
    pub text: String,
    pub communication_type: CommunicationType,
    pub communication_status: CommunicationStatus,
    pub effective_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::communication)]
pub struct NewCommunication<'a> {
    pub id: uuid::Uuid,
    pub text: &'a str,
    pub communication_type: CommunicationType,
    pub communication_status: CommunicationStatus,
    pub effective_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}
