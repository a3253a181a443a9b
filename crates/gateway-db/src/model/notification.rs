use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::notification)]
#[diesel(check_for_backend(Pg))]
pub struct Notification {
    pub id: uuid::Uuid,
    pub hdid: String,
    pub content: String,
    pub category: String,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::notification)]
pub struct NewNotification<'a> {
    pub id: uuid::Uuid,
    pub hdid: &'a str,
    pub content: &'a str,
    pub category: &'a str,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
}
