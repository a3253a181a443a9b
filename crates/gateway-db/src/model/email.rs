use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::enums::EmailStatus;
use crate::db::schema;

/// An outbox row. Delivery is handled outside this service.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::email)]
#[diesel(check_for_backend(Pg))]
pub struct Email {
    pub id: uuid::Uuid,
    pub to_address: String,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    pub priority: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::email)]
pub struct NewEmail<'a> {
    pub id: uuid::Uuid,
    pub to_address: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub status: EmailStatus,
    pub priority: i32,
}
