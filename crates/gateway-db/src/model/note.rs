use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// A private journal note. `title` and `text` hold ciphertext (base64).
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::note)]
#[diesel(check_for_backend(Pg))]
pub struct Note {
    pub id: uuid::Uuid,
    pub hdid: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub journal_date: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::note)]
pub struct NewNote<'a> {
    pub id: uuid::Uuid,
    pub hdid: &'a str,
    pub title: Option<&'a str>,
    pub text: Option<&'a str>,
    pub journal_date: chrono::NaiveDate,
}
