use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::user_feedback)]
#[diesel(check_for_backend(Pg))]
pub struct UserFeedback {
    pub id: uuid::Uuid,
    pub user_profile_hdid: Option<String>,
    pub comment: String,
    pub is_satisfied: bool,
    pub is_reviewed: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::user_feedback)]
pub struct NewUserFeedback<'a> {
    pub id: uuid::Uuid,
    pub user_profile_hdid: Option<&'a str>,
    pub comment: &'a str,
    pub is_satisfied: bool,
}
