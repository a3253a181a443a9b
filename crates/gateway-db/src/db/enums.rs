//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

/// Communication placement.
///
/// Maps to `communication.communication_type` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum CommunicationType {
    Banner,
    InApp,
    Mobile,
}

impl ToSql<Text, Pg> for CommunicationType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Banner => "banner",
            Self::InApp => "in_app",
            Self::Mobile => "mobile",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CommunicationType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"banner" => Ok(Self::Banner),
            b"in_app" => Ok(Self::InApp),
            b"mobile" => Ok(Self::Mobile),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl fmt::Display for CommunicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Banner => "banner",
            Self::InApp => "in_app",
            Self::Mobile => "mobile",
        };
        f.write_str(s)
    }
}

/// Publication state for a communication.
///
/// Maps to `communication.communication_status` CHECK constraint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum CommunicationStatus {
    New,
    Draft,
    Published,
}

impl ToSql<Text, Pg> for CommunicationStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::New => "new",
            Self::Draft => "draft",
            Self::Published => "published",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CommunicationStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"new" => Ok(Self::New),
            b"draft" => Ok(Self::Draft),
            b"published" => Ok(Self::Published),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

/// Outbox state for queued emails.
///
/// Maps to `email.status` CHECK constraint. Delivery is handled by an
/// external worker that drains `new` rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
pub enum EmailStatus {
    New,
    Processed,
    Failed,
}

impl ToSql<Text, Pg> for EmailStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::New => "new",
            Self::Processed => "processed",
            Self::Failed => "failed",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for EmailStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"new" => Ok(Self::New),
            b"processed" => Ok(Self::Processed),
            b"failed" => Ok(Self::Failed),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn communication_type_display_matches_storage() {
        assert_eq!(CommunicationType::Banner.to_string(), "banner");
        assert_eq!(CommunicationType::InApp.to_string(), "in_app");
    }
}
