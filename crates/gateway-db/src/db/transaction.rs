//! Transaction helper utilities for database operations.
//!
//! ## Usage
//!
//! Diesel-async provides built-in transaction support through the `AsyncConnection::transaction` method.
//! To use transactions, wrap your database operations in a closure:
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//! use crate::db::transaction::with_transaction;
//!
//! with_transaction(conn, |conn| async move {
//!     delegation::insert(conn, &row).await?;
//!     email::queue(conn, &invite).await?;
//!     Ok(())
//! }.scope_boxed()).await?;
//! ```

use diesel_async::{AsyncConnection, scoped_futures::ScopedBoxFuture};

use crate::db::connection::DbConnection;

/// ## Summary
/// Runs a database transaction and returns the closure result. The error
/// type is the caller's, as long as it can absorb a rollback failure.
///
/// ## Errors
/// Returns any error produced by the closure, or errors raised while starting
/// or committing the transaction.
pub async fn with_transaction<'conn, 'pool: 'conn, T, E, F>(
    conn: &'conn mut DbConnection<'pool>,
    callback: F,
) -> Result<T, E>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'pool>) -> ScopedBoxFuture<'conn, 'r, Result<T, E>>
        + Send
        + 'conn,
    T: Send + 'conn,
    E: From<diesel::result::Error> + Send + 'conn,
{
    conn.transaction::<_, E, _>(callback).await
}
