//! Diesel and pool error mapping into [`DirectoryError`].
//!
//! Postgres reports a missing table or column as an ordinary database error.
//! Diesel does not expose the SQLSTATE, so classification relies on the
//! server message through [`detect_schema_variance`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::detect_schema_variance;
use crate::domain::ports::DirectoryError;

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> DirectoryError {
    DirectoryError::connection(error.into_message())
}

/// Map Diesel failures, classifying schema variance by message.
pub(crate) fn map_diesel_error(error: DieselError) -> DirectoryError {
    match error {
        DieselError::DatabaseError(kind, info) => {
            let message = info.message();
            debug!(?kind, message, "diesel operation failed");
            if let Some(variance) = detect_schema_variance(None, message) {
                return DirectoryError::from_variance(variance, message);
            }
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    DirectoryError::connection("database connection error")
                }
                _ => DirectoryError::query("database error"),
            }
        }
        DieselError::NotFound => DirectoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => DirectoryError::query("database query error"),
        other => {
            debug!(
                error_type = %std::any::type_name_of_val(&other),
                "diesel operation failed"
            );
            DirectoryError::query("database error")
        }
    }
}
