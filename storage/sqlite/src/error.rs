//! Mapping from engine errors to the public taxonomy

use strata_core::StoreError;

/// Maps a rusqlite error to the public error taxonomy. Constraint breaches
/// (unique, not-null, foreign-key, check) get their own kind; everything
/// else is wrapped as an engine error.
pub(crate) fn engine_error(error: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, message) = &error {
        if code.code == rusqlite::ErrorCode::ConstraintViolation {
            let reason = message.clone().unwrap_or_else(|| "constraint violated".to_string());
            return StoreError::ConstraintViolation(reason);
        }
    }
    StoreError::Engine(Box::new(error))
}
