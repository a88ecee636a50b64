//! Backend-neutral classification of database failures.

use sea_orm::{DbErr, RuntimeErr, SqlErr};

/// Returns true if the given SQLSTATE code represents a unique constraint violation
/// across the supported backends (Postgres 23505, SQLite 2067 / 1555 for primary keys).
pub fn is_unique_violation_code(code: &str) -> bool {
    matches!(code, "23505" | "2067" | "1555")
}

pub fn is_sqlx_unique_violation(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code()
        .map(|c| is_unique_violation_code(c.as_ref()))
        .unwrap_or(false)
}

/// Driver message of a unique violation, if `err` is one.
///
/// The message names the violated index (Postgres) or its columns (SQLite);
/// callers match on it to tell constraints apart.
pub fn unique_violation_message(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => match err {
            DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
            | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
                if is_sqlx_unique_violation(db.as_ref()) =>
            {
                Some(db.message().to_string())
            }
            _ => None,
        },
    }
}

/// True when the failure is about reaching the database rather than the statement.
pub fn is_connectivity_error(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
        || matches!(
            err,
            DbErr::Exec(RuntimeErr::SqlxError(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            )) | DbErr::Query(RuntimeErr::SqlxError(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ))
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_codes_cover_supported_backends() {
        assert!(is_unique_violation_code("23505"));
        assert!(is_unique_violation_code("2067"));
        assert!(!is_unique_violation_code("23503"));
        assert!(!is_unique_violation_code(""));
    }

    #[test]
    fn plain_errors_are_not_unique_violations() {
        let err = DbErr::Custom("boom".into());
        assert!(unique_violation_message(&err).is_none());
        assert!(!is_connectivity_error(&err));
    }

    #[test]
    fn connection_errors_are_connectivity() {
        let err = DbErr::Conn(RuntimeErr::Internal("refused".into()));
        assert!(is_connectivity_error(&err));
    }
}
