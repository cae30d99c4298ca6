use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Untracked entity: {0}")]
    UntrackedEntity(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Session already committed or disposed")]
    SessionClosed,

    #[error("ORM error")]
    OrmError(#[source] DbErr),
}

impl DataError {
    /// Returns the error a later commit must report when this error is raised
    /// while staging, or `None` when the failed call left the session clean.
    pub(crate) fn aborts_unit_of_work(&self) -> Option<DataError> {
        match self {
            DataError::ConstraintViolation(msg) => Some(DataError::ConstraintViolation(msg.clone())),
            DataError::ConcurrencyConflict(msg) => Some(DataError::ConcurrencyConflict(msg.clone())),
            DataError::Resource(msg) => Some(DataError::Resource(msg.clone())),
            DataError::OrmError(err) => Some(DataError::OrmError(DbErr::Custom(err.to_string()))),
            DataError::UntrackedEntity(_) | DataError::SessionClosed => None,
        }
    }
}

/// Classifies store errors into the data-layer taxonomy.
///
/// ```text
/// unique / foreign key violation        -> ConstraintViolation
/// SQLSTATE 40001 / 40P01 (postgres)      -> ConcurrencyConflict
/// connection / pool acquisition failure -> Resource
/// anything else                          -> OrmError
/// ```
impl From<DbErr> for DataError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return DataError::ConstraintViolation(msg);
            }
            _ => {}
        }

        if let Some(code) = sqlstate(&err) {
            if code == "40001" || code == "40P01" {
                return DataError::ConcurrencyConflict(err.to_string());
            }
        }

        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => DataError::Resource(err.to_string()),
            other => DataError::OrmError(other),
        }
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => {
            db.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

pub type DataResult<T> = Result<T, DataError>;
