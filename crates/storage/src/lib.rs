//! Storage Layer
//!
//! Provides Postgres persistence with repository pattern, plus an in-memory
//! repository used by tests and local tooling.

mod memory;
mod models;
mod postgres;
mod repository;

pub use memory::MemoryRepository;
pub use models::{
    Account, AccountChanges, MaintenanceStatus, Mileage, NewAccount, NewMileage, NewPart,
    NewVehicle, Part, PartChanges, UnknownStatus, Vehicle, VehicleChanges,
};
pub use postgres::PgRepository;
pub use repository::{AccountStore, MileageStore, PartStore, Repository, VehicleStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Migration error: {0}")]
    MigrationError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StorageError::Conflict(db.message().to_string())
            }
            _ => StorageError::DatabaseError(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationError(err.to_string())
    }
}
