//! Persistence seam for the financing core.
//!
//! Every repository operation takes the unit-of-work handle explicitly. The
//! handle is either the top-level connection from
//! [`TransactionManager::connection`] or the open transaction passed into the
//! closure of [`TransactionManager::with_transaction`].

pub mod memory;

use thiserror::Error;

use crate::types::{FacilityId, FacilityLimit, FacilityLimitId, NewFacility, NewFacilityDetail, Tenor};

pub use memory::{MemoryConn, MemoryStore};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("failed to begin transaction: {message}")]
    Begin {
        message: String,
    },

    #[error("failed to commit transaction: {message}")]
    Commit {
        message: String,
    },

    #[error("{message}")]
    Write {
        message: String,
    },

    #[error("{message}")]
    Read {
        message: String,
    },

    #[error("foreign key violation: {table}.{column} = {value}")]
    ForeignKeyViolation {
        table: &'static str,
        column: &'static str,
        value: i64,
    },

    #[error("constraint violation: {message}")]
    ConstraintViolation {
        message: String,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// reader for the tenor catalog table
pub trait TenorRepository<C>: Send + Sync {
    fn get_all(&self, conn: &mut C) -> StorageResult<Vec<Tenor>>;
}

/// reader for pre-approved facility limits
pub trait FacilityLimitRepository<C>: Send + Sync {
    fn get_by_id(&self, conn: &mut C, id: FacilityLimitId) -> StorageResult<Option<FacilityLimit>>;
}

/// writer for granted facilities
pub trait FacilityRepository<C>: Send + Sync {
    /// insert a facility and return its generated id
    fn create(&self, conn: &mut C, facility: &NewFacility) -> StorageResult<FacilityId>;
}

/// bulk writer for facility schedule lines
pub trait FacilityDetailRepository<C>: Send + Sync {
    fn bulk_create(&self, conn: &mut C, details: &[NewFacilityDetail]) -> StorageResult<()>;
}

/// runs work under one atomic scope
pub trait TransactionManager: Send + Sync {
    type Conn;

    /// top-level handle outside any transaction
    fn connection(&self) -> StorageResult<Self::Conn>;

    /// run `f` inside a transaction
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. A panic
    /// inside `f` rolls back before the panic is resumed.
    fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self::Conn) -> std::result::Result<T, E>,
        E: From<StorageError>;
}
