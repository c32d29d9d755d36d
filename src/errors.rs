use thiserror::Error;

use crate::decimal::Money;
use crate::storage::StorageError;
use crate::types::{FacilityLimitId, UserId};

/// coarse classification of a financing failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Forbidden,
    LimitExceeded,
    PersistenceFailure,
}

#[derive(Error, Debug)]
pub enum FinancingError {
    #[error("amount must be greater than 0")]
    NonPositiveAmount {
        amount: Money,
    },

    #[error("invalid tenor")]
    InvalidTenor {
        tenor: i64,
    },

    #[error("invalid start_date format")]
    InvalidStartDate {
        value: String,
    },

    #[error("no tenor available")]
    NoTenorAvailable,

    #[error("no financing facilities yet")]
    FacilityLimitNotFound {
        facility_limit_id: FacilityLimitId,
    },

    #[error("facility limit does not belong to user")]
    FacilityLimitForbidden {
        facility_limit_id: FacilityLimitId,
        owner: UserId,
        requested_by: UserId,
    },

    #[error("insufficient facility limit")]
    InsufficientFacilityLimit {
        ceiling: Money,
        requested: Money,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl FinancingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinancingError::NonPositiveAmount { .. }
            | FinancingError::InvalidTenor { .. }
            | FinancingError::InvalidStartDate { .. }
            | FinancingError::CalculationError { .. }
            | FinancingError::InvalidConfiguration { .. } => ErrorKind::InvalidInput,
            FinancingError::NoTenorAvailable | FinancingError::FacilityLimitNotFound { .. } => {
                ErrorKind::NotFound
            }
            FinancingError::FacilityLimitForbidden { .. } => ErrorKind::Forbidden,
            FinancingError::InsufficientFacilityLimit { .. } => ErrorKind::LimitExceeded,
            FinancingError::Storage(_) => ErrorKind::PersistenceFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, FinancingError>;
