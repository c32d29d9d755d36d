pub mod api;
pub mod catalog;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod financing;
pub mod limit;
pub mod payments;
pub mod storage;
pub mod types;

// re-export key types
pub use config::FinancingConfig;
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, FinancingError, Result};
pub use financing::{FinancingReceipt, FinancingRequest, FinancingService, NewFinancingService};
pub use payments::InstallmentCalculator;
pub use storage::{MemoryConn, MemoryStore, StorageError, TransactionManager};
pub use types::{
    Facility, FacilityDetail, FacilityId, FacilityLimit, FacilityLimitId, InstallmentQuote,
    ScheduleLine, Tenor, UserId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
