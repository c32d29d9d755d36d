//! Transactional in-memory storage engine.
//!
//! Committed rows live behind one `RwLock`. A transaction handle stages its
//! inserts privately and applies them under a single write lock at commit,
//! so readers never observe part of a unit of work.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{debug, warn};

use super::{
    FacilityDetailRepository, FacilityLimitRepository, FacilityRepository, StorageError,
    StorageResult, TenorRepository, TransactionManager,
};
use crate::catalog;
use crate::decimal::Money;
use crate::types::{
    Facility, FacilityDetail, FacilityId, FacilityLimit, FacilityLimitId, NewFacility,
    NewFacilityDetail, Tenor, User, UserId,
};

#[derive(Debug, Default)]
struct Tables {
    tenors: BTreeMap<i64, Tenor>,
    users: BTreeMap<UserId, User>,
    facility_limits: BTreeMap<FacilityLimitId, FacilityLimit>,
    facilities: BTreeMap<FacilityId, Facility>,
    facility_details: BTreeMap<i64, FacilityDetail>,
}

/// inserts staged by an open transaction
#[derive(Debug, Default)]
struct Pending {
    facilities: Vec<Facility>,
    facility_details: Vec<FacilityDetail>,
}

impl Pending {
    fn len(&self) -> usize {
        self.facilities.len() + self.facility_details.len()
    }
}

struct Shared {
    tables: RwLock<Tables>,
    facility_seq: AtomicI64,
    facility_detail_seq: AtomicI64,
    time: Mutex<SafeTimeProvider>,
}

impl Shared {
    fn now(&self) -> StorageResult<DateTime<Utc>> {
        let time = self.time.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(time.now())
    }
}

/// in-memory store implementing every repository the financing core needs
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

/// unit-of-work handle for [`MemoryStore`]
///
/// Obtained either from [`TransactionManager::connection`], where writes are
/// applied immediately, or inside [`TransactionManager::with_transaction`],
/// where writes are staged until commit.
pub struct MemoryConn {
    shared: Arc<Shared>,
    pending: Option<Pending>,
}

impl MemoryStore {
    pub fn new(time: SafeTimeProvider) -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: RwLock::new(Tables::default()),
                facility_seq: AtomicI64::new(1),
                facility_detail_seq: AtomicI64::new(1),
                time: Mutex::new(time),
            }),
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(SafeTimeProvider::new(TimeSource::System))
    }

    /// store populated with the demo catalog, users and limits
    pub fn seeded(time: SafeTimeProvider) -> StorageResult<Self> {
        let store = Self::new(time);

        let tenors = catalog::standard_catalog();
        let tenor_count = tenors.len();
        for tenor in tenors {
            store.insert_tenor(tenor)?;
        }

        let users = [
            (1, "Budi Santoso", "081234567890", 10_000_000),
            (2, "Siti Aminah", "081987654321", 5_000_000),
            (3, "Andi Wijaya", "081223344556", 15_000_000),
        ];
        for (id, name, phone, ceiling) in users {
            store.insert_user(User {
                id,
                name: name.to_string(),
                phone: phone.to_string(),
            })?;
            store.insert_facility_limit(FacilityLimit {
                id,
                user_id: id,
                ceiling_amount: Money::from_major(ceiling),
            })?;
        }

        debug!(tenors = tenor_count, users = users.len(), "seeded memory store");
        Ok(store)
    }

    pub fn insert_tenor(&self, tenor: Tenor) -> StorageResult<()> {
        if tenor.duration_months == 0 {
            return Err(StorageError::ConstraintViolation {
                message: "tenor duration must be greater than 0".to_string(),
            });
        }
        self.write(|tables| {
            tables.tenors.insert(tenor.id, tenor);
            Ok(())
        })
    }

    pub fn insert_user(&self, user: User) -> StorageResult<()> {
        self.write(|tables| {
            tables.users.insert(user.id, user);
            Ok(())
        })
    }

    pub fn insert_facility_limit(&self, limit: FacilityLimit) -> StorageResult<()> {
        if limit.ceiling_amount.is_negative() {
            return Err(StorageError::ConstraintViolation {
                message: format!("facility limit {} has a negative ceiling", limit.id),
            });
        }
        self.write(|tables| {
            if !tables.users.contains_key(&limit.user_id) {
                return Err(StorageError::ForeignKeyViolation {
                    table: "facility_limits",
                    column: "user_id",
                    value: limit.user_id,
                });
            }
            tables.facility_limits.insert(limit.id, limit);
            Ok(())
        })
    }

    /// committed facilities, ordered by id
    pub fn facilities(&self) -> StorageResult<Vec<Facility>> {
        self.read(|tables| tables.facilities.values().cloned().collect())
    }

    pub fn facility(&self, id: FacilityId) -> StorageResult<Option<Facility>> {
        self.read(|tables| tables.facilities.get(&id).cloned())
    }

    /// committed schedule lines of one facility, ordered by due date
    pub fn facility_details(&self, facility_id: FacilityId) -> StorageResult<Vec<FacilityDetail>> {
        self.read(|tables| {
            let mut details: Vec<FacilityDetail> = tables
                .facility_details
                .values()
                .filter(|d| d.facility_id == facility_id)
                .cloned()
                .collect();
            details.sort_by_key(|d| (d.due_date, d.id));
            details
        })
    }

    pub fn facility_detail_count(&self) -> StorageResult<usize> {
        self.read(|tables| tables.facility_details.len())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StorageResult<T> {
        let tables = self.shared.tables.read().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StorageResult<T>) -> StorageResult<T> {
        let mut tables = self.shared.tables.write().map_err(|_| StorageError::Poisoned)?;
        f(&mut tables)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

impl MemoryConn {
    fn direct(shared: Arc<Shared>) -> Self {
        Self { shared, pending: None }
    }

    fn begin(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            pending: Some(Pending::default()),
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StorageResult<T> {
        let tables = self.shared.tables.read().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&tables))
    }

    fn facility_exists(&self, id: FacilityId) -> StorageResult<bool> {
        let staged = self
            .pending
            .as_ref()
            .is_some_and(|p| p.facilities.iter().any(|f| f.id == id));
        if staged {
            return Ok(true);
        }
        self.read(|tables| tables.facilities.contains_key(&id))
    }

    /// apply staged rows; returns how many were written
    fn commit(mut self) -> StorageResult<usize> {
        let Some(pending) = self.pending.take() else {
            return Ok(0);
        };
        let written = pending.len();

        let mut tables = self.shared.tables.write().map_err(|_| StorageError::Commit {
            message: "storage lock poisoned".to_string(),
        })?;
        for facility in pending.facilities {
            tables.facilities.insert(facility.id, facility);
        }
        for detail in pending.facility_details {
            tables.facility_details.insert(detail.id, detail);
        }
        Ok(written)
    }

    /// drop staged rows; returns how many were discarded
    fn rollback(mut self) -> usize {
        self.pending.take().map(|p| p.len()).unwrap_or(0)
    }
}

impl TenorRepository<MemoryConn> for MemoryStore {
    fn get_all(&self, conn: &mut MemoryConn) -> StorageResult<Vec<Tenor>> {
        let tenors: Vec<Tenor> = conn.read(|tables| tables.tenors.values().copied().collect())?;
        Ok(catalog::ordered(tenors))
    }
}

impl FacilityLimitRepository<MemoryConn> for MemoryStore {
    fn get_by_id(&self, conn: &mut MemoryConn, id: FacilityLimitId) -> StorageResult<Option<FacilityLimit>> {
        conn.read(|tables| tables.facility_limits.get(&id).copied())
    }
}

impl FacilityRepository<MemoryConn> for MemoryStore {
    fn create(&self, conn: &mut MemoryConn, new: &NewFacility) -> StorageResult<FacilityId> {
        let limit_exists = conn.read(|tables| tables.facility_limits.contains_key(&new.facility_limit_id))?;
        if !limit_exists {
            return Err(StorageError::ForeignKeyViolation {
                table: "facilities",
                column: "facility_limit_id",
                value: new.facility_limit_id,
            });
        }

        let facility = Facility {
            id: conn.shared.facility_seq.fetch_add(1, Ordering::Relaxed),
            user_id: new.user_id,
            facility_limit_id: new.facility_limit_id,
            principal_amount: new.principal_amount,
            tenor_months: new.tenor_months,
            start_date: new.start_date,
            monthly_installment: new.monthly_installment,
            total_margin: new.total_margin,
            total_payment: new.total_payment,
            created_at: conn.shared.now()?,
        };
        let id = facility.id;

        match conn.pending.as_mut() {
            Some(pending) => pending.facilities.push(facility),
            None => {
                let mut tables = conn.shared.tables.write().map_err(|_| StorageError::Poisoned)?;
                tables.facilities.insert(id, facility);
            }
        }
        Ok(id)
    }
}

impl FacilityDetailRepository<MemoryConn> for MemoryStore {
    fn bulk_create(&self, conn: &mut MemoryConn, details: &[NewFacilityDetail]) -> StorageResult<()> {
        // validate the whole batch before writing any of it
        for detail in details {
            if !conn.facility_exists(detail.facility_id)? {
                return Err(StorageError::ForeignKeyViolation {
                    table: "facility_details",
                    column: "facility_id",
                    value: detail.facility_id,
                });
            }
            if detail.installment_amount.is_negative() {
                return Err(StorageError::ConstraintViolation {
                    message: "installment amount must not be negative".to_string(),
                });
            }
        }

        let created_at = conn.shared.now()?;
        let rows: Vec<FacilityDetail> = details
            .iter()
            .map(|d| FacilityDetail {
                id: conn.shared.facility_detail_seq.fetch_add(1, Ordering::Relaxed),
                facility_id: d.facility_id,
                due_date: d.due_date,
                installment_amount: d.installment_amount,
                created_at,
            })
            .collect();

        match conn.pending.as_mut() {
            Some(pending) => pending.facility_details.extend(rows),
            None => {
                let mut tables = conn.shared.tables.write().map_err(|_| StorageError::Poisoned)?;
                tables.facility_details.extend(rows.into_iter().map(|d| (d.id, d)));
            }
        }
        Ok(())
    }
}

impl TransactionManager for MemoryStore {
    type Conn = MemoryConn;

    fn connection(&self) -> StorageResult<MemoryConn> {
        Ok(MemoryConn::direct(Arc::clone(&self.shared)))
    }

    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut MemoryConn) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut conn = MemoryConn::begin(Arc::clone(&self.shared));

        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut conn))) {
            Ok(Ok(value)) => {
                let written = conn.commit()?;
                debug!(rows = written, "transaction committed");
                Ok(value)
            }
            Ok(Err(err)) => {
                let discarded = conn.rollback();
                debug!(rows = discarded, "transaction rolled back");
                Err(err)
            }
            Err(payload) => {
                let discarded = conn.rollback();
                warn!(rows = discarded, "transaction rolled back after panic");
                panic::resume_unwind(payload)
            }
        }
    }
}
