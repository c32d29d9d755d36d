//! Financing orchestration: quoting every tenor and committing a facility
//! together with its installment schedule.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::catalog::{self, TenorPolicy};
use crate::config::FinancingConfig;
use crate::decimal::Money;
use crate::errors::{FinancingError, Result};
use crate::limit::check_facility_limit;
use crate::payments::{schedule, InstallmentCalculator};
use crate::storage::{
    FacilityDetailRepository, FacilityLimitRepository, FacilityRepository, MemoryStore,
    TenorRepository, TransactionManager,
};
use crate::types::{
    FacilityId, FacilityLimitId, InstallmentQuote, NewFacility, NewFacilityDetail, ScheduleLine,
    UserId,
};

/// submission for a new facility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancingRequest {
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub amount: Money,
    pub tenor: i64,
    pub start_date: String,
}

/// committed facility as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancingReceipt {
    pub facility_id: FacilityId,
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub amount: Money,
    pub tenor_months: u32,
    pub start_date: NaiveDate,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
    pub schedule: Vec<ScheduleLine>,
}

/// orchestrates quoting and submission against the storage collaborators
pub struct FinancingService<M: TransactionManager> {
    tenor_repo: Arc<dyn TenorRepository<M::Conn>>,
    facility_limit_repo: Arc<dyn FacilityLimitRepository<M::Conn>>,
    facility_repo: Arc<dyn FacilityRepository<M::Conn>>,
    facility_detail_repo: Arc<dyn FacilityDetailRepository<M::Conn>>,
    tx_manager: M,
    calculator: InstallmentCalculator,
    tenors: TenorPolicy,
    start_date_format: String,
}

/// parameter object for creating a new FinancingService
pub struct NewFinancingService<M: TransactionManager> {
    pub tenor_repo: Arc<dyn TenorRepository<M::Conn>>,
    pub facility_limit_repo: Arc<dyn FacilityLimitRepository<M::Conn>>,
    pub facility_repo: Arc<dyn FacilityRepository<M::Conn>>,
    pub facility_detail_repo: Arc<dyn FacilityDetailRepository<M::Conn>>,
    pub tx_manager: M,
    pub config: FinancingConfig,
}

impl<M: TransactionManager> FinancingService<M> {
    pub fn new(v: NewFinancingService<M>) -> Self {
        Self {
            tenor_repo: v.tenor_repo,
            facility_limit_repo: v.facility_limit_repo,
            facility_repo: v.facility_repo,
            facility_detail_repo: v.facility_detail_repo,
            tx_manager: v.tx_manager,
            calculator: v.config.calculator(),
            tenors: v.config.allowed_tenors,
            start_date_format: v.config.start_date_format,
        }
    }

    pub fn calculator(&self) -> &InstallmentCalculator {
        &self.calculator
    }

    /// quote an amount against every tenor in the catalog
    ///
    /// Read-only; results are ordered by ascending tenor.
    pub fn calculate_all_tenors(&self, amount: Money) -> Result<Vec<InstallmentQuote>> {
        if !amount.is_positive() {
            return Err(FinancingError::NonPositiveAmount { amount });
        }

        let mut conn = self.tx_manager.connection()?;
        let tenors = catalog::ordered(self.tenor_repo.get_all(&mut conn)?);
        if tenors.is_empty() {
            return Err(FinancingError::NoTenorAvailable);
        }

        self.calculator.quote_all(amount, &tenors)
    }

    /// validate a submission and commit the facility with its schedule
    ///
    /// Ends either rejected, with nothing written, or committed with one
    /// facility row and one detail row per tenor month.
    pub fn submit_financing(&self, request: &FinancingRequest) -> Result<FinancingReceipt> {
        let outcome = self.try_submit(request);
        match &outcome {
            Ok(receipt) => info!(
                facility_id = receipt.facility_id,
                user_id = receipt.user_id,
                facility_limit_id = receipt.facility_limit_id,
                amount = %receipt.amount,
                tenor = receipt.tenor_months,
                scheduled = %schedule::total(&receipt.schedule),
                "financing committed"
            ),
            Err(err) => warn!(
                user_id = request.user_id,
                facility_limit_id = request.facility_limit_id,
                kind = ?err.kind(),
                error = %err,
                "financing rejected"
            ),
        }
        outcome
    }

    fn try_submit(&self, request: &FinancingRequest) -> Result<FinancingReceipt> {
        if !request.amount.is_positive() {
            return Err(FinancingError::NonPositiveAmount { amount: request.amount });
        }
        let tenor_months = self.tenors.check(request.tenor)?;
        let start_date = NaiveDate::parse_from_str(&request.start_date, &self.start_date_format)
            .map_err(|_| FinancingError::InvalidStartDate {
                value: request.start_date.clone(),
            })?;

        let mut conn = self.tx_manager.connection()?;
        check_facility_limit(
            self.facility_limit_repo.as_ref(),
            &mut conn,
            request.user_id,
            request.facility_limit_id,
            request.amount,
        )?;

        let quote = self.calculator.calculate(request.amount, tenor_months)?;
        let new_facility = NewFacility {
            user_id: request.user_id,
            facility_limit_id: request.facility_limit_id,
            principal_amount: request.amount,
            tenor_months,
            start_date,
            monthly_installment: quote.monthly_installment,
            total_margin: quote.total_margin,
            total_payment: quote.total_payment,
        };

        let (facility_id, lines) = self.tx_manager.with_transaction(|tx| -> Result<_> {
            let facility_id = self.facility_repo.create(tx, &new_facility)?;

            let lines = schedule::generate(start_date, tenor_months, quote.monthly_installment)?;
            let details: Vec<NewFacilityDetail> = lines.iter().map(|line| line.into_detail(facility_id)).collect();
            self.facility_detail_repo.bulk_create(tx, &details)?;

            Ok((facility_id, lines))
        })?;

        Ok(FinancingReceipt {
            facility_id,
            user_id: request.user_id,
            facility_limit_id: request.facility_limit_id,
            amount: request.amount,
            tenor_months,
            start_date,
            monthly_installment: quote.monthly_installment,
            total_margin: quote.total_margin,
            total_payment: quote.total_payment,
            schedule: lines,
        })
    }
}

impl FinancingService<MemoryStore> {
    /// wire every collaborator to one in-memory store
    pub fn with_memory_store(store: MemoryStore, config: FinancingConfig) -> Self {
        let repo = Arc::new(store.clone());
        Self::new(NewFinancingService {
            tenor_repo: repo.clone(),
            facility_limit_repo: repo.clone(),
            facility_repo: repo.clone(),
            facility_detail_repo: repo,
            tx_manager: store,
            config,
        })
    }
}
