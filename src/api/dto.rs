use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::financing::{FinancingReceipt, FinancingRequest};
use crate::types::{FacilityLimitId, InstallmentQuote, ScheduleLine, UserId};

/// POST /calculate-installments request
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub amount: Money,
}

/// one row of the quote table
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculationResult {
    pub tenor: u32,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
}

impl From<InstallmentQuote> for CalculationResult {
    fn from(q: InstallmentQuote) -> Self {
        Self {
            tenor: q.tenor_months,
            monthly_installment: q.monthly_installment,
            total_margin: q.total_margin,
            total_payment: q.total_payment,
        }
    }
}

/// POST /calculate-installments response
#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub calculations: Vec<CalculationResult>,
}

/// POST /submit-financing request
#[derive(Debug, Deserialize)]
pub struct SubmitFinancingRequest {
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub amount: Money,
    pub tenor: i64,
    pub start_date: String,
}

impl From<SubmitFinancingRequest> for FinancingRequest {
    fn from(r: SubmitFinancingRequest) -> Self {
        Self {
            user_id: r.user_id,
            facility_limit_id: r.facility_limit_id,
            amount: r.amount,
            tenor: r.tenor,
            start_date: r.start_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub due_date: NaiveDate,
    pub installment_amount: Money,
}

impl From<ScheduleLine> for ScheduleItem {
    fn from(line: ScheduleLine) -> Self {
        Self {
            due_date: line.due_date,
            installment_amount: line.installment_amount,
        }
    }
}

/// POST /submit-financing response
///
/// `start_date` echoes the submitted text.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitFinancingResponse {
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub amount: Money,
    pub tenor: u32,
    pub start_date: String,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
    pub schedule: Vec<ScheduleItem>,
}

impl SubmitFinancingResponse {
    pub fn from_receipt(receipt: FinancingReceipt, start_date: String) -> Self {
        Self {
            user_id: receipt.user_id,
            facility_limit_id: receipt.facility_limit_id,
            amount: receipt.amount,
            tenor: receipt.tenor_months,
            start_date,
            monthly_installment: receipt.monthly_installment,
            total_margin: receipt.total_margin,
            total_payment: receipt.total_payment,
            schedule: receipt.schedule.into_iter().map(ScheduleItem::from).collect(),
        }
    }
}

/// GET /health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
