use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;

/// identifier of a tenor catalog row
pub type TenorId = i64;

/// identifier of a user
pub type UserId = i64;

/// identifier of a pre-approved facility limit
pub type FacilityLimitId = i64;

/// identifier of a granted facility
pub type FacilityId = i64;

/// identifier of a facility schedule line
pub type FacilityDetailId = i64;

/// allowable loan duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenor {
    pub id: TenorId,
    pub duration_months: u32,
}

/// borrower reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone: String,
}

/// pre-approved credit ceiling owned by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityLimit {
    pub id: FacilityLimitId,
    pub user_id: UserId,
    pub ceiling_amount: Money,
}

/// granted financing instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub principal_amount: Money,
    pub tenor_months: u32,
    pub start_date: NaiveDate,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
    pub created_at: DateTime<Utc>,
}

/// facility row before the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFacility {
    pub user_id: UserId,
    pub facility_limit_id: FacilityLimitId,
    pub principal_amount: Money,
    pub tenor_months: u32,
    pub start_date: NaiveDate,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
}

/// one scheduled installment line of a facility
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityDetail {
    pub id: FacilityDetailId,
    pub facility_id: FacilityId,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFacilityDetail {
    pub facility_id: FacilityId,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
}

/// installment figures for a principal over one tenor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentQuote {
    pub tenor_months: u32,
    pub monthly_installment: Money,
    pub total_margin: Money,
    pub total_payment: Money,
}

/// due date and amount of one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLine {
    pub due_date: NaiveDate,
    pub installment_amount: Money,
}

impl ScheduleLine {
    pub fn into_detail(self, facility_id: FacilityId) -> NewFacilityDetail {
        NewFacilityDetail {
            facility_id,
            due_date: self.due_date,
            installment_amount: self.installment_amount,
        }
    }
}
