use chrono::{Datelike, Days, Months, NaiveDate};

use crate::decimal::Money;
use crate::errors::{FinancingError, Result};
use crate::types::ScheduleLine;

/// expand a tenor into monthly due dates
///
/// The first installment falls due one calendar month after `start_date` and
/// the last one `tenor_months` months after it. A start day that does not
/// exist in the target month rolls over into the following month, so Jan 31
/// plus one month is Mar 3 (Mar 2 in a leap year).
pub fn generate(
    start_date: NaiveDate,
    tenor_months: u32,
    monthly_installment: Money,
) -> Result<Vec<ScheduleLine>> {
    (1..=tenor_months)
        .map(|month| {
            let due_date = add_months(start_date, month)?;
            Ok(ScheduleLine {
                due_date,
                installment_amount: monthly_installment,
            })
        })
        .collect()
}

/// total of all installments in a schedule
pub fn total(lines: &[ScheduleLine]) -> Money {
    lines.iter().map(|line| line.installment_amount).sum()
}

/// add calendar months, carrying surplus days into the next month
fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .and_then(|first| first.checked_add_days(Days::new(u64::from(date.day() - 1))))
        .ok_or_else(|| FinancingError::CalculationError {
            message: format!("due date out of range: {date} + {months} months"),
        })
}
