use crate::decimal::{Money, Rate};
use crate::errors::{FinancingError, Result};
use crate::types::{InstallmentQuote, Tenor};

/// flat-margin installment calculator
///
/// The margin accrues on the full principal for the whole tenor and the
/// resulting total is split into equal monthly installments:
///
/// ```text
/// total_margin        = principal * margin_rate * tenor_months / 12
/// total_payment       = principal + total_margin
/// monthly_installment = total_payment / tenor_months
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentCalculator {
    margin_rate: Rate,
}

impl InstallmentCalculator {
    pub fn new(margin_rate: Rate) -> Self {
        Self { margin_rate }
    }

    pub fn margin_rate(&self) -> Rate {
        self.margin_rate
    }

    /// compute installment figures for one tenor
    pub fn calculate(&self, principal: Money, tenor_months: u32) -> Result<InstallmentQuote> {
        if tenor_months == 0 {
            return Err(FinancingError::CalculationError {
                message: "tenor must be greater than 0 months".to_string(),
            });
        }

        let overflow = || FinancingError::CalculationError {
            message: format!("amount {principal} is too large to finance over {tenor_months} months"),
        };

        let total_margin = principal
            .apply_rate_for_months(self.margin_rate, tenor_months)
            .ok_or_else(overflow)?;
        let total_payment = principal.checked_add(total_margin).ok_or_else(overflow)?;
        let monthly_installment = total_payment.checked_div(tenor_months).ok_or_else(overflow)?;

        Ok(InstallmentQuote {
            tenor_months,
            monthly_installment,
            total_margin,
            total_payment,
        })
    }

    /// compute installment figures for every tenor in a catalog
    pub fn quote_all(&self, principal: Money, tenors: &[Tenor]) -> Result<Vec<InstallmentQuote>> {
        tenors
            .iter()
            .map(|tenor| self.calculate(principal, tenor.duration_months))
            .collect()
    }
}
