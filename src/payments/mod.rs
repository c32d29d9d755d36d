pub mod installment;
pub mod schedule;

pub use installment::InstallmentCalculator;
