use serde::{Deserialize, Serialize};

use crate::errors::{FinancingError, Result};
use crate::types::Tenor;

/// tenors offered by the product, in months
pub const STANDARD_TENORS: [u32; 6] = [6, 12, 18, 24, 30, 36];

/// fixed set of tenors a submission may ask for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct TenorPolicy {
    allowed: Vec<u32>,
}

impl TenorPolicy {
    pub fn new(mut allowed: Vec<u32>) -> Result<Self> {
        if allowed.is_empty() {
            return Err(FinancingError::InvalidConfiguration {
                message: "allowed tenors must not be empty".to_string(),
            });
        }
        if allowed.contains(&0) {
            return Err(FinancingError::InvalidConfiguration {
                message: "allowed tenors must be greater than 0".to_string(),
            });
        }
        allowed.sort_unstable();
        allowed.dedup();
        Ok(Self { allowed })
    }

    pub fn standard() -> Self {
        Self {
            allowed: STANDARD_TENORS.to_vec(),
        }
    }

    /// validate a requested tenor, returning it as a month count
    pub fn check(&self, requested: i64) -> Result<u32> {
        u32::try_from(requested)
            .ok()
            .filter(|months| self.allowed.binary_search(months).is_ok())
            .ok_or(FinancingError::InvalidTenor { tenor: requested })
    }

    pub fn allowed(&self) -> &[u32] {
        &self.allowed
    }
}

impl Default for TenorPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<u32>> for TenorPolicy {
    type Error = FinancingError;

    fn try_from(allowed: Vec<u32>) -> Result<Self> {
        TenorPolicy::new(allowed)
    }
}

impl From<TenorPolicy> for Vec<u32> {
    fn from(policy: TenorPolicy) -> Self {
        policy.allowed
    }
}

/// order catalog rows by ascending duration
pub fn ordered(mut tenors: Vec<Tenor>) -> Vec<Tenor> {
    tenors.sort_by_key(|t| (t.duration_months, t.id));
    tenors
}

/// catalog rows for the standard tenors, ids starting at 1
pub fn standard_catalog() -> Vec<Tenor> {
    STANDARD_TENORS
        .iter()
        .zip(1..)
        .map(|(&duration_months, id)| Tenor { id, duration_months })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_policy_accepts_catalog_tenors() {
        let policy = TenorPolicy::standard();
        for tenor in STANDARD_TENORS {
            assert_eq!(policy.check(tenor as i64).unwrap(), tenor);
        }
    }

    #[test]
    fn test_policy_rejects_unknown_tenors() {
        let policy = TenorPolicy::standard();
        for tenor in [0, 1, 10, 13, 48, -6] {
            let err = policy.check(tenor).unwrap_err();
            assert_eq!(err.to_string(), "invalid tenor");
        }
    }

    #[test]
    fn test_policy_normalizes_and_validates() {
        let policy = TenorPolicy::new(vec![24, 6, 12, 6]).unwrap();
        assert_eq!(policy.allowed(), &[6, 12, 24]);

        assert!(TenorPolicy::new(vec![]).is_err());
        assert!(TenorPolicy::new(vec![0, 12]).is_err());
    }

    #[test]
    fn test_ordered_sorts_by_duration() {
        let tenors = vec![
            Tenor { id: 3, duration_months: 18 },
            Tenor { id: 1, duration_months: 6 },
            Tenor { id: 2, duration_months: 12 },
        ];
        let months: Vec<u32> = ordered(tenors).iter().map(|t| t.duration_months).collect();
        assert_eq!(months, vec![6, 12, 18]);
    }

    #[test]
    fn test_policy_deserializes_from_list() {
        let policy: TenorPolicy = serde_json::from_str("[12, 6]").unwrap();
        assert_eq!(policy.allowed(), &[6, 12]);
        assert!(serde_json::from_str::<TenorPolicy>("[]").is_err());
    }
}
