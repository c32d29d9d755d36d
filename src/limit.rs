use tracing::debug;

use crate::decimal::Money;
use crate::errors::{FinancingError, Result};
use crate::storage::FacilityLimitRepository;
use crate::types::{FacilityLimitId, UserId};

/// check a requested amount against the user's pre-approved ceiling
///
/// An amount equal to the ceiling is accepted. Read failures surface as
/// storage errors rather than as a missing limit.
pub fn check_facility_limit<C>(
    repo: &dyn FacilityLimitRepository<C>,
    conn: &mut C,
    user_id: UserId,
    facility_limit_id: FacilityLimitId,
    requested: Money,
) -> Result<()> {
    let limit = repo
        .get_by_id(conn, facility_limit_id)?
        .ok_or(FinancingError::FacilityLimitNotFound { facility_limit_id })?;

    if limit.user_id != user_id {
        return Err(FinancingError::FacilityLimitForbidden {
            facility_limit_id,
            owner: limit.user_id,
            requested_by: user_id,
        });
    }

    if limit.ceiling_amount < requested {
        return Err(FinancingError::InsufficientFacilityLimit {
            ceiling: limit.ceiling_amount,
            requested,
        });
    }

    debug!(facility_limit_id, user_id, %requested, ceiling = %limit.ceiling_amount, "facility limit check passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::storage::{StorageError, StorageResult};
    use crate::types::FacilityLimit;

    struct StubLimits(Vec<FacilityLimit>);

    impl FacilityLimitRepository<()> for StubLimits {
        fn get_by_id(&self, _conn: &mut (), id: FacilityLimitId) -> StorageResult<Option<FacilityLimit>> {
            Ok(self.0.iter().find(|l| l.id == id).copied())
        }
    }

    struct BrokenLimits;

    impl FacilityLimitRepository<()> for BrokenLimits {
        fn get_by_id(&self, _conn: &mut (), _id: FacilityLimitId) -> StorageResult<Option<FacilityLimit>> {
            Err(StorageError::Read {
                message: "connection reset".to_string(),
            })
        }
    }

    fn limits() -> StubLimits {
        StubLimits(vec![FacilityLimit {
            id: 10,
            user_id: 1,
            ceiling_amount: Money::from_major(15_000_000),
        }])
    }

    #[test]
    fn test_amount_within_ceiling_passes() {
        let repo = limits();
        assert!(check_facility_limit(&repo, &mut (), 1, 10, Money::from_major(12_000_000)).is_ok());
    }

    #[test]
    fn test_amount_equal_to_ceiling_passes() {
        let repo = limits();
        assert!(check_facility_limit(&repo, &mut (), 1, 10, Money::from_major(15_000_000)).is_ok());
    }

    #[test]
    fn test_amount_above_ceiling_is_rejected() {
        let repo = limits();
        let err = check_facility_limit(&repo, &mut (), 1, 10, Money::from_major(20_000_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(err.to_string(), "insufficient facility limit");
    }

    #[test]
    fn test_missing_limit_is_not_found() {
        let repo = limits();
        let err = check_facility_limit(&repo, &mut (), 1, 11, Money::from_major(1_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "no financing facilities yet");
    }

    #[test]
    fn test_foreign_limit_is_forbidden() {
        let repo = limits();
        let err = check_facility_limit(&repo, &mut (), 2, 10, Money::from_major(1_000)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "facility limit does not belong to user");
    }

    #[test]
    fn test_ownership_is_checked_before_ceiling() {
        let repo = limits();
        let err = check_facility_limit(&repo, &mut (), 2, 10, Money::from_major(99_000_000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_read_failure_is_persistence_failure() {
        let err = check_facility_limit(&BrokenLimits, &mut (), 1, 10, Money::from_major(1_000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }
}
