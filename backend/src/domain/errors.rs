use thiserror::Error;

/// Failures surfaced by the user and subscription services.
///
/// Domain outcomes (not found / not unique) are legitimate business results.
/// `MissingIdentifier` means the caller broke the lookup contract. `Storage`
/// carries persistence failures unchanged.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User not found")]
    UserNotFound,
    #[error("The name should be unique")]
    UsernameNotUnique,
    #[error("Subscription not found")]
    SubscriptionNotFound,
    #[error("The subscription name should be unique")]
    SubNameNotUnique,
    #[error("User has no subscriptions")]
    UserHasNoSubscriptions,
    /// A spend total does not fit in a decimal
    #[error("The total amount is too large")]
    AmountOverflow,
    #[error("Either an id or a name must be provided")]
    MissingIdentifier,
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ServiceError {
    /// True for misuse of the service API rather than a business outcome
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ServiceError::MissingIdentifier)
    }

    /// True for not-found, not-unique and overflow outcomes
    pub fn is_domain_outcome(&self) -> bool {
        !matches!(self, ServiceError::MissingIdentifier | ServiceError::Storage(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let domain = [
            ServiceError::UserNotFound,
            ServiceError::UsernameNotUnique,
            ServiceError::SubscriptionNotFound,
            ServiceError::SubNameNotUnique,
            ServiceError::UserHasNoSubscriptions,
            ServiceError::AmountOverflow,
        ];
        for err in &domain {
            assert!(err.is_domain_outcome(), "{err:?} should be a domain outcome");
            assert!(!err.is_contract_violation());
        }

        assert!(ServiceError::MissingIdentifier.is_contract_violation());
        assert!(!ServiceError::MissingIdentifier.is_domain_outcome());

        let storage = ServiceError::from(sqlx::Error::RowNotFound);
        assert!(!storage.is_domain_outcome());
        assert!(!storage.is_contract_violation());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ServiceError::UserNotFound.to_string(), "User not found");
        assert_eq!(
            ServiceError::SubNameNotUnique.to_string(),
            "The subscription name should be unique"
        );
    }
}
