//! Field checks applied to request bodies before they reach the services.

use chrono::NaiveDate;
use shared::constants::{
    MAX_SUB_COST, MAX_SUB_NAME_LENGTH, MAX_USER_NAME_LENGTH, MIN_SUB_COST, MIN_SUB_NAME_LENGTH, MIN_USER_NAME_LENGTH,
};
use shared::{NewSubscription, NewUser};

use super::errors::ApiError;

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::Validation(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

pub fn validate_new_user(request: &NewUser) -> Result<(), ApiError> {
    check_length("name", &request.name, MIN_USER_NAME_LENGTH, MAX_USER_NAME_LENGTH)
}

/// A new subscription needs a bounded name, a cost within limits and a payment
/// date that is not before `today`.
pub fn validate_new_subscription(request: &NewSubscription, today: NaiveDate) -> Result<(), ApiError> {
    check_length("name", &request.name, MIN_SUB_NAME_LENGTH, MAX_SUB_NAME_LENGTH)?;

    if request.cost < MIN_SUB_COST || request.cost > MAX_SUB_COST {
        return Err(ApiError::Validation(format!(
            "cost must be between {} and {}",
            MIN_SUB_COST, MAX_SUB_COST
        )));
    }

    if request.next_payment_date < today {
        return Err(ApiError::Validation(
            "next_payment_date cannot be in the past".to_string(),
        ));
    }

    Ok(())
}
