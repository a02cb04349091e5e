//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs from the `shared`
//! crate to these internal types.

use crate::domain::errors::ServiceError;

/// Selects a user or a subscription by id or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    ById(i64),
    ByName(String),
}

impl Lookup {
    /// Build a lookup from optional parts. The id wins when both are given.
    pub fn from_parts(id: Option<i64>, name: Option<String>) -> Result<Self, ServiceError> {
        match (id, name) {
            (Some(id), _) => Ok(Lookup::ById(id)),
            (None, Some(name)) => Ok(Lookup::ByName(name)),
            (None, None) => Err(ServiceError::MissingIdentifier),
        }
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::ById(id) => write!(f, "id={}", id),
            Lookup::ByName(name) => write!(f, "name={}", name),
        }
    }
}

pub mod user {
    /// Input for fetching a user. Exactly one of `user_id` and `name` is
    /// expected; the id wins when both are set.
    #[derive(Debug, Clone, Default)]
    pub struct GetUserQuery {
        pub user_id: Option<i64>,
        pub name: Option<String>,
        /// Roll every overdue subscription of the user forward before returning
        pub refresh_schedule: bool,
    }
}

pub mod subscription {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::Category;

    /// Input for creating a new subscription.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateSubscriptionCommand {
        pub name: String,
        pub cost: Decimal,
        pub next_payment_date: NaiveDate,
        pub category: Category,
    }

    /// Result of an amount query.
    #[derive(Debug, Clone, PartialEq)]
    pub struct AmountResult {
        pub month_count: u32,
        pub amount: Decimal,
    }
}
