use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Limits and defaults shared by the API and its clients.
pub mod constants {
    use rust_decimal::Decimal;

    pub const MIN_USER_NAME_LENGTH: usize = 1;
    pub const MAX_USER_NAME_LENGTH: usize = 31;

    pub const MIN_SUB_NAME_LENGTH: usize = 1;
    pub const MAX_SUB_NAME_LENGTH: usize = 63;

    /// Lowest accepted subscription cost
    pub const MIN_SUB_COST: Decimal = Decimal::ZERO;

    /// Highest accepted subscription cost (one billion); keeps every spend
    /// total far inside the decimal range
    pub const MAX_SUB_COST: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

    /// Smallest month count an amount response may report
    pub const MIN_MONTH_COUNT: u32 = 1;

    pub const MONTHS_PER_YEAR: u32 = 12;
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Request body for `POST /register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

/// A recurring subscription as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// Calendar date of the next payment (YYYY-MM-DD)
    pub next_payment_date: NaiveDate,
    pub category: Category,
}

/// Request body for `POST /subs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    pub next_payment_date: NaiveDate,
    #[serde(default)]
    pub category: Category,
}

/// Aggregate spend over `month_count` months
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountResponse {
    pub month_count: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Acknowledgement returned by delete endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Closed set of subscription categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Streaming,
    Music,
    Gaming,
    Software,
    Utilities,
    Education,
    Fitness,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Streaming,
        Category::Music,
        Category::Gaming,
        Category::Software,
        Category::Utilities,
        Category::Education,
        Category::Fitness,
        Category::Other,
    ];

    /// Stable storage / wire name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Streaming => "STREAMING",
            Category::Music => "MUSIC",
            Category::Gaming => "GAMING",
            Category::Software => "SOFTWARE",
            Category::Utilities => "UTILITIES",
            Category::Education => "EDUCATION",
            Category::Fitness => "FITNESS",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown subscription category: {}", self.0)
    }
}

impl std::error::Error for CategoryParseError {}
