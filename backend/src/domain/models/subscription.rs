//! Domain model for a recurring subscription.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct DomainSubscription {
    pub id: i64,
    /// Owner; fixed at creation
    pub user_id: i64,
    pub name: String,
    pub cost: Decimal,
    pub next_payment_date: NaiveDate,
    pub category: Category,
}

impl DomainSubscription {
    /// True when the payment date lies before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.next_payment_date < today
    }
}
