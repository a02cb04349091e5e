//! Payment-date rollover.
//!
//! A subscription's `next_payment_date` should never sit in the past. Two
//! passes keep it there:
//!
//! - the **bulk pass** (`refresh_schedule`) walks every subscription of a user
//!   and advances each overdue date one month at a time until it reaches today;
//! - the **single step** (`step_subscription`) advances one looked-up
//!   subscription by at most one month, even if it stays overdue.
//!
//! Month arithmetic keeps the day of month where it exists and clamps to the
//! last day of the target month otherwise (Jan 31 -> Feb 28/29). Each step
//! starts from the previous result, so a date clamped to the 28th stays on the
//! 28th afterwards.

use chrono::{Months, NaiveDate};
use tracing::{debug, info};

use crate::domain::models::DomainSubscription;
use crate::storage::traits::{StorageResult, SubscriptionStorage};

/// Advance a date by one calendar month, clamping to the end of the month.
/// None only past the last representable date.
pub fn add_one_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

/// Advance `date` month by month until it is not before `today`.
///
/// Runs at most once per overdue month (plus one); stops early at the
/// calendar's upper bound.
pub fn roll_forward(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let mut next = date;
    while next < today {
        match add_one_month(next) {
            Some(advanced) => next = advanced,
            None => break,
        }
    }
    next
}

/// Advance `date` by a single month if it is before `today`.
pub fn roll_forward_once(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    if date < today {
        add_one_month(date).unwrap_or(date)
    } else {
        date
    }
}

/// Bulk pass: roll every overdue subscription of `user_id` forward to `today`
/// and persist the changed rows through `store`.
///
/// Returns the number of subscriptions whose date changed.
pub async fn refresh_schedule<S>(store: &mut S, user_id: i64, today: NaiveDate) -> StorageResult<usize>
where
    S: SubscriptionStorage + ?Sized,
{
    let subscriptions = store.list_subscriptions(user_id).await?;

    let mut changed = 0;
    for subscription in subscriptions.iter().filter(|s| s.is_overdue(today)) {
        let next = roll_forward(subscription.next_payment_date, today);
        if next != subscription.next_payment_date {
            debug!(
                "Rolling subscription {} from {} to {}",
                subscription.id, subscription.next_payment_date, next
            );
            store.update_next_payment_date(subscription.id, next).await?;
            changed += 1;
        }
    }

    if changed > 0 {
        info!("Rolled {} subscription(s) forward for user {}", changed, user_id);
    }
    Ok(changed)
}

/// Single step: advance one subscription by at most one month and persist it.
pub async fn step_subscription<S>(
    store: &mut S,
    mut subscription: DomainSubscription,
    today: NaiveDate,
) -> StorageResult<DomainSubscription>
where
    S: SubscriptionStorage + ?Sized,
{
    let next = roll_forward_once(subscription.next_payment_date, today);
    if next != subscription.next_payment_date {
        store.update_next_payment_date(subscription.id, next).await?;
        subscription.next_payment_date = next;
    }
    Ok(subscription)
}
