use crate::domain::commands::subscription::{AmountResult, CreateSubscriptionCommand};
use crate::domain::models::DomainSubscription;
use shared::{AmountResponse, NewSubscription, Subscription};

/// Mapper to convert between shared subscription DTOs and domain types.
pub struct SubscriptionMapper;

impl SubscriptionMapper {
    /// Converts a request body into the domain create command.
    pub fn to_command(dto: NewSubscription) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            name: dto.name,
            cost: dto.cost,
            next_payment_date: dto.next_payment_date,
            category: dto.category,
        }
    }

    /// Converts a domain subscription to the wire shape. The owner is implied
    /// by the request and not repeated.
    pub fn to_dto(domain: DomainSubscription) -> Subscription {
        Subscription {
            id: domain.id,
            name: domain.name,
            cost: domain.cost,
            next_payment_date: domain.next_payment_date,
            category: domain.category,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainSubscription>) -> Vec<Subscription> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_amount_dto(domain: AmountResult) -> AmountResponse {
        AmountResponse {
            month_count: domain.month_count,
            amount: domain.amount,
        }
    }
}
