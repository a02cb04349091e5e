use crate::domain::models::DomainUser;
use shared::User;

/// Mapper between the shared User DTO and the domain user.
pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: DomainUser) -> User {
        User {
            id: domain.id,
            name: domain.name,
        }
    }
}
