//! Domain model for a registered user.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainUser {
    pub id: i64,
    pub name: String,
}
