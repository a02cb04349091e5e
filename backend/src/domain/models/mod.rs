pub mod subscription;
pub mod user;

pub use subscription::DomainSubscription;
pub use user::DomainUser;
