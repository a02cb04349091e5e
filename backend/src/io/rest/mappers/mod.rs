pub mod subscription_mapper;
pub mod user_mapper;

pub use subscription_mapper::SubscriptionMapper;
pub use user_mapper::UserMapper;
