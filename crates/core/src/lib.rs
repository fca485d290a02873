pub mod config;
pub mod errors;

pub use crate::config::models::{
    ApiConfig, AppConfig, ConsumerConfig, DatabaseConfig, DeliveryConfig, MessageQueueConfig,
    MessageQueueType, SmtpConfig, TransportType,
};
pub use errors::{CourierError, CourierResult};
