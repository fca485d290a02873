pub mod models;

pub use models::{
    ApiConfig, AppConfig, ConsumerConfig, DatabaseConfig, DeliveryConfig, MessageQueueConfig,
    MessageQueueType, SmtpConfig, TransportType,
};
