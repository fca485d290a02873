pub mod app_config;
pub mod database;
pub mod delivery;
pub mod message_queue;
pub mod service;

pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use delivery::{DeliveryConfig, SmtpConfig, TransportType};
pub use message_queue::{MessageQueueConfig, MessageQueueType};
pub use service::{ApiConfig, ConsumerConfig};
