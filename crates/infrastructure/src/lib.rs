pub mod database;
pub mod in_memory_queue;
pub mod mailer;
pub mod message_queue;

pub use database::postgres::{PostgresContactRepository, PostgresMessageRepository};
pub use database::sqlite::{SqliteContactRepository, SqliteMessageRepository};
pub use database::{DatabasePool, DatabaseType};
pub use in_memory_queue::InMemoryMessageQueue;
pub use mailer::SmtpMailer;
pub use message_queue::RabbitMqMessageQueue;
