use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    database::DatabaseConfig,
    delivery::{DeliveryConfig, SmtpConfig},
    message_queue::MessageQueueConfig,
    service::{ApiConfig, ConsumerConfig},
};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub message_queue: MessageQueueConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: COURIER_)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            // 尝试默认配置文件路径
            let default_paths = [
                "config/courier.toml",
                "courier.toml",
                "/etc/courier/config.toml",
            ];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // 环境变量覆盖，如 COURIER_DATABASE_URL
        builder = builder.add_source(
            Environment::with_prefix("COURIER")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder.build().context("构建配置失败")?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<()> {
        self.database.validate().context("数据库配置无效")?;
        self.delivery.validate().context("投递配置无效")?;
        self.message_queue.validate().context("消息队列配置无效")?;
        self.smtp.validate().context("SMTP配置无效")?;
        self.consumer.validate().context("消费者配置无效")?;
        self.api.validate().context("API配置无效")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{MessageQueueType, TransportType};
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load(Some("/nonexistent/courier.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 5
            min_connections = 1
            connection_timeout_seconds = 10
            idle_timeout_seconds = 300

            [delivery]
            transport = "smtp"
            sender = "noreply@example.com"

            [message_queue]
            type = "in_memory"
            url = ""
            delivery_queue = "email_delivery"
            connection_timeout_seconds = 5
            "#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.delivery.transport, TransportType::Smtp);
        assert_eq!(config.delivery.sender, "noreply@example.com");
        assert_eq!(config.message_queue.r#type, MessageQueueType::InMemory);
    }

    #[test]
    fn test_invalid_section_rejected_on_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [delivery]
            transport = "queue"
            sender = ""
            "#
        )
        .unwrap();

        let result = AppConfig::load(Some(file.path().to_str().unwrap()));
        assert!(result.is_err());
    }
}
