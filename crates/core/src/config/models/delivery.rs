use serde::{Deserialize, Serialize};

/// 投递通道类型
///
/// 进程级配置，启动时选定一次。`Smtp` 在请求内同步发送，
/// `Queue` 将投递任务写入消息队列，由独立消费者完成实际发送。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TransportType {
    Smtp,
    #[default]
    Queue,
}

/// Delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub transport: TransportType,
    pub sender: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            transport: TransportType::Queue,
            sender: "demo@courier.dev".to_string(),
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sender.is_empty() {
            return Err(anyhow::anyhow!("发件人地址不能为空"));
        }
        if !self.sender.contains('@') {
            return Err(anyhow::anyhow!("发件人地址格式无效: {}", self.sender));
        }
        Ok(())
    }
}

/// SMTP relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
    pub timeout_seconds: u64,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            use_tls: true,
            timeout_seconds: 30,
        }
    }
}

impl SmtpConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow::anyhow!("SMTP主机地址不能为空"));
        }
        if self.port == 0 {
            return Err(anyhow::anyhow!("SMTP端口必须大于0"));
        }
        if self.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("SMTP超时时间必须大于0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delivery_is_valid() {
        assert!(DeliveryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_sender_must_be_address() {
        let config = DeliveryConfig {
            sender: "not-an-address".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_type_deserializes_snake_case() {
        let config: DeliveryConfig = toml::from_str(
            r#"
            transport = "smtp"
            sender = "demo@courier.dev"
            "#,
        )
        .unwrap();
        assert_eq!(config.transport, TransportType::Smtp);
    }
}
