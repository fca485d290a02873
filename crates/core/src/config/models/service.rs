use serde::{Deserialize, Serialize};

/// 队列消费者配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    pub enabled: bool,
    pub poll_interval_ms: u64,
    /// 模拟投递耗时，仅用于演示和测试，默认为0
    pub delivery_delay_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: 500,
            delivery_delay_ms: 0,
        }
    }
}

impl ConsumerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enabled && self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("消费者轮询间隔必须大于0"));
        }
        Ok(())
    }
}

/// API服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub cors_enabled: bool,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
            cors_enabled: true,
            request_timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enabled && self.bind_address.is_empty() {
            return Err(anyhow::anyhow!("API监听地址不能为空"));
        }
        if self.enabled && !self.bind_address.contains(':') {
            return Err(anyhow::anyhow!("API监听地址必须包含端口: {}", self.bind_address));
        }
        Ok(())
    }
}
