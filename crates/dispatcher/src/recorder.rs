use std::sync::Arc;

use tracing::debug;

use courier_core::CourierResult;
use courier_domain::entities::EmailMessage;
use courier_domain::repositories::MessageRepository;

/// 投递记录器
///
/// "一次投递发生过"的唯一权威：查询引擎的结果正是这里的产出。
/// 携带幂等键的记录走 insert-if-absent，重复调用返回首次插入的
/// 记录；无键记录直接插入。
#[derive(Clone)]
pub struct DeliveryRecorder {
    messages: Arc<dyn MessageRepository>,
}

impl DeliveryRecorder {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn record(&self, message: &EmailMessage) -> CourierResult<EmailMessage> {
        let recorded = if message.idempotency_key.is_some() {
            self.messages.insert_idempotent(message).await?
        } else {
            self.messages.insert(message).await?
        };

        debug!("投递已记录: {}", recorded.entity_description());
        Ok(recorded)
    }
}
