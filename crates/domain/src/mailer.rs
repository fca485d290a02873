use async_trait::async_trait;

use courier_core::CourierResult;

use crate::entities::EmailMessage;

/// 邮件中继抽象
///
/// `send` 成功仅表示中继接受了消息，不保证最终送达收件人。
/// 连接失败、认证失败、中继拒收都以 `CourierError::Transport` 上抛。
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> CourierResult<()>;
}
