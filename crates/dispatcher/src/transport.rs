use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use courier_core::CourierResult;
use courier_domain::entities::{Contact, EmailMessage, NotificationRequest};
use courier_domain::mailer::Mailer;
use courier_domain::messaging::{DeliveryJob, MessageQueue};
use courier_domain::transport::{DeliveryAck, DeliveryTransport};

/// 同步SMTP投递通道
///
/// 在请求内通过邮件中继完成实际发送，调用方的请求时延
/// 与中继时延耦合。中继失败原样上抛，编排器不会落库。
pub struct SmtpDeliveryTransport {
    mailer: Arc<dyn Mailer>,
}

impl SmtpDeliveryTransport {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl DeliveryTransport for SmtpDeliveryTransport {
    async fn deliver(
        &self,
        message: &EmailMessage,
        _request: &NotificationRequest,
        _contact: &Contact,
    ) -> CourierResult<DeliveryAck> {
        self.mailer.send(message).await?;
        debug!("同步投递完成: 收件人 {}", message.to);
        Ok(DeliveryAck::Delivered)
    }
}

/// 队列投递通道
///
/// 把投递任务持久写入消息队列，broker确认后立即返回。
/// 回执只确认入队，实际发送与落库由独立消费者完成。
pub struct QueuedDeliveryTransport {
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
}

impl QueuedDeliveryTransport {
    pub fn new(queue: Arc<dyn MessageQueue>, queue_name: impl Into<String>) -> Self {
        Self {
            queue,
            queue_name: queue_name.into(),
        }
    }
}

#[async_trait]
impl DeliveryTransport for QueuedDeliveryTransport {
    async fn deliver(
        &self,
        message: &EmailMessage,
        request: &NotificationRequest,
        contact: &Contact,
    ) -> CourierResult<DeliveryAck> {
        let job = DeliveryJob::new(request, contact, &message.sender);
        self.queue.publish_job(&self.queue_name, &job).await?;
        debug!(
            "投递任务已入队: 收件人 {}, 幂等键 {}",
            job.to, job.idempotency_key
        );
        Ok(DeliveryAck::Enqueued)
    }
}
