use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_core::CourierResult;

use crate::entities::{Contact, EmailMessage, NotificationRequest};

/// Interface for message queue operations
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 发布任务到指定队列，成功返回即表示broker已确认落盘
    async fn publish_job(&self, queue: &str, job: &DeliveryJob) -> CourierResult<()>;
    /// 取出至多一个待处理任务
    async fn consume_job(&self, queue: &str) -> CourierResult<Option<QueuedDelivery>>;
    /// 确认任务处理完成
    async fn ack(&self, queue: &str, delivery_tag: u64) -> CourierResult<()>;
    /// 拒绝任务并选择是否重新入队
    async fn nack(&self, queue: &str, delivery_tag: u64, requeue: bool) -> CourierResult<()>;
    async fn queue_size(&self, queue: &str) -> CourierResult<u32>;
    async fn purge(&self, queue: &str) -> CourierResult<()>;
}

/// 队列投递任务载荷
///
/// 携带消费者重建完整邮件所需的全部字段：收件地址在入队前已经
/// 解析完成，消费者不再访问联系人注册表。幂等键随载荷传递，
/// broker 的 at-least-once 重复投递因此至多落库一次。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryJob {
    pub contact_id: i64,
    pub to: String,
    pub sender: String,
    pub subject: String,
    pub body: Option<String>,
    pub idempotency_key: String,
}

impl DeliveryJob {
    /// 由请求和已解析的联系人构造任务
    ///
    /// 请求未携带幂等键时在入队时刻生成一个，保证同一次入队的
    /// 重复投递共享同一个键。
    pub fn new(request: &NotificationRequest, contact: &Contact, sender: &str) -> Self {
        let idempotency_key = request
            .idempotency_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            contact_id: request.contact_id,
            to: contact.email.clone(),
            sender: sender.to_string(),
            subject: request.subject.clone(),
            body: request.body.clone(),
            idempotency_key,
        }
    }

    /// 还原为待记录的邮件实体
    pub fn to_message(&self) -> EmailMessage {
        EmailMessage::new(
            self.to.clone(),
            self.sender.clone(),
            self.subject.clone(),
            self.body.clone(),
        )
        .with_idempotency_key(Some(self.idempotency_key.clone()))
    }

    pub fn serialize_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn deserialize_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// 从队列取出的一条投递，携带用于ack/nack的投递标签
#[derive(Debug, Clone)]
pub struct QueuedDelivery {
    pub job: DeliveryJob,
    pub delivery_tag: u64,
}
