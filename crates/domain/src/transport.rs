use async_trait::async_trait;

use courier_core::CourierResult;

use crate::entities::{Contact, EmailMessage, NotificationRequest};

/// 投递确认：消息已离开本进程的直接责任范围
///
/// 编排器据此决定是否立即落库：`Delivered` 表示同步路径已完成
/// 实际发送，立刻记录；`Enqueued` 表示任务已持久入队，
/// 落库由独立消费者在实际发送后完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAck {
    Delivered,
    Enqueued,
}

/// 投递通道抽象
///
/// 进程启动时选定一个实现，之后所有派发共用，不做按请求查找。
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// 投递一封已组装的邮件
    ///
    /// 队列实现还需要原始请求和联系人来构造队列载荷，
    /// 因此契约同时携带三者。成功或失败对单次调用是原子的，
    /// 不存在"部分入队"状态。
    async fn deliver(
        &self,
        message: &EmailMessage,
        request: &NotificationRequest,
        contact: &Contact,
    ) -> CourierResult<DeliveryAck>;
}
