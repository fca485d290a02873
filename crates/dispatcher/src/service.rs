use std::sync::Arc;

use tracing::{debug, instrument};

use courier_core::{CourierError, CourierResult};
use courier_domain::entities::{DeliveryReceipt, NotificationRequest};
use courier_domain::repositories::ContactRepository;
use courier_domain::transport::{DeliveryAck, DeliveryTransport};

use crate::composer::compose;
use crate::recorder::DeliveryRecorder;

/// 派发编排器
///
/// 单次尝试的固定流程：解析联系人 → 组装邮件 → 投递 → 落库。
/// 内部不做重试，失败原样上抛给调用方。
/// 同步通道在投递确认后立即落库；队列通道只确认入队，
/// 落库推迟到消费者实际发送之后。
pub struct DispatchService {
    contacts: Arc<dyn ContactRepository>,
    transport: Arc<dyn DeliveryTransport>,
    recorder: DeliveryRecorder,
    sender: String,
}

impl DispatchService {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        transport: Arc<dyn DeliveryTransport>,
        recorder: DeliveryRecorder,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            contacts,
            transport,
            recorder,
            sender: sender.into(),
        }
    }

    #[instrument(skip(self, request), fields(contact_id = %request.contact_id))]
    pub async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> CourierResult<DeliveryReceipt> {
        let contact = self
            .contacts
            .get_by_id(request.contact_id)
            .await?
            .ok_or(CourierError::ContactNotFound {
                id: request.contact_id,
            })?;

        let message = compose(request, &contact, &self.sender);

        let ack = self.transport.deliver(&message, request, &contact).await?;

        // 队列路径入队即返回，落库由消费者在实际发送后完成
        if ack == DeliveryAck::Delivered {
            self.recorder.record(&message).await?;
        }

        debug!("派发完成: 收件人 {}, 确认 {:?}", contact.email, ack);
        Ok(DeliveryReceipt {
            email: contact.email,
        })
    }
}
