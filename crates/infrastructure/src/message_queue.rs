use async_trait::async_trait;
use lapin::{
    options::*, publisher_confirm::Confirmation, types::FieldTable, BasicProperties, Channel,
    Connection, ConnectionProperties, Queue,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use courier_core::{CourierError, CourierResult, MessageQueueConfig};
use courier_domain::messaging::{DeliveryJob, MessageQueue, QueuedDelivery};

/// RabbitMQ消息队列实现
pub struct RabbitMqMessageQueue {
    connection: Connection,
    channel: Arc<Mutex<Channel>>,
    config: MessageQueueConfig,
}

impl RabbitMqMessageQueue {
    /// 创建新的RabbitMQ消息队列实例
    pub async fn new(config: MessageQueueConfig) -> CourierResult<Self> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(|e| CourierError::MessageQueue(format!("连接RabbitMQ失败: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| CourierError::MessageQueue(format!("创建通道失败: {e}")))?;

        // 开启publisher confirm，publish_job 在broker确认前不返回
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| CourierError::MessageQueue(format!("开启发布确认失败: {e}")))?;

        info!("成功连接到RabbitMQ: {}", config.url);

        let queue = Self {
            connection,
            channel: Arc::new(Mutex::new(channel)),
            config,
        };

        queue.initialize_queues().await?;

        Ok(queue)
    }

    /// 初始化投递队列
    async fn initialize_queues(&self) -> CourierResult<()> {
        let channel = self.channel.lock().await;
        self.declare_queue(&channel, &self.config.delivery_queue, true)
            .await?;
        info!("队列初始化完成: {}", self.config.delivery_queue);
        Ok(())
    }

    /// 声明队列
    async fn declare_queue(
        &self,
        channel: &Channel,
        queue_name: &str,
        durable: bool,
    ) -> CourierResult<Queue> {
        let queue = channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    durable,
                    exclusive: false,
                    auto_delete: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| CourierError::MessageQueue(format!("声明队列 {queue_name} 失败: {e}")))?;

        debug!("队列 {} 声明成功", queue_name);
        Ok(queue)
    }

    fn serialize_job(&self, job: &DeliveryJob) -> CourierResult<Vec<u8>> {
        job.serialize_bytes()
            .map_err(|e| CourierError::Serialization(format!("序列化投递任务失败: {e}")))
    }

    fn deserialize_job(&self, data: &[u8]) -> CourierResult<DeliveryJob> {
        DeliveryJob::deserialize_bytes(data)
            .map_err(|e| CourierError::Serialization(format!("反序列化投递任务失败: {e}")))
    }

    /// 获取连接状态
    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    /// 关闭连接
    pub async fn close(&self) -> CourierResult<()> {
        self.connection
            .close(200, "正常关闭")
            .await
            .map_err(|e| CourierError::MessageQueue(format!("关闭连接失败: {e}")))?;

        info!("RabbitMQ连接已关闭");
        Ok(())
    }
}

#[async_trait]
impl MessageQueue for RabbitMqMessageQueue {
    /// 发布投递任务，等待broker确认落盘后才返回
    async fn publish_job(&self, queue: &str, job: &DeliveryJob) -> CourierResult<()> {
        let channel = self.channel.lock().await;
        let payload = self.serialize_job(job)?;

        let confirm = channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_delivery_mode(2), // 2 = persistent
            )
            .await
            .map_err(|e| CourierError::MessageQueue(format!("发布任务到队列 {queue} 失败: {e}")))?;

        let confirmation = confirm
            .await
            .map_err(|e| CourierError::MessageQueue(format!("任务发布确认失败: {e}")))?;

        if let Confirmation::Nack(_) = confirmation {
            return Err(CourierError::MessageQueue(format!(
                "broker拒绝队列 {queue} 的任务"
            )));
        }

        debug!("投递任务已发布到队列: {}", queue);
        Ok(())
    }

    /// 从指定队列取出至多一个任务，不自动确认
    async fn consume_job(&self, queue: &str) -> CourierResult<Option<QueuedDelivery>> {
        let channel = self.channel.lock().await;

        let get_result = channel.basic_get(queue, BasicGetOptions::default()).await;

        match get_result {
            Ok(Some(delivery)) => {
                let job = self.deserialize_job(&delivery.data)?;
                Ok(Some(QueuedDelivery {
                    job,
                    delivery_tag: delivery.delivery_tag,
                }))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("NOT_FOUND") || error_msg.contains("404") {
                    // 队列不存在，返回空结果而不是错误
                    debug!("队列 {} 不存在，返回空结果", queue);
                    Ok(None)
                } else {
                    Err(CourierError::MessageQueue(format!(
                        "从队列 {queue} 获取任务失败: {e}"
                    )))
                }
            }
        }
    }

    /// 确认任务处理完成
    async fn ack(&self, _queue: &str, delivery_tag: u64) -> CourierResult<()> {
        let channel = self.channel.lock().await;
        channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| CourierError::MessageQueue(format!("确认任务失败: {e}")))?;

        debug!("确认任务: {}", delivery_tag);
        Ok(())
    }

    /// 拒绝任务并选择是否重新入队
    async fn nack(&self, _queue: &str, delivery_tag: u64, requeue: bool) -> CourierResult<()> {
        let channel = self.channel.lock().await;
        channel
            .basic_nack(
                delivery_tag,
                BasicNackOptions {
                    requeue,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| CourierError::MessageQueue(format!("拒绝任务失败: {e}")))?;

        debug!("拒绝任务: {}, 重新入队: {}", delivery_tag, requeue);
        Ok(())
    }

    /// 获取队列中的任务数量
    async fn queue_size(&self, queue: &str) -> CourierResult<u32> {
        let channel = self.channel.lock().await;
        let queue_info = channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    passive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await;

        match queue_info {
            Ok(info) => Ok(info.message_count()),
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("NOT_FOUND") || error_msg.contains("404") {
                    debug!("队列 {} 不存在，返回大小为0", queue);
                    Ok(0)
                } else {
                    Err(CourierError::MessageQueue(format!(
                        "获取队列 {queue} 信息失败: {e}"
                    )))
                }
            }
        }
    }

    /// 清空队列
    async fn purge(&self, queue: &str) -> CourierResult<()> {
        let channel = self.channel.lock().await;
        channel
            .queue_purge(queue, QueuePurgeOptions::default())
            .await
            .map_err(|e| CourierError::MessageQueue(format!("清空队列 {queue} 失败: {e}")))?;

        debug!("队列 {} 已清空", queue);
        Ok(())
    }
}
