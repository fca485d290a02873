use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info};

use courier_core::{CourierError, CourierResult};
use courier_domain::messaging::{DeliveryJob, MessageQueue, QueuedDelivery};

/// 内存消息队列实现
///
/// 使用 Tokio channels 实现的进程内队列，适用于嵌入式部署和测试。
/// 取出而未确认的任务记录在 pending 表中，nack 时可重新入队，
/// 以此模拟broker的 at-least-once 语义。
#[derive(Debug)]
pub struct InMemoryMessageQueue {
    /// 队列存储：队列名 -> (发送端, 接收端)
    queues: Arc<RwLock<HashMap<String, QueueChannels>>>,
    /// 已取出未确认的任务：投递标签 -> (队列名, 任务)
    pending: Arc<Mutex<HashMap<u64, (String, DeliveryJob)>>>,
    next_delivery_tag: AtomicU64,
}

#[derive(Debug)]
struct QueueChannels {
    sender: mpsc::UnboundedSender<DeliveryJob>,
    /// 使用 Arc 包装接收端，支持多个消费者
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<DeliveryJob>>>,
    /// 队列大小统计
    size: Arc<AtomicU32>,
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        info!("Creating in-memory message queue");
        Self {
            queues: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_delivery_tag: AtomicU64::new(1),
        }
    }

    async fn ensure_queue(&self, queue: &str) {
        {
            let queues = self.queues.read().await;
            if queues.contains_key(queue) {
                return;
            }
        }

        let mut queues = self.queues.write().await;
        queues.entry(queue.to_string()).or_insert_with(|| {
            debug!("创建内存队列: {}", queue);
            let (sender, receiver) = mpsc::unbounded_channel();
            QueueChannels {
                sender,
                receiver: Arc::new(Mutex::new(receiver)),
                size: Arc::new(AtomicU32::new(0)),
            }
        });
    }

    async fn push(&self, queue: &str, job: DeliveryJob) -> CourierResult<()> {
        self.ensure_queue(queue).await;
        let queues = self.queues.read().await;
        let channels = queues
            .get(queue)
            .ok_or_else(|| CourierError::MessageQueue(format!("队列 {queue} 不存在")))?;

        channels
            .sender
            .send(job)
            .map_err(|e| CourierError::MessageQueue(format!("发布任务到队列 {queue} 失败: {e}")))?;
        channels.size.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn publish_job(&self, queue: &str, job: &DeliveryJob) -> CourierResult<()> {
        self.push(queue, job.clone()).await?;
        debug!("投递任务已发布到队列: {}", queue);
        Ok(())
    }

    async fn consume_job(&self, queue: &str) -> CourierResult<Option<QueuedDelivery>> {
        self.ensure_queue(queue).await;
        let (receiver, size) = {
            let queues = self.queues.read().await;
            let channels = queues
                .get(queue)
                .ok_or_else(|| CourierError::MessageQueue(format!("队列 {queue} 不存在")))?;
            (channels.receiver.clone(), channels.size.clone())
        };

        let mut receiver = receiver.lock().await;
        match receiver.try_recv() {
            Ok(job) => {
                size.fetch_sub(1, Ordering::SeqCst);
                let delivery_tag = self.next_delivery_tag.fetch_add(1, Ordering::SeqCst);
                self.pending
                    .lock()
                    .await
                    .insert(delivery_tag, (queue.to_string(), job.clone()));
                Ok(Some(QueuedDelivery { job, delivery_tag }))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(e) => Err(CourierError::MessageQueue(format!(
                "从队列 {queue} 获取任务失败: {e}"
            ))),
        }
    }

    async fn ack(&self, _queue: &str, delivery_tag: u64) -> CourierResult<()> {
        self.pending.lock().await.remove(&delivery_tag);
        debug!("确认任务: {}", delivery_tag);
        Ok(())
    }

    async fn nack(&self, _queue: &str, delivery_tag: u64, requeue: bool) -> CourierResult<()> {
        let removed = self.pending.lock().await.remove(&delivery_tag);
        if requeue {
            if let Some((queue, job)) = removed {
                self.push(&queue, job).await?;
            }
        }
        debug!("拒绝任务: {}, 重新入队: {}", delivery_tag, requeue);
        Ok(())
    }

    async fn queue_size(&self, queue: &str) -> CourierResult<u32> {
        let queues = self.queues.read().await;
        Ok(queues
            .get(queue)
            .map(|channels| channels.size.load(Ordering::SeqCst))
            .unwrap_or(0))
    }

    async fn purge(&self, queue: &str) -> CourierResult<()> {
        let queues = self.queues.read().await;
        if let Some(channels) = queues.get(queue) {
            let mut receiver = channels.receiver.lock().await;
            while receiver.try_recv().is_ok() {
                channels.size.fetch_sub(1, Ordering::SeqCst);
            }
        }
        debug!("队列 {} 已清空", queue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(key: &str) -> DeliveryJob {
        DeliveryJob {
            contact_id: 1,
            to: "kurt@example.com".to_string(),
            sender: "demo@courier.dev".to_string(),
            subject: "Hi".to_string(),
            body: None,
            idempotency_key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_then_consume() {
        let queue = InMemoryMessageQueue::new();
        queue.publish_job("email_delivery", &sample_job("k1")).await.unwrap();

        assert_eq!(queue.queue_size("email_delivery").await.unwrap(), 1);

        let delivery = queue.consume_job("email_delivery").await.unwrap().unwrap();
        assert_eq!(delivery.job.idempotency_key, "k1");
        assert_eq!(queue.queue_size("email_delivery").await.unwrap(), 0);

        queue.ack("email_delivery", delivery.delivery_tag).await.unwrap();
        assert!(queue.consume_job("email_delivery").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_empty_queue_returns_none() {
        let queue = InMemoryMessageQueue::new();
        assert!(queue.consume_job("email_delivery").await.unwrap().is_none());
        assert_eq!(queue.queue_size("email_delivery").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_nack_requeues_job() {
        let queue = InMemoryMessageQueue::new();
        queue.publish_job("email_delivery", &sample_job("k1")).await.unwrap();

        let delivery = queue.consume_job("email_delivery").await.unwrap().unwrap();
        queue
            .nack("email_delivery", delivery.delivery_tag, true)
            .await
            .unwrap();

        let redelivered = queue.consume_job("email_delivery").await.unwrap().unwrap();
        assert_eq!(redelivered.job.idempotency_key, "k1");
        assert_ne!(redelivered.delivery_tag, delivery.delivery_tag);
    }

    #[tokio::test]
    async fn test_nack_without_requeue_drops_job() {
        let queue = InMemoryMessageQueue::new();
        queue.publish_job("email_delivery", &sample_job("k1")).await.unwrap();

        let delivery = queue.consume_job("email_delivery").await.unwrap().unwrap();
        queue
            .nack("email_delivery", delivery.delivery_tag, false)
            .await
            .unwrap();

        assert!(queue.consume_job("email_delivery").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_empties_queue() {
        let queue = InMemoryMessageQueue::new();
        queue.publish_job("email_delivery", &sample_job("k1")).await.unwrap();
        queue.publish_job("email_delivery", &sample_job("k2")).await.unwrap();

        queue.purge("email_delivery").await.unwrap();
        assert_eq!(queue.queue_size("email_delivery").await.unwrap(), 0);
        assert!(queue.consume_job("email_delivery").await.unwrap().is_none());
    }
}
