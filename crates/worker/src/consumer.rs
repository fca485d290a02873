use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info};

use courier_core::CourierResult;
use courier_dispatcher::DeliveryRecorder;
use courier_domain::mailer::Mailer;
use courier_domain::messaging::{MessageQueue, QueuedDelivery};

/// 队列投递消费者
///
/// 独立于请求路径运行：轮询队列，对每个任务完成实际发送并
/// 幂等落库，然后确认。处理失败的任务 nack 重新入队，
/// 由下一轮轮询重试。broker的 at-least-once 重复投递依靠
/// 任务携带的幂等键保证至多落库一次。
pub struct DeliveryConsumer {
    queue: Arc<dyn MessageQueue>,
    mailer: Arc<dyn Mailer>,
    recorder: DeliveryRecorder,
    queue_name: String,
    poll_interval: Duration,
    /// 模拟投递耗时，仅用于演示和测试
    delivery_delay: Duration,
}

impl DeliveryConsumer {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        mailer: Arc<dyn Mailer>,
        recorder: DeliveryRecorder,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            mailer,
            recorder,
            queue_name: queue_name.into(),
            poll_interval: Duration::from_millis(500),
            delivery_delay: Duration::ZERO,
        }
    }

    /// 设置轮询间隔
    pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval = Duration::from_millis(poll_interval_ms);
        self
    }

    /// 设置模拟投递耗时
    pub fn delivery_delay_ms(mut self, delivery_delay_ms: u64) -> Self {
        self.delivery_delay = Duration::from_millis(delivery_delay_ms);
        self
    }

    /// 运行消费循环，直到收到关闭信号
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> CourierResult<()> {
        info!("投递消费者启动: 队列 {}", self.queue_name);
        let mut poll = interval(self.poll_interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // 发送端被丢弃也视作关闭
                    if changed.is_err() || *shutdown.borrow() {
                        info!("投递消费者收到关闭信号");
                        break;
                    }
                }
                _ = poll.tick() => {
                    if let Err(e) = self.poll_once().await {
                        error!("轮询投递队列失败: {e}");
                    }
                }
            }
        }

        Ok(())
    }

    /// 处理当前队列中的所有任务，返回成功处理的数量
    pub async fn poll_once(&self) -> CourierResult<usize> {
        let mut processed = 0;

        while let Some(delivery) = self.queue.consume_job(&self.queue_name).await? {
            let tag = delivery.delivery_tag;
            match self.process_delivery(&delivery).await {
                Ok(()) => {
                    self.queue.ack(&self.queue_name, tag).await?;
                    processed += 1;
                }
                Err(e) => {
                    error!(
                        "处理投递任务失败 (幂等键 {}): {e}，重新入队",
                        delivery.job.idempotency_key
                    );
                    self.queue.nack(&self.queue_name, tag, true).await?;
                    // 留给下一轮重试，避免对同一失败任务空转
                    break;
                }
            }
        }

        if processed > 0 {
            debug!("本轮处理投递任务: {}", processed);
        }
        Ok(processed)
    }

    /// 发送并幂等落库一个任务
    async fn process_delivery(&self, delivery: &QueuedDelivery) -> CourierResult<()> {
        let message = delivery.job.to_message();

        if !self.delivery_delay.is_zero() {
            tokio::time::sleep(self.delivery_delay).await;
        }

        self.mailer.send(&message).await?;
        self.recorder.record(&message).await?;

        debug!(
            "队列投递完成: 收件人 {}, 幂等键 {}",
            message.to, delivery.job.idempotency_key
        );
        Ok(())
    }
}
