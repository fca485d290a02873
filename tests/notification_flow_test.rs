//! 端到端通知流程测试
//!
//! 在嵌入式组合（SQLite + 内存队列）上走通完整链路：
//! 派发 → 投递 → 落库 → 查询，以及队列路径的幂等重投。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use courier_core::{CourierError, CourierResult};
use courier_dispatcher::{
    DeliveryRecorder, DispatchService, EmailQuery, QueuedDeliveryTransport, SmtpDeliveryTransport,
};
use courier_domain::entities::{Contact, EmailFilter, EmailMessage, NotificationRequest};
use courier_domain::mailer::Mailer;
use courier_domain::messaging::MessageQueue;
use courier_domain::repositories::{ContactRepository, MessageRepository};
use courier_infrastructure::database::sqlite::run_migrations;
use courier_infrastructure::{InMemoryMessageQueue, SqliteContactRepository, SqliteMessageRepository};
use courier_worker::DeliveryConsumer;

/// 记录发送次数的测试中继
struct CountingMailer {
    sent: AtomicUsize,
}

impl CountingMailer {
    fn new() -> Self {
        Self {
            sent: AtomicUsize::new(0),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for CountingMailer {
    async fn send(&self, _message: &EmailMessage) -> CourierResult<()> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct TestHarness {
    contacts: Arc<SqliteContactRepository>,
    messages: Arc<SqliteMessageRepository>,
    queue: Arc<InMemoryMessageQueue>,
    mailer: Arc<CountingMailer>,
}

impl TestHarness {
    async fn new() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        Self {
            contacts: Arc::new(SqliteContactRepository::new(pool.clone())),
            messages: Arc::new(SqliteMessageRepository::new(pool)),
            queue: Arc::new(InMemoryMessageQueue::new()),
            mailer: Arc::new(CountingMailer::new()),
        }
    }

    async fn seed_kurt(&self) -> Contact {
        self.contacts
            .create(&Contact::new(
                "Kurt Cobain".to_string(),
                "kurt@example.com".to_string(),
                27,
            ))
            .await
            .unwrap()
    }

    fn recorder(&self) -> DeliveryRecorder {
        DeliveryRecorder::new(self.messages.clone())
    }

    /// 同步SMTP通道的派发服务
    fn smtp_dispatch(&self) -> DispatchService {
        DispatchService::new(
            self.contacts.clone(),
            Arc::new(SmtpDeliveryTransport::new(self.mailer.clone())),
            self.recorder(),
            "demo@courier.dev",
        )
    }

    /// 队列通道的派发服务
    fn queued_dispatch(&self) -> DispatchService {
        DispatchService::new(
            self.contacts.clone(),
            Arc::new(QueuedDeliveryTransport::new(
                self.queue.clone(),
                "email_delivery",
            )),
            self.recorder(),
            "demo@courier.dev",
        )
    }

    fn consumer(&self) -> DeliveryConsumer {
        DeliveryConsumer::new(
            self.queue.clone(),
            self.mailer.clone(),
            self.recorder(),
            "email_delivery",
        )
    }

    fn query(&self) -> EmailQuery {
        EmailQuery::new(self.messages.clone())
    }
}

#[tokio::test]
async fn test_synchronous_dispatch_records_and_is_queryable() {
    let harness = TestHarness::new().await;
    let kurt = harness.seed_kurt().await;
    let dispatch = harness.smtp_dispatch();

    let receipt = dispatch
        .dispatch(&NotificationRequest::new(kurt.id, "Hi"))
        .await
        .unwrap();
    assert_eq!(receipt.email, "kurt@example.com");
    assert_eq!(harness.mailer.sent_count(), 1);

    let page = harness
        .query()
        .find_emails(&EmailFilter::by_to("kurt@example.com"), None, None)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].subject, "Hi");
    assert_eq!(page[0].sender, "demo@courier.dev");
}

#[tokio::test]
async fn test_dispatch_to_unknown_contact_leaves_store_unchanged() {
    let harness = TestHarness::new().await;
    harness.seed_kurt().await;
    let dispatch = harness.smtp_dispatch();

    let before = harness.messages.count().await.unwrap();
    let result = dispatch
        .dispatch(&NotificationRequest::new(-1, "Hi"))
        .await;

    assert!(matches!(
        result,
        Err(CourierError::ContactNotFound { id: -1 })
    ));
    assert_eq!(harness.messages.count().await.unwrap(), before);
    assert_eq!(harness.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_queued_dispatch_records_after_consumer_runs() {
    let harness = TestHarness::new().await;
    let kurt = harness.seed_kurt().await;
    let dispatch = harness.queued_dispatch();

    let receipt = dispatch
        .dispatch(&NotificationRequest::new(kurt.id, "Hi").with_body("Body"))
        .await
        .unwrap();
    assert_eq!(receipt.email, "kurt@example.com");

    // 回执只确认入队：消费者运行前查询不到任何记录
    assert_eq!(harness.messages.count().await.unwrap(), 0);
    assert_eq!(harness.queue.queue_size("email_delivery").await.unwrap(), 1);

    assert_eq!(harness.consumer().poll_once().await.unwrap(), 1);
    assert_eq!(harness.mailer.sent_count(), 1);

    let page = harness
        .query()
        .find_emails(&EmailFilter::by_to("kurt@example.com"), None, None)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].subject, "Hi");
    assert_eq!(page[0].body.as_deref(), Some("Body"));
}

#[tokio::test]
async fn test_queued_redelivery_records_at_most_once() {
    let harness = TestHarness::new().await;
    let kurt = harness.seed_kurt().await;
    let dispatch = harness.queued_dispatch();

    let request = NotificationRequest::new(kurt.id, "Hi").with_idempotency_key("req-1");
    dispatch.dispatch(&request).await.unwrap();

    // 模拟broker重复投递同一任务
    let delivery = harness
        .queue
        .consume_job("email_delivery")
        .await
        .unwrap()
        .unwrap();
    harness
        .queue
        .publish_job("email_delivery", &delivery.job)
        .await
        .unwrap();
    harness
        .queue
        .publish_job("email_delivery", &delivery.job)
        .await
        .unwrap();
    harness
        .queue
        .ack("email_delivery", delivery.delivery_tag)
        .await
        .unwrap();

    assert_eq!(harness.consumer().poll_once().await.unwrap(), 2);

    // 两次重投只落库一次
    assert_eq!(harness.messages.count().await.unwrap(), 1);
    let page = harness
        .query()
        .find_emails(&EmailFilter::default(), None, None)
        .await
        .unwrap();
    assert_eq!(page[0].idempotency_key.as_deref(), Some("req-1"));
}

#[tokio::test]
async fn test_query_ordering_filtering_and_pagination() {
    let harness = TestHarness::new().await;
    let kurt = harness.seed_kurt().await;
    let other = harness
        .contacts
        .create(&Contact::new(
            "Jimi Hendrix".to_string(),
            "jimi@example.com".to_string(),
            27,
        ))
        .await
        .unwrap();
    let dispatch = harness.smtp_dispatch();

    for i in 1..=15 {
        dispatch
            .dispatch(&NotificationRequest::new(kurt.id, format!("Kurt{i}")))
            .await
            .unwrap();
    }
    dispatch
        .dispatch(&NotificationRequest::new(other.id, "Jimi1"))
        .await
        .unwrap();

    let query = harness.query();

    // 默认一页10条，最新在前
    let first_page = query
        .find_emails(&EmailFilter::default(), None, None)
        .await
        .unwrap();
    assert_eq!(first_page.len(), 10);
    assert_eq!(first_page[0].subject, "Jimi1");
    assert_eq!(first_page[1].subject, "Kurt15");

    // 过滤后仍按 id 降序
    let kurt_page = query
        .find_emails(&EmailFilter::by_to("kurt@example.com"), None, Some(20))
        .await
        .unwrap();
    assert_eq!(kurt_page.len(), 15);
    assert_eq!(kurt_page[0].subject, "Kurt15");
    assert!(kurt_page.iter().all(|m| m.to == "kurt@example.com"));

    // 分页在过滤和排序之后生效
    let second_page = query
        .find_emails(&EmailFilter::default(), Some(10), Some(10))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 6);
    assert_eq!(second_page[5].subject, "Kurt1");
}
