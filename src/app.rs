use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use courier_api::{create_routes, AppState};
use courier_core::{AppConfig, MessageQueueType, TransportType};
use courier_dispatcher::{
    DeliveryRecorder, DispatchService, EmailQuery, QueuedDeliveryTransport, SmtpDeliveryTransport,
};
use courier_domain::entities::Contact;
use courier_domain::mailer::Mailer;
use courier_domain::messaging::MessageQueue;
use courier_domain::repositories::ContactRepository;
use courier_domain::transport::DeliveryTransport;
use courier_infrastructure::{
    DatabasePool, InMemoryMessageQueue, RabbitMqMessageQueue, SmtpMailer,
};
use courier_worker::DeliveryConsumer;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Api,
    Consumer,
    All,
}

impl AppMode {
    pub fn includes_api(&self) -> bool {
        matches!(self, AppMode::Api | AppMode::All)
    }

    pub fn includes_consumer(&self) -> bool {
        matches!(self, AppMode::Consumer | AppMode::All)
    }
}

/// 应用实例：组装所有组件并驱动其生命周期
pub struct Application {
    config: AppConfig,
    mode: AppMode,
    state: AppState,
    consumer: Option<Arc<DeliveryConsumer>>,
    pool: Arc<DatabasePool>,
}

impl Application {
    pub async fn new(config: AppConfig, mode: AppMode) -> Result<Self> {
        // 数据库与仓储
        let pool = DatabasePool::new(&config.database.url, config.database.max_connections)
            .await
            .context("连接数据库失败")?;
        pool.run_migrations().await.context("初始化数据库失败")?;

        let contacts = pool.contact_repository();
        let messages = pool.message_repository();
        seed_contacts(contacts.as_ref()).await?;

        // 消息队列
        let queue: Arc<dyn MessageQueue> = match config.message_queue.r#type {
            MessageQueueType::Rabbitmq => Arc::new(
                RabbitMqMessageQueue::new(config.message_queue.clone())
                    .await
                    .context("连接消息队列失败")?,
            ),
            MessageQueueType::InMemory => Arc::new(InMemoryMessageQueue::new()),
        };

        let mailer: Arc<dyn Mailer> =
            Arc::new(SmtpMailer::new(&config.smtp).context("构建SMTP中继失败")?);
        let recorder = DeliveryRecorder::new(messages.clone());

        // 投递通道在启动时选定一次，之后所有派发共用
        let transport: Arc<dyn DeliveryTransport> = match config.delivery.transport {
            TransportType::Smtp => Arc::new(SmtpDeliveryTransport::new(mailer.clone())),
            TransportType::Queue => Arc::new(QueuedDeliveryTransport::new(
                queue.clone(),
                config.message_queue.delivery_queue.clone(),
            )),
        };
        info!("投递通道: {:?}", config.delivery.transport);

        let dispatch = Arc::new(DispatchService::new(
            contacts.clone(),
            transport,
            recorder.clone(),
            config.delivery.sender.clone(),
        ));
        let query = Arc::new(EmailQuery::new(messages.clone()));

        let state = AppState {
            dispatch,
            query,
            contacts,
            messages,
        };

        // 队列消费者独立于请求路径运行
        let consumer = if mode.includes_consumer() && config.consumer.enabled {
            Some(Arc::new(
                DeliveryConsumer::new(
                    queue,
                    mailer,
                    recorder,
                    config.message_queue.delivery_queue.clone(),
                )
                .poll_interval_ms(config.consumer.poll_interval_ms)
                .delivery_delay_ms(config.consumer.delivery_delay_ms),
            ))
        } else {
            None
        };

        Ok(Self {
            config,
            mode,
            state,
            consumer,
            pool: Arc::new(pool),
        })
    }

    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut handles = Vec::new();

        if let Some(consumer) = &self.consumer {
            let consumer = consumer.clone();
            let rx = shutdown.clone();
            handles.push(tokio::spawn(async move {
                if let Err(e) = consumer.run(rx).await {
                    error!("投递消费者退出: {e}");
                }
            }));
        }

        if self.mode.includes_api() && self.config.api.enabled {
            let mut router = create_routes(self.state.clone());
            if self.config.api.cors_enabled {
                router = router.layer(CorsLayer::permissive());
            }
            let router = router.layer(TraceLayer::new_for_http());

            let listener = TcpListener::bind(&self.config.api.bind_address)
                .await
                .with_context(|| format!("绑定API地址失败: {}", self.config.api.bind_address))?;
            info!("API服务监听: {}", self.config.api.bind_address);

            let mut rx = shutdown.clone();
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = rx.changed().await;
                })
                .await
                .context("API服务运行失败")?;
        } else {
            // 仅消费者模式下等待关闭信号
            let mut rx = shutdown.clone();
            let _ = rx.changed().await;
        }

        for handle in handles {
            let _ = handle.await;
        }

        self.pool.close().await;
        info!("应用组件已全部停止");
        Ok(())
    }
}

/// 联系人表为空时写入演示数据
async fn seed_contacts(contacts: &dyn ContactRepository) -> Result<()> {
    if !contacts.find_all().await?.is_empty() {
        return Ok(());
    }

    let demo = [
        ("Kurt Cobain", "kurt@example.com", 27),
        ("Jimi Hendrix", "jimi@example.com", 27),
        ("Janis Joplin", "janis@example.com", 27),
    ];
    for (name, email, age) in demo {
        contacts
            .create(&Contact::new(name.to_string(), email.to_string(), age))
            .await?;
    }

    info!("已写入演示联系人");
    Ok(())
}
