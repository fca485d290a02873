use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use courier_core::{CourierError, CourierResult, SmtpConfig};
use courier_domain::entities::EmailMessage;
use courier_domain::mailer::Mailer;

/// SMTP邮件中继实现
///
/// 同步投递路径的实际发送方。send 阻塞到中继接受或拒绝为止，
/// 请求时延因此与中继时延耦合，超时由配置给定。
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> CourierResult<Self> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| CourierError::Configuration(format!("SMTP中继配置无效: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_seconds)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_email(message: &EmailMessage) -> CourierResult<Message> {
        let from: Mailbox = message
            .sender
            .parse()
            .map_err(|e| CourierError::Transport(format!("发件人地址无效: {e}")))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| CourierError::Transport(format!("收件人地址无效: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .body(message.body.clone().unwrap_or_default())
            .map_err(|e| CourierError::Transport(format!("构建邮件失败: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> CourierResult<()> {
        let email = Self::build_email(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| CourierError::Transport(format!("SMTP发送失败: {e}")))?;

        debug!("邮件已交付SMTP中继: 收件人 {}", message.to);
        Ok(())
    }
}
