use courier_domain::entities::{Contact, EmailMessage, NotificationRequest};

/// 由请求和已解析的联系人组装邮件
///
/// 纯函数：收件地址在此刻从联系人复制，之后不再重新解析，
/// 记录反映的是发送时的地址。主题和正文逐字拷贝。
pub fn compose(request: &NotificationRequest, contact: &Contact, sender: &str) -> EmailMessage {
    EmailMessage::new(
        contact.email.clone(),
        sender.to_string(),
        request.subject.clone(),
        request.body.clone(),
    )
    .with_idempotency_key(request.idempotency_key.clone())
}
