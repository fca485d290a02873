use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 联系人记录
///
/// 由外部注册表维护，本服务只在派发时读取，从不缓存、从不修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl Contact {
    pub fn new(name: String, email: String, age: i32) -> Self {
        Self {
            id: 0, // 将由数据库生成
            name,
            email,
            age,
        }
    }

    pub fn entity_description(&self) -> String {
        format!("联系人 '{}' (ID: {}, 邮箱: {})", self.name, self.id, self.email)
    }
}

/// 一次通知投递的不可变记录
///
/// 插入后只读，没有更新路径。`id` 由存储分配且单调递增，
/// 是全部记录上唯一可靠的总序；`created_at` 仅作展示用途。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailMessage {
    pub id: i64,
    pub to: String,
    pub sender: String,
    pub subject: String,
    pub body: Option<String>,
    /// 幂等键，队列重复投递时保证至多记录一次
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    pub fn new(to: String, sender: String, subject: String, body: Option<String>) -> Self {
        Self {
            id: 0, // 将由数据库生成
            to,
            sender,
            subject,
            body,
            idempotency_key: None,
            created_at: Utc::now(), // 实际值由存储在插入时分配
        }
    }

    pub fn with_idempotency_key(mut self, key: Option<String>) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn entity_description(&self) -> String {
        format!("邮件记录 (ID: {}, 收件人: {})", self.id, self.to)
    }
}

/// 通知请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub contact_id: i64,
    pub subject: String,
    pub body: Option<String>,
    pub idempotency_key: Option<String>,
}

impl NotificationRequest {
    pub fn new(contact_id: i64, subject: impl Into<String>) -> Self {
        Self {
            contact_id,
            subject: subject.into(),
            body: None,
            idempotency_key: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// 派发回执，向调用方确认实际投递到的地址
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryReceipt {
    pub email: String,
}

/// 邮件历史查询过滤条件
///
/// `to` 为精确匹配（区分大小写，本核心不做任何规范化）。
#[derive(Debug, Clone, Default)]
pub struct EmailFilter {
    pub to: Option<String>,
}

impl EmailFilter {
    pub fn by_to(to: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
        }
    }
}

/// 查询分页默认值：take 未指定时为 10
pub const DEFAULT_QUERY_TAKE: i64 = 10;
