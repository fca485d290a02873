//! 领域仓储抽象
//!
//! 定义数据访问的抽象接口，遵循依赖倒置原则

use async_trait::async_trait;
use courier_core::CourierResult;

use crate::entities::{Contact, EmailFilter, EmailMessage};

/// 联系人注册表抽象
///
/// 对本核心而言是外部协作方：派发路径只使用 `get_by_id`，
/// 其余操作属于注册表自身的边界功能。
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: &Contact) -> CourierResult<Contact>;
    async fn get_by_id(&self, id: i64) -> CourierResult<Option<Contact>>;
    async fn find_all(&self) -> CourierResult<Vec<Contact>>;
    async fn find_by_age(&self, age: i32) -> CourierResult<Vec<Contact>>;
    async fn delete(&self, id: i64) -> CourierResult<bool>;
    /// 管理用途的批量清空，核心流程不调用
    async fn delete_all(&self) -> CourierResult<()>;
}

/// 邮件记录存储抽象
///
/// 只追加的持久集合：插入与读取，没有更新和单条删除。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 插入记录，由存储分配单调递增的 id 和创建时间
    async fn insert(&self, message: &EmailMessage) -> CourierResult<EmailMessage>;

    /// 按幂等键插入：若键已存在则返回已有记录，不产生新行。
    /// 对并发的相同键调用必须原子，依赖键上的唯一索引。
    async fn insert_idempotent(&self, message: &EmailMessage) -> CourierResult<EmailMessage>;

    async fn get_by_id(&self, id: i64) -> CourierResult<Option<EmailMessage>>;

    /// 过滤 + 按 id 降序 + 分页后的一页记录
    async fn find(&self, filter: &EmailFilter, skip: i64, take: i64)
        -> CourierResult<Vec<EmailMessage>>;

    async fn count(&self) -> CourierResult<i64>;

    /// 管理用途的批量清空，核心流程不调用
    async fn delete_all(&self) -> CourierResult<()>;
}
