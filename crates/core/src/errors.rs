use thiserror::Error;

/// 通知服务错误类型定义
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("联系人未找到: {id}")]
    ContactNotFound { id: i64 },

    #[error("邮件记录未找到: {id}")]
    MessageNotFound { id: i64 },

    #[error("消息队列错误: {0}")]
    MessageQueue(String),

    #[error("邮件投递失败: {0}")]
    Transport(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type CourierResult<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_not_found_display() {
        let err = CourierError::ContactNotFound { id: 42 };
        assert_eq!(format!("{err}"), "联系人未找到: 42");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: CourierError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, CourierError::Database(_)));
    }
}
