use std::sync::Arc;

use courier_core::CourierResult;
use courier_domain::entities::{EmailFilter, EmailMessage, DEFAULT_QUERY_TAKE};
use courier_domain::repositories::MessageRepository;

/// 邮件历史查询引擎
///
/// 独立于派发编排直接读取存储。排序固定为 id 降序（最新在前），
/// 过滤为收件地址精确匹配，分页在过滤和排序之后生效。
/// skip/take 的合法性校验属于边界层，这里不做钳制。
#[derive(Clone)]
pub struct EmailQuery {
    messages: Arc<dyn MessageRepository>,
}

impl EmailQuery {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn find_emails(
        &self,
        filter: &EmailFilter,
        skip: Option<i64>,
        take: Option<i64>,
    ) -> CourierResult<Vec<EmailMessage>> {
        self.messages
            .find(
                filter,
                skip.unwrap_or(0),
                take.unwrap_or(DEFAULT_QUERY_TAKE),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mocks::MockMessagesImpl;

    #[tokio::test]
    async fn test_find_emails_applies_defaults() {
        let mut messages = MockMessagesImpl::new();
        messages
            .expect_find()
            .times(1)
            .withf(|filter, skip, take| filter.to.is_none() && *skip == 0 && *take == 10)
            .returning(|_, _, _| Ok(vec![]));

        let query = EmailQuery::new(Arc::new(messages));
        let page = query
            .find_emails(&EmailFilter::default(), None, None)
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_find_emails_passes_filter_and_pagination() {
        let mut messages = MockMessagesImpl::new();
        messages
            .expect_find()
            .times(1)
            .withf(|filter, skip, take| {
                filter.to.as_deref() == Some("a@x.com") && *skip == 10 && *take == 5
            })
            .returning(|_, _, _| Ok(vec![]));

        let query = EmailQuery::new(Arc::new(messages));
        query
            .find_emails(&EmailFilter::by_to("a@x.com"), Some(10), Some(5))
            .await
            .unwrap();
    }
}
