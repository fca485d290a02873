use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use courier_domain::entities::{DeliveryReceipt, EmailFilter, EmailMessage, NotificationRequest};

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

/// 邮件派发请求
#[derive(Debug, Deserialize, Validate)]
pub struct SendEmailRequest {
    pub contact_id: i64,
    #[validate(length(min = 1, message = "主题不能为空"))]
    pub subject: String,
    pub body: Option<String>,
    pub idempotency_key: Option<String>,
}

/// 邮件历史查询参数
#[derive(Debug, Deserialize)]
pub struct EmailQueryParams {
    pub to: Option<String>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
}

/// 向联系人派发一封邮件
///
/// 验证门在核心被调用之前拒绝格式错误的请求；
/// 联系人不存在映射为404。
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> ApiResult<ApiResponse<DeliveryReceipt>> {
    request.validate()?;

    let mut notification = NotificationRequest::new(request.contact_id, request.subject);
    notification.body = request.body;
    notification.idempotency_key = request.idempotency_key;

    let receipt = state.dispatch.dispatch(&notification).await?;
    Ok(ApiResponse::success(receipt))
}

/// 查询投递历史，最新在前
pub async fn find_emails(
    State(state): State<AppState>,
    Query(params): Query<EmailQueryParams>,
) -> ApiResult<ApiResponse<Vec<EmailMessage>>> {
    let filter = EmailFilter { to: params.to };
    // 负值按未指定处理，钳制策略属于边界层
    let skip = params.skip.filter(|s| *s >= 0);
    let take = params.take.filter(|t| *t >= 0);

    let emails = state.query.find_emails(&filter, skip, take).await?;
    Ok(ApiResponse::success(emails))
}
