use axum::extract::State;
use tracing::info;

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

/// 清空全部联系人与邮件记录
///
/// 维护用途的管理操作，核心的只追加约束不适用于它。
pub async fn reset(State(state): State<AppState>) -> ApiResult<ApiResponse<()>> {
    state.messages.delete_all().await?;
    state.contacts.delete_all().await?;
    info!("管理操作: 已清空联系人和邮件记录");
    Ok(ApiResponse::success_empty())
}
