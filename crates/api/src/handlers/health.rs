use axum::extract::State;
use serde_json::{json, Value};

use crate::{error::ApiResult, response::ApiResponse, routes::AppState};

/// 健康检查，探测存储可达性
pub async fn health_check(State(state): State<AppState>) -> ApiResult<ApiResponse<Value>> {
    let recorded = state.messages.count().await?;

    Ok(ApiResponse::success(json!({
        "status": "healthy",
        "recorded_messages": recorded,
    })))
}
