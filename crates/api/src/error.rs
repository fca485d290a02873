use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use courier_core::CourierError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("通知服务错误: {0}")]
    Courier(#[from] CourierError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Courier(CourierError::ContactNotFound { .. }) => (
                StatusCode::NOT_FOUND,
                // 对外的固定文案，404类结果，重试同一请求无意义
                "Contact does not exist".to_string(),
                "CONTACT_NOT_FOUND".to_string(),
                vec![
                    "请检查联系人ID是否正确".to_string(),
                    "使用 GET /api/contacts 查看所有联系人".to_string(),
                ],
            ),
            ApiError::Courier(CourierError::MessageNotFound { id }) => (
                StatusCode::NOT_FOUND,
                format!("邮件记录 ID {} 不存在", id),
                "MESSAGE_NOT_FOUND".to_string(),
                vec!["使用 GET /api/emails 查看投递历史".to_string()],
            ),
            ApiError::Courier(CourierError::Transport(msg)) => (
                StatusCode::BAD_GATEWAY,
                format!("邮件投递失败: {}", msg),
                "TRANSPORT_ERROR".to_string(),
                vec![
                    "邮件中继暂时不可用，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Courier(CourierError::MessageQueue(msg)) => (
                StatusCode::BAD_GATEWAY,
                format!("消息队列不可用: {}", msg),
                "QUEUE_ERROR".to_string(),
                vec!["队列broker暂时不可用，请稍后重试".to_string()],
            ),
            ApiError::Validation(errors) => {
                let error_details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .unwrap_or(&std::borrow::Cow::Borrowed("验证失败"))
                                    .to_string()
                            })
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    format!("请求参数验证失败: {}", error_details.join("; ")),
                    "VALIDATION_ERROR".to_string(),
                    vec!["请检查请求参数是否符合要求".to_string()],
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {}", msg),
                "BAD_REQUEST".to_string(),
                vec!["请检查请求格式和参数".to_string()],
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND".to_string(),
                vec!["请检查请求URL是否正确".to_string()],
            ),
            ApiError::Courier(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![format!("错误详情: {}", msg)],
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_not_found_maps_to_404() {
        let error = ApiError::Courier(CourierError::ContactNotFound { id: -1 });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transport_error_maps_to_502() {
        let error = ApiError::Courier(CourierError::Transport("refused".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_store_error_maps_to_500() {
        let error = ApiError::Courier(CourierError::Database(sqlx_row_not_found()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1))]
            subject: String,
        }

        let errors = Probe {
            subject: String::new(),
        }
        .validate()
        .unwrap_err();

        let error: ApiError = errors.into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let error = ApiError::BadRequest("invalid".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn sqlx_row_not_found() -> sqlx::Error {
        sqlx::Error::RowNotFound
    }
}
