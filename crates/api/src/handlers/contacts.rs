use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use courier_domain::entities::Contact;

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::AppState,
};

/// 联系人创建请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, message = "姓名不能为空"))]
    pub name: String,
    #[validate(email(message = "邮箱地址格式无效"))]
    pub email: String,
    #[validate(range(min = 1, message = "年龄必须大于0"))]
    pub age: i32,
}

/// 联系人查询参数
#[derive(Debug, Deserialize)]
pub struct ContactQueryParams {
    pub age: Option<i32>,
}

/// 创建联系人
pub async fn create_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> ApiResult<ApiResponse<Contact>> {
    request.validate()?;

    let contact = Contact::new(request.name, request.email, request.age);
    let created = state.contacts.create(&contact).await?;
    Ok(ApiResponse::success(created))
}

/// 获取单个联系人
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Contact>> {
    let contact = state
        .contacts
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ApiResponse::success(contact))
}

/// 获取联系人列表，可按年龄过滤
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ContactQueryParams>,
) -> ApiResult<ApiResponse<Vec<Contact>>> {
    let contacts = match params.age {
        Some(age) => state.contacts.find_by_age(age).await?,
        None => state.contacts.find_all().await?,
    };
    Ok(ApiResponse::success(contacts))
}

/// 删除联系人
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    state.contacts.delete(id).await?;
    Ok(ApiResponse::success_empty())
}
