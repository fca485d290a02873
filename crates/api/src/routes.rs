use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use courier_dispatcher::{DispatchService, EmailQuery};
use courier_domain::repositories::{ContactRepository, MessageRepository};

use crate::handlers::{
    admin::reset,
    contacts::{create_contact, delete_contact, get_contact, list_contacts},
    emails::{find_emails, send_email},
    health::health_check,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<DispatchService>,
    pub query: Arc<EmailQuery>,
    pub contacts: Arc<dyn ContactRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 联系人注册表（边界功能）
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route("/api/contacts/{id}", get(get_contact))
        .route("/api/contacts/{id}/delete", post(delete_contact))
        // 邮件派发与历史查询
        .route("/api/contacts/email", post(send_email))
        .route("/api/emails", get(find_emails))
        // 管理操作
        .route("/api/admin/reset", post(reset))
        .with_state(state)
}
