use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use relaypost_catalog::store::ConfigDocument;
use relaypost_catalog::template::TemplateField;
use relaypost_catalog::CatalogError;
use relaypost_common::types::{Channel, RecipientRole};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

fn catalog_error_response(trace_id: &str, err: &CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, trace_id, "not_found", &err.to_string())
        }
        CatalogError::InvalidField { .. } => error_response(
            StatusCode::BAD_REQUEST,
            trace_id,
            "invalid_field",
            &err.to_string(),
        ),
        _ => {
            tracing::error!(error = %err, "Catalog operation failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "internal_error",
                "Catalog error",
            )
        }
    }
}

/// 获取完整通知配置（事件目录 + 模板）。
#[utoipa::path(
    get,
    path = "/v1/notifications/config",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    responses(
        (status = 200, description = "通知配置文档", body = ConfigDocument),
        (status = 403, description = "缺少或无效的 rp-app-id", body = crate::api::ApiError)
    )
)]
async fn get_config(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let doc = {
        let catalog = state.catalog.read().unwrap_or_else(|p| p.into_inner());
        catalog.snapshot()
    };
    success_response(StatusCode::OK, &trace_id, doc)
}

/// 保存完整通知配置（幂等全量替换）。
/// 本地编辑（开关、模板修改）只改内存态；此接口是唯一的持久化动作。
#[utoipa::path(
    post,
    path = "/v1/notifications/config",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    request_body = ConfigDocument,
    responses(
        (status = 200, description = "配置已替换", body = ConfigDocument),
        (status = 403, description = "缺少或无效的 rp-app-id", body = crate::api::ApiError)
    )
)]
async fn replace_config(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(doc): Json<ConfigDocument>,
) -> impl IntoResponse {
    let snapshot = {
        let mut catalog = state.catalog.write().unwrap_or_else(|p| p.into_inner());
        catalog.replace(doc);
        catalog.snapshot()
    };
    tracing::info!(
        events = snapshot.events.len(),
        templates = snapshot.templates.len(),
        "Notification configuration replaced"
    );
    success_response(StatusCode::OK, &trace_id, snapshot)
}

/// 切换事件主开关。收件人与渠道状态保持不变，重新启用时原配置恢复。
#[utoipa::path(
    post,
    path = "/v1/notifications/config/events/{id}/toggle",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    params(("id" = String, Path, description = "事件 ID")),
    responses(
        (status = 200, description = "切换后的事件"),
        (status = 404, description = "事件不存在", body = crate::api::ApiError)
    )
)]
async fn toggle_event(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut catalog = state.catalog.write().unwrap_or_else(|p| p.into_inner());
    match catalog.toggle_event(&id) {
        Ok(ev) => success_response(StatusCode::OK, &trace_id, ev.clone()),
        Err(e) => catalog_error_response(&trace_id, &e),
    }
}

/// 切换事件的某个渠道开关。
/// 事件被禁用时数据层仍接受切换（影子配置），由界面负责禁止交互。
#[utoipa::path(
    post,
    path = "/v1/notifications/config/events/{id}/channels/{channel}/toggle",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    params(
        ("id" = String, Path, description = "事件 ID"),
        ("channel" = String, Path, description = "渠道（email/sms/whatsapp/push）")
    ),
    responses(
        (status = 200, description = "切换后的事件"),
        (status = 400, description = "未知渠道", body = crate::api::ApiError),
        (status = 404, description = "事件不存在", body = crate::api::ApiError)
    )
)]
async fn toggle_channel(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((id, channel)): Path<(String, String)>,
) -> impl IntoResponse {
    let channel: Channel = match channel.parse() {
        Ok(c) => c,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &trace_id, "unknown_channel", &e)
        }
    };
    let mut catalog = state.catalog.write().unwrap_or_else(|p| p.into_inner());
    match catalog.toggle_channel(&id, channel) {
        Ok(ev) => success_response(StatusCode::OK, &trace_id, ev.clone()),
        Err(e) => catalog_error_response(&trace_id, &e),
    }
}

/// 切换事件的某个收件角色（对称差）。
#[utoipa::path(
    post,
    path = "/v1/notifications/config/events/{id}/recipients/{role}/toggle",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    params(
        ("id" = String, Path, description = "事件 ID"),
        ("role" = String, Path, description = "收件角色（admin/retailer/customer）")
    ),
    responses(
        (status = 200, description = "切换后的事件"),
        (status = 400, description = "未知角色", body = crate::api::ApiError),
        (status = 404, description = "事件不存在", body = crate::api::ApiError)
    )
)]
async fn toggle_recipient(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((id, role)): Path<(String, String)>,
) -> impl IntoResponse {
    let role: RecipientRole = match role.parse() {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &trace_id, "unknown_role", &e),
    };
    let mut catalog = state.catalog.write().unwrap_or_else(|p| p.into_inner());
    match catalog.toggle_recipient(&id, role) {
        Ok(ev) => success_response(StatusCode::OK, &trace_id, ev.clone()),
        Err(e) => catalog_error_response(&trace_id, &e),
    }
}

/// 模板单叶更新请求：所有模板编辑流程都归约为此原语的重复调用。
#[derive(Deserialize, ToSchema)]
struct UpdateTemplateFieldRequest {
    role: RecipientRole,
    channel: Channel,
    field: TemplateField,
    value: String,
}

/// 更新模板中一个 (角色, 渠道, 字段) 叶子，其余叶子保持逐字节不变。
#[utoipa::path(
    put,
    path = "/v1/notifications/config/templates/{id}",
    tag = "Configuration",
    security(("app_id_auth" = [])),
    params(("id" = String, Path, description = "模板 ID")),
    request_body = UpdateTemplateFieldRequest,
    responses(
        (status = 200, description = "更新后的模板"),
        (status = 400, description = "字段对该渠道不存在", body = crate::api::ApiError),
        (status = 404, description = "模板不存在", body = crate::api::ApiError)
    )
)]
async fn update_template_field(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplateFieldRequest>,
) -> impl IntoResponse {
    let mut catalog = state.catalog.write().unwrap_or_else(|p| p.into_inner());
    match catalog.update_template_field(&id, req.role, req.channel, req.field, &req.value) {
        Ok(tpl) => success_response(StatusCode::OK, &trace_id, tpl.clone()),
        Err(e) => catalog_error_response(&trace_id, &e),
    }
}

pub fn configuration_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_config, replace_config))
        .routes(routes!(toggle_event))
        .routes(routes!(toggle_channel))
        .routes(routes!(toggle_recipient))
        .routes(routes!(update_template_field))
}
