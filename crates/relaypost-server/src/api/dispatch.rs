use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use relaypost_common::types::{DeliveryReport, RecipientCandidate, RecipientRole};
use relaypost_notify::dispatcher::TestSendRequest;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 列出某角色可用于测试发送的收件人候选。
#[utoipa::path(
    get,
    path = "/v1/notifications/recipients/{role}",
    tag = "Dispatch",
    security(("app_id_auth" = [])),
    params(("role" = String, Path, description = "收件角色（admin/retailer/customer）")),
    responses(
        (status = 200, description = "收件人候选列表", body = Vec<RecipientCandidate>),
        (status = 400, description = "未知角色", body = crate::api::ApiError)
    )
)]
async fn list_recipients(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> impl IntoResponse {
    let role: RecipientRole = match role.parse() {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &trace_id, "unknown_role", &e),
    };
    let candidates = state.dispatcher.directory().list(role).await;
    success_response(StatusCode::OK, &trace_id, candidates)
}

/// 发送一条测试消息：渲染模板并经该渠道的供应商投递给真实收件人。
/// 任何失败（渠道未配置 / 模板缺失 / 收件人无地址 / 供应商拒绝）都以
/// 结果数据返回，HTTP 层始终 200。
#[utoipa::path(
    post,
    path = "/v1/notifications/send-test",
    tag = "Dispatch",
    security(("app_id_auth" = [])),
    request_body = TestSendRequest,
    responses(
        (status = 200, description = "发送结果（失败也是数据）", body = DeliveryReport),
        (status = 403, description = "缺少或无效的 rp-app-id", body = crate::api::ApiError)
    )
)]
async fn send_test(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<TestSendRequest>,
) -> impl IntoResponse {
    // 在锁内取快照，网络调用发生在锁外。
    let (event, template) = {
        let catalog = state.catalog.read().unwrap_or_else(|p| p.into_inner());
        (
            catalog.event(&req.event_id).ok().cloned(),
            catalog.template_for_event(&req.event_id).ok().cloned(),
        )
    };

    let report = state
        .dispatcher
        .send_test(event.as_ref(), template.as_ref(), &req)
        .await;
    success_response(StatusCode::OK, &trace_id, report)
}

pub fn dispatch_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_recipients))
        .routes(routes!(send_test))
}
