use crate::api::{error_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use relaypost_common::types::{Channel, ChannelStatus, DeliveryReport};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// 单渠道凭证概览（密钥已脱敏）
#[derive(Serialize, ToSchema)]
struct CredentialOverview {
    channel: Channel,
    /// 凭证字段表；密钥字段以 *** 显示，保存时回传 *** 表示保留原值
    config: serde_json::Value,
    status: ChannelStatus,
    updated_at: Option<String>,
}

/// 保存结果
#[derive(Serialize, ToSchema)]
struct SaveOutcome {
    success: bool,
    message: String,
}

fn parse_channel(trace_id: &str, raw: &str) -> Result<Channel, axum::response::Response> {
    raw.parse().map_err(|e: String| {
        error_response(StatusCode::BAD_REQUEST, trace_id, "unknown_channel", &e)
    })
}

/// 列出各渠道凭证配置（密钥已脱敏）。
#[utoipa::path(
    get,
    path = "/v1/notifications/credentials",
    tag = "Credentials",
    security(("app_id_auth" = [])),
    responses(
        (status = 200, description = "各渠道凭证", body = Vec<CredentialOverview>),
        (status = 403, description = "缺少或无效的 rp-app-id", body = crate::api::ApiError)
    )
)]
async fn list_credentials(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let overviews: Vec<CredentialOverview> = Channel::ALL
        .iter()
        .map(|ch| CredentialOverview {
            channel: *ch,
            config: state.credentials.redacted_config(*ch),
            status: state.credentials.status(*ch),
            updated_at: state.credentials.updated_at(*ch).map(|t| t.to_rfc3339()),
        })
        .collect();
    success_response(StatusCode::OK, &trace_id, overviews)
}

/// 获取各渠道凭证状态（configured / not_configured / error）。
#[utoipa::path(
    get,
    path = "/v1/notifications/credentials/statuses",
    tag = "Credentials",
    security(("app_id_auth" = [])),
    responses(
        (status = 200, description = "渠道状态表"),
        (status = 403, description = "缺少或无效的 rp-app-id", body = crate::api::ApiError)
    )
)]
async fn credential_statuses(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let statuses: BTreeMap<String, ChannelStatus> = state
        .credentials
        .statuses()
        .into_iter()
        .map(|(ch, st)| (ch.to_string(), st))
        .collect();
    success_response(StatusCode::OK, &trace_id, statuses)
}

/// 保存某渠道的凭证配置。
/// 密钥字段回传 ***（或省略）时保留已存储的值；校验失败不改动已有配置。
#[utoipa::path(
    post,
    path = "/v1/notifications/credentials/{channel}",
    tag = "Credentials",
    security(("app_id_auth" = [])),
    params(("channel" = String, Path, description = "渠道（email/sms/whatsapp/push）")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "凭证已保存", body = SaveOutcome),
        (status = 400, description = "未知渠道或配置无效", body = crate::api::ApiError)
    )
)]
async fn save_credentials(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(bundle): Json<serde_json::Value>,
) -> impl IntoResponse {
    let channel = match parse_channel(&trace_id, &channel) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match state.credentials.save(channel, &bundle) {
        Ok(()) => success_response(
            StatusCode::OK,
            &trace_id,
            SaveOutcome {
                success: true,
                message: format!("{channel} credentials saved"),
            },
        ),
        Err(e) => error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "invalid_config",
            &e.to_string(),
        ),
    }
}

/// 对某渠道的凭证执行连通性测试。
/// 请求体可携带候选凭证（密钥字段回传 *** 时取已存储值），不带请求体
/// 则测试已保存的凭证。测试成功渠道即转为 configured（先于保存）；
/// 失败不会降级已配置的渠道。
#[utoipa::path(
    post,
    path = "/v1/notifications/credentials/{channel}/test",
    tag = "Credentials",
    security(("app_id_auth" = [])),
    params(("channel" = String, Path, description = "渠道（email/sms/whatsapp/push）")),
    request_body(content = serde_json::Value, description = "候选凭证（可选）"),
    responses(
        (status = 200, description = "测试结果（失败也是数据）", body = DeliveryReport),
        (status = 400, description = "未知渠道", body = crate::api::ApiError)
    )
)]
async fn test_credentials(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(channel): Path<String>,
    payload: Option<Json<serde_json::Value>>,
) -> impl IntoResponse {
    let channel = match parse_channel(&trace_id, &channel) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let candidate = payload.map(|Json(v)| v).filter(|v| v.is_object());
    let report = state
        .tester
        .test_with(&state.credentials, channel, candidate.as_ref())
        .await;
    success_response(StatusCode::OK, &trace_id, report)
}

pub fn credential_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_credentials))
        .routes(routes!(credential_statuses))
        .routes(routes!(save_credentials))
        .routes(routes!(test_credentials))
}
