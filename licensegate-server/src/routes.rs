//! HTTP handlers and response bodies.

use crate::AppState;
use crate::auth::presented_secret;
use crate::error::ServiceError;
use crate::service::LicenseCheck;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use licensegate_types::ClientId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

// ── Bodies ───────────────────────────────────────────────────────

/// Body of `GET /check`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckResponse {
    pub licensed: bool,
    #[serde(rename = "accessToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl CheckResponse {
    fn unlicensed() -> Self {
        Self {
            licensed: false,
            access_token: None,
        }
    }
}

/// Body of `GET /validate`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidateResponse {
    pub valid: bool,
}

/// Body of a successful `POST /admin/enable` or `/admin/disable`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToggleResponse {
    pub ok: bool,
    pub client: String,
    pub enabled: bool,
}

/// Body of `GET /admin/status`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatusResponse {
    pub clients: Vec<ClientId>,
}

/// Body of admin failures.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn forbidden() -> Response {
    error_response(StatusCode::FORBIDDEN, "Forbidden")
}

// ── Queries ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    client: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateQuery {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    client: Option<String>,
    secret: Option<String>,
}

/// Optional admin request body. Anything that is not a JSON object with
/// string fields is treated as absent.
#[derive(Debug, Default)]
struct AdminBody {
    client: Option<String>,
    secret: Option<String>,
}

impl AdminBody {
    fn parse(bytes: &Bytes) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) else {
            return Self::default();
        };
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            client: field("client"),
            secret: field("secret"),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────

pub async fn check(State(state): State<AppState>, Query(query): Query<CheckQuery>) -> Response {
    let client = query.client.unwrap_or_default();
    match state.service.check_license(&client).await {
        Ok(LicenseCheck::Licensed { access_token }) => Json(CheckResponse {
            licensed: true,
            access_token: Some(access_token.into_inner()),
        })
        .into_response(),
        Ok(LicenseCheck::Unlicensed) => Json(CheckResponse::unlicensed()).into_response(),
        Err(ServiceError::MissingClient) => {
            (StatusCode::BAD_REQUEST, Json(CheckResponse::unlicensed())).into_response()
        }
        Err(e) => {
            error!("License check for {:?} failed: {}", client.trim(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckResponse::unlicensed()),
            )
                .into_response()
        }
    }
}

pub async fn validate(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Response {
    let token = query.token.unwrap_or_default();
    match state.service.validate_token(&token).await {
        Ok(true) => Json(ValidateResponse { valid: true }).into_response(),
        Ok(false) => {
            (StatusCode::UNAUTHORIZED, Json(ValidateResponse { valid: false })).into_response()
        }
        Err(e) => {
            error!("Token validation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateResponse { valid: false }),
            )
                .into_response()
        }
    }
}

pub async fn admin_enable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
    body: Bytes,
) -> Response {
    set_enabled(&state, &headers, query, &body, true).await
}

pub async fn admin_disable(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
    body: Bytes,
) -> Response {
    set_enabled(&state, &headers, query, &body, false).await
}

async fn set_enabled(
    state: &AppState,
    headers: &HeaderMap,
    query: AdminQuery,
    body: &Bytes,
    enabled: bool,
) -> Response {
    let body = AdminBody::parse(body);
    let secret = presented_secret(headers, query.secret.as_deref(), body.secret.as_deref());
    if !state.admin_secret.matches(secret) {
        warn!("Rejected admin request with bad secret");
        return forbidden();
    }

    let client = body
        .client
        .filter(|c| !c.trim().is_empty())
        .or(query.client)
        .unwrap_or_default();
    match state.service.admin_set_enabled(&client, enabled).await {
        Ok(client) => Json(ToggleResponse {
            ok: true,
            client: client.into_inner(),
            enabled,
        })
        .into_response(),
        Err(ServiceError::MissingClient) => {
            error_response(StatusCode::BAD_REQUEST, "Missing client")
        }
        Err(e) => {
            error!("Admin set_enabled({:?}, {}) failed: {}", client.trim(), enabled, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed")
        }
    }
}

pub async fn admin_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Response {
    let secret = presented_secret(&headers, query.secret.as_deref(), None);
    if !state.admin_secret.matches(secret) {
        warn!("Rejected admin request with bad secret");
        return forbidden();
    }

    match state.service.admin_list_enabled().await {
        Ok(clients) => Json(StatusResponse {
            clients: clients.into_iter().collect(),
        })
        .into_response(),
        Err(e) => {
            error!("Listing enabled clients failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed")
        }
    }
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
