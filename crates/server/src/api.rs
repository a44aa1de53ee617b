//! HTTP surface
//!
//! A single path serves every operation. GET requests select one with the
//! `endpoint` query parameter, POST requests with the `action` body field.
//! Caller identity travels in the `X-Player-Id` and `X-Admin-Token` headers.

use crate::error::{ApiError, ApiResult};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use beans_business::{
    AdminService, PlayerService, QuestionService, RewardService, ServiceContext,
    WithdrawalService,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const PLAYER_HEADER: HeaderName = HeaderName::from_static("x-player-id");
pub const ADMIN_HEADER: HeaderName = HeaderName::from_static("x-admin-token");

/// Build the application router
pub fn router(ctx: ServiceContext) -> Router {
    Router::new()
        .route("/", economy_routes())
        .route("/api", economy_routes())
        .route("/health", get(health_handler))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

fn economy_routes() -> MethodRouter<ServiceContext> {
    get(handle_get)
        .post(handle_post)
        .fallback(method_not_allowed)
}

/// Answers every OPTIONS request with an empty 200 and adds the
/// allow-origin header to all other responses.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, PLAYER_HEADER, ADMIN_HEADER])
        .max_age(Duration::from_secs(86400))
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn header_value<'h>(headers: &'h HeaderMap, name: &HeaderName) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

// ============================================================================
// GET
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetParams {
    #[serde(default)]
    endpoint: String,
    limit: Option<String>,
}

impl GetParams {
    fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|l| l.parse().ok())
    }
}

async fn handle_get(
    State(ctx): State<ServiceContext>,
    headers: HeaderMap,
    Query(params): Query<GetParams>,
) -> ApiResult<Response> {
    let player_id = header_value(&headers, &PLAYER_HEADER);
    let players = PlayerService::new(&ctx);

    match (params.endpoint.as_str(), player_id) {
        ("leaderboard", _) => {
            let board = players.leaderboard(params.limit()).await?;
            Ok(Json(board).into_response())
        }
        ("player", Some(player_id)) => {
            let lookup = players.get_or_create(player_id).await?;
            Ok(Json(lookup.player).into_response())
        }
        ("transactions", Some(player_id)) => {
            let history = players.transactions(player_id, params.limit()).await?;
            Ok(Json(history).into_response())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

// ============================================================================
// POST
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct WithdrawRequest {
    amount: i64,
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct QuestionRequest {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Deserialize)]
struct BalanceUpdateRequest {
    target_player_id: String,
    amount: i64,
}

/// Parse the body as a JSON object. An empty body counts as `{}`.
fn parse_body(body: &[u8]) -> ApiResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("body must be a JSON object".to_string())),
        Err(err) => Err(ApiError::BadRequest(err.to_string())),
    }
}

fn decode<T: DeserializeOwned>(fields: Map<String, Value>) -> ApiResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|err| ApiError::BadRequest(err.to_string()))
}

async fn handle_post(
    State(ctx): State<ServiceContext>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let player_id = header_value(&headers, &PLAYER_HEADER);
    let admin_token = header_value(&headers, &ADMIN_HEADER);

    let fields = parse_body(&body)?;
    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match (action.as_str(), player_id) {
        ("admin_login", _) => {
            let request: LoginRequest = decode(fields)?;
            let session = AdminService::new(&ctx).login(&request.password).await?;
            Ok(Json(json!({ "success": true, "token": session.session_token })).into_response())
        }
        ("verify_admin", _) => {
            if admin_token.is_none() {
                return Ok((
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({ "valid": false })),
                )
                    .into_response());
            }
            let valid = AdminService::new(&ctx).verify(admin_token).await?;
            Ok(Json(json!({ "valid": valid })).into_response())
        }
        ("join_channel", Some(player_id)) => {
            let change = RewardService::new(&ctx).join_channel(player_id).await?;
            Ok(Json(json!({ "success": true, "beans": change.beans })).into_response())
        }
        ("withdraw", Some(player_id)) => {
            let request: WithdrawRequest = decode(fields)?;
            let change = WithdrawalService::new(&ctx)
                .withdraw(player_id, request.amount, &request.account_id)
                .await?;
            Ok(Json(json!({ "success": true, "beans": change.beans })).into_response())
        }
        ("send_question", Some(player_id)) => {
            let request: QuestionRequest = decode(fields)?;
            let message = QuestionService::send_question(player_id, &request.question)?;
            Ok(Json(json!({ "success": true, "message": message })).into_response())
        }
        ("admin_update_balance", _) => {
            let admin = AdminService::new(&ctx);
            // Token is checked before the body is decoded
            let grant = admin.authorize(admin_token).await?;
            let request: BalanceUpdateRequest = decode(fields)?;
            let change = admin
                .update_balance(&grant, &request.target_player_id, request.amount)
                .await?;
            Ok(Json(json!({ "success": true, "beans": change.beans })).into_response())
        }
        _ => Err(ApiError::MethodNotAllowed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use beans_business::EconomyConfig;
    use beans_persistence::{AdminSessionRepo, Database, TransactionRepo};
    use tower::ServiceExt;

    const PASSWORD: &str = "test-secret";

    async fn app() -> (Router, ServiceContext) {
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::new(db, EconomyConfig::default().with_admin_password(PASSWORD));
        (router(ctx.clone()), ctx)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn get_request(query: &str, player_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(format!("/?{}", query));
        if let Some(id) = player_id {
            builder = builder.header("X-Player-Id", id);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_request(body: Value, player_id: Option<&str>, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json");
        if let Some(id) = player_id {
            builder = builder.header("X-Player-Id", id);
        }
        if let Some(token) = token {
            builder = builder.header("X-Admin-Token", token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            post_request(json!({ "action": "admin_login", "password": PASSWORD }), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn grant(app: &Router, token: &str, player_id: &str, amount: i64) {
        let (status, _) = send(
            app,
            post_request(
                json!({ "action": "admin_update_balance", "target_player_id": player_id, "amount": amount }),
                None,
                Some(token),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_player_creates_then_returns_same_row() {
        let (app, _) = app().await;

        let (status, first) = send(&app, get_request("endpoint=player", Some("abc123456"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["beans"], 0);
        assert_eq!(first["name"], "Player #abc123");
        assert_eq!(first["channel_joined"], false);

        let (_, second) = send(&app, get_request("endpoint=player", Some("abc123456"))).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_player_without_header_is_not_allowed() {
        let (app, _) = app().await;
        let (status, body) = send(&app, get_request("endpoint=player", None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_join_channel_once() {
        let (app, ctx) = app().await;
        send(&app, get_request("endpoint=player", Some("p1"))).await;

        let join = || post_request(json!({ "action": "join_channel" }), Some("p1"), None);

        let (status, body) = send(&app, join()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "beans": 50 }));

        let (status, body) = send(&app, join()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Reward already claimed");

        assert_eq!(TransactionRepo::count(ctx.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_over_balance_leaves_balance() {
        let (app, _) = app().await;
        let token = login(&app).await;
        send(&app, get_request("endpoint=player", Some("p1"))).await;
        grant(&app, &token, "p1", 100).await;

        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "withdraw", "amount": 150, "account_id": "ACC-1" }),
                Some("p1"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient beans");

        let (_, player) = send(&app, get_request("endpoint=player", Some("p1"))).await;
        assert_eq!(player["beans"], 100);

        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "withdraw", "amount": 40, "account_id": "ACC-1" }),
                Some("p1"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["beans"], 60);

        let (_, history) = send(&app, get_request("endpoint=transactions", Some("p1"))).await;
        assert_eq!(history[0]["type"], "withdraw");
        assert_eq!(history[0]["amount"], -40);
        assert_eq!(history[1]["type"], "admin");
        assert_eq!(history[1]["amount"], 100);
    }

    #[tokio::test]
    async fn test_withdraw_requires_integer_amount() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "withdraw", "amount": "lots", "account_id": "ACC-1" }),
                Some("p1"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_admin_login_wrong_password() {
        let (app, ctx) = app().await;
        let (status, body) = send(
            &app,
            post_request(json!({ "action": "admin_login", "password": "wrong" }), None, None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "success": false, "error": "Invalid password" }));
        assert_eq!(AdminSessionRepo::count(ctx.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_verify_admin() {
        let (app, _) = app().await;
        let token = login(&app).await;

        let verify = |token: Option<&str>| {
            post_request(json!({ "action": "verify_admin" }), None, token)
        };

        let (status, body) = send(&app, verify(Some(token.as_str()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "valid": true }));

        let (status, body) = send(&app, verify(Some("bogus"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "valid": false }));

        let (status, body) = send(&app, verify(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "valid": false }));
    }

    #[tokio::test]
    async fn test_admin_update_balance_requires_token() {
        let (app, ctx) = app().await;
        send(&app, get_request("endpoint=player", Some("p1"))).await;

        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "admin_update_balance", "target_player_id": "p1", "amount": 500 }),
                None,
                Some("forged"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Access denied");

        let (_, player) = send(&app, get_request("endpoint=player", Some("p1"))).await;
        assert_eq!(player["beans"], 0);
        assert_eq!(TransactionRepo::count(ctx.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_admin_update_balance_unknown_player() {
        let (app, _) = app().await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "admin_update_balance", "target_player_id": "ghost", "amount": 5 }),
                None,
                Some(token.as_str()),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Player not found");
    }

    #[tokio::test]
    async fn test_send_question_acknowledged() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            post_request(
                json!({ "action": "send_question", "question": "How do I withdraw?" }),
                Some("p1"),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], beans_business::QUESTION_ACK);
    }

    #[tokio::test]
    async fn test_leaderboard() {
        let (app, _) = app().await;
        let token = login(&app).await;
        for (id, beans) in [("a", 10), ("b", 30), ("c", 20)] {
            send(&app, get_request("endpoint=player", Some(id))).await;
            grant(&app, &token, id, beans).await;
        }

        let (status, board) = send(&app, get_request("endpoint=leaderboard&limit=2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            board,
            json!([
                { "player_id": "b", "name": "Player #b", "beans": 30, "rank": 1 },
                { "player_id": "c", "name": "Player #c", "beans": 20, "rank": 2 },
            ])
        );
    }

    #[tokio::test]
    async fn test_leaderboard_never_exceeds_requested_limit() {
        let (app, _) = app().await;
        for id in ["a", "b"] {
            send(&app, get_request("endpoint=player", Some(id))).await;
        }

        for query in ["endpoint=leaderboard&limit=0", "endpoint=leaderboard&limit=-3"] {
            let (status, board) = send(&app, get_request(query, None)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(board, json!([]));
        }

        let (_, board) = send(&app, get_request("endpoint=leaderboard&limit=1", None)).await;
        assert_eq!(board.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_action_and_method() {
        let (app, _) = app().await;

        let (status, _) = send(&app, post_request(json!({ "action": "teleport" }), Some("p1"), None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(&app, get_request("endpoint=nothing", None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let request = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (app, _) = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("X-Player-Id", "p1")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let (app, _) = app().await;
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/")
            .header("Origin", "https://game.example")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"));
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains("x-player-id"));
        assert!(allowed.contains("x-admin-token"));
    }

    #[tokio::test]
    async fn test_responses_carry_allow_origin() {
        let (app, _) = app().await;
        let request = Request::builder()
            .method("GET")
            .uri("/?endpoint=leaderboard")
            .header("Origin", "https://game.example")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app().await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_path_alias() {
        let (app, _) = app().await;
        let request = Request::builder()
            .method("GET")
            .uri("/api?endpoint=leaderboard")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
