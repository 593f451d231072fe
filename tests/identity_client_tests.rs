use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use portal_guard::{
    HttpIdentityClient, IdentityService,
    identity::{ClaimValue, IdentityClaims, IdentityError, refresh_session},
    models::{Decision, Role, Session},
};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

// --- Mock Backend ---

const VALID_TOKEN: &str = "valid-token";

/// Serves `/auth/me` the way the school backend does: numeric ids, 401 for unknown tokens.
async fn me(headers: HeaderMap) -> impl IntoResponse {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match bearer {
        Some(VALID_TOKEN) => (
            StatusCode::OK,
            Json(json!({ "role": "teacher", "id": 42, "grade": "5A", "is_verified": true })),
        )
            .into_response(),
        Some("garbled") => (StatusCode::OK, "not json").into_response(),
        Some("stalled") => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            StatusCode::OK.into_response()
        }
        Some("string-id") => (
            StatusCode::OK,
            Json(json!({ "role": "student", "id": "7", "grade": null })),
        )
            .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn spawn_backend() -> String {
    let router = Router::new().route("/auth/me", get(me));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

// --- Tests ---

#[tokio::test]
async fn test_fetch_identity_success() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let claims = client.fetch_identity(VALID_TOKEN).await.unwrap();

    assert_eq!(claims.role.as_deref(), Some("teacher"));
    assert_eq!(claims.id, Some(ClaimValue::Number(42)));
    assert_eq!(claims.grade, Some(ClaimValue::Text("5A".to_string())));
    assert_eq!(claims.is_verified, Some(true));
}

#[tokio::test]
async fn test_fetch_identity_accepts_string_ids_and_missing_fields() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let claims = client.fetch_identity("string-id").await.unwrap();

    assert_eq!(claims.id, Some(ClaimValue::Text("7".to_string())));
    assert_eq!(claims.grade, None);
    assert_eq!(claims.is_verified, None);
}

#[tokio::test]
async fn test_fetch_identity_rejected_token() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let result = client.fetch_identity("expired").await;

    assert!(matches!(result, Err(IdentityError::Status(401))));
}

#[tokio::test]
async fn test_fetch_identity_undecodable_body() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let result = client.fetch_identity("garbled").await;

    assert!(matches!(result, Err(IdentityError::Decode(_))));
}

#[tokio::test]
async fn test_fetch_identity_unreachable_backend() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = HttpIdentityClient::new(&format!("http://127.0.0.1:{}", port), None).unwrap();
    let result = client.fetch_identity(VALID_TOKEN).await;

    assert!(matches!(result, Err(IdentityError::Transport(_))));
}

#[test]
fn test_endpoint_joins_base_url() {
    let client = HttpIdentityClient::new("http://api.school.test/", None).unwrap();
    assert_eq!(client.endpoint(), "http://api.school.test/auth/me");
}

#[tokio::test]
async fn test_refresh_session_against_http_backend() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let mut session = Session {
        token: Some(VALID_TOKEN.to_string()),
        role: Some(Role::Student),
        user_id: Some("7".to_string()),
        grade: None,
        is_verified: false,
    };

    let decision = refresh_session(&client, &mut session).await;

    assert_eq!(decision, Decision::redirect("/teacher/select-grade"));
    assert_eq!(session.role, Some(Role::Teacher));
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.grade.as_deref(), Some("5A"));
    assert!(session.is_verified);
}

#[tokio::test]
async fn test_refresh_session_failure_clears_token() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, None).unwrap();

    let mut session = Session {
        token: Some("expired".to_string()),
        role: Some(Role::Student),
        ..Session::default()
    };

    let decision = refresh_session(&client, &mut session).await;

    assert_eq!(decision, Decision::redirect("/login"));
    assert_eq!(session.token, None);
    assert_eq!(session.role, Some(Role::Student));
}

#[tokio::test]
async fn test_fetch_identity_times_out_on_stalled_backend() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, Some(Duration::from_secs(1))).unwrap();

    let result = client.fetch_identity("stalled").await;

    assert!(matches!(result, Err(IdentityError::Transport(ref e)) if e.is_timeout()));
}

#[tokio::test]
async fn test_refresh_session_timeout_counts_as_failure() {
    let base = spawn_backend().await;
    let client = HttpIdentityClient::new(&base, Some(Duration::from_secs(1))).unwrap();

    let mut session = Session {
        token: Some("stalled".to_string()),
        role: Some(Role::Student),
        user_id: Some("7".to_string()),
        ..Session::default()
    };

    let decision = refresh_session(&client, &mut session).await;

    assert_eq!(decision, Decision::redirect("/login"));
    assert_eq!(session.token, None);
}

#[test]
fn test_claims_apply_to_session() {
    let mut session = Session {
        token: Some("t".to_string()),
        ..Session::default()
    };

    IdentityClaims {
        role: Some("admin".to_string()),
        id: Some(ClaimValue::Number(1)),
        grade: None,
        is_verified: None,
    }
    .apply_to(&mut session);

    assert_eq!(session.token.as_deref(), Some("t"));
    assert_eq!(session.role, Some(Role::Admin));
    assert_eq!(session.user_id.as_deref(), Some("1"));
    assert!(!session.is_verified);
}
