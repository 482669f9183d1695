//! End-to-end router tests over in-memory stores and a mock mailer,
//! composed the same way the binary wires things up.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::Router;
use core_config::auth::AuthConfig;
use core_config::mail::MailConfig;
use domain_accounts::{
    router, AccountsService, AccountsState, InMemoryAddressStore, InMemoryUserStore, VIEWS,
};
use domain_accounts::reset::ResetTokens;
use mailer::{MailerService, MockProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use web_core::{fallback_not_found, normalize_errors, JwtAuth, NormalizeConfig};

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604_800,
        reset_ttl_secs: 3_600,
    }
}

struct TestApp {
    app: Router,
    provider: MockProvider,
    jwt: JwtAuth,
}

fn test_app() -> TestApp {
    test_app_with_provider(MockProvider::new())
}

fn test_app_with_provider(provider: MockProvider) -> TestApp {
    let auth = auth_config();
    let jwt = JwtAuth::new(&auth);

    let mail_config = MailConfig {
        from_email: "noreply@example.com".into(),
        from_name: "Accounts".into(),
        frontend_url: "https://app.example.com".into(),
    };

    let service = AccountsService::new(
        InMemoryUserStore::new(),
        InMemoryAddressStore::new(),
        ResetTokens::new(&auth),
        MailerService::new(Arc::new(provider.clone()), mail_config),
    );

    let state = AccountsState {
        service,
        jwt: jwt.clone(),
    };

    let app = Router::new()
        .nest("/api", router(state))
        .fallback(fallback_not_found)
        .layer(from_fn_with_state(
            NormalizeConfig::new(false).with_views(VIEWS),
            normalize_errors,
        ));

    TestApp { app, provider, jwt }
}

async fn request(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, path, None, Some(body)).await
}

fn register_body(email: &str) -> Value {
    json!({
        "email": email,
        "full_name": "Test User",
        "password": "supersecret",
        "confirm_password": "supersecret",
    })
}

async fn register(app: &Router, email: &str) -> Value {
    let (status, body) = post(app, "/api/register/", register_body(email)).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    post(app, "/api/login/", json!({"email": email, "password": password})).await
}

#[tokio::test]
async fn register_returns_profile_without_secrets() {
    let t = test_app();
    let body = register(&t.app, "new@example.com").await;

    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["full_name"], "Test User");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_normalizes_email_domain_only() {
    let t = test_app();
    let body = register(&t.app, "Mixed@EXAMPLE.COM").await;
    assert_eq!(body["email"], "Mixed@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_field_error() {
    let t = test_app();
    register(&t.app, "dup@example.com").await;

    let (status, body) = post(&t.app, "/api/register/", register_body("DUP@example.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "ValidationError");
    assert_eq!(
        body["error"]["message"]["email"][0],
        "A user with this email already exists."
    );
    assert_eq!(body["meta"]["status_code"], 400);
    assert_eq!(body["meta"]["path"], "/api/register/");
    assert_eq!(body["meta"]["method"], "POST");
    assert_eq!(body["meta"]["view"], "register");
}

#[tokio::test]
async fn mismatched_passwords_rejected() {
    let t = test_app();
    let (status, body) = post(
        &t.app,
        "/api/register/",
        json!({
            "email": "a@example.com",
            "password": "supersecret",
            "confirm_password": "different-pass",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"]["confirm_password"][0],
        "Passwords do not match."
    );
}

#[tokio::test]
async fn login_issues_token_pair_with_user() {
    let t = test_app();
    register(&t.app, "a@example.com").await;

    let (status, body) = login(&t.app, "a@example.com", "supersecret").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    assert_eq!(body["user"]["email"], "a@example.com");
}

#[tokio::test]
async fn login_failures_share_one_response() {
    let t = test_app();
    register(&t.app, "a@example.com").await;

    let (wrong_status, wrong_body) = login(&t.app, "a@example.com", "bad-password").await;
    let (ghost_status, ghost_body) = login(&t.app, "ghost@example.com", "supersecret").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(ghost_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"]["type"], "AuthenticationError");
    assert_eq!(
        wrong_body["error"]["message"],
        "No active account found with the given credentials."
    );
    assert_eq!(wrong_body["error"]["message"], ghost_body["error"]["message"]);
}

#[tokio::test]
async fn refresh_rotates_both_tokens() {
    let t = test_app();
    register(&t.app, "a@example.com").await;
    let (_, login_body) = login(&t.app, "a@example.com", "supersecret").await;

    let (status, body) = post(
        &t.app,
        "/api/token/refresh/",
        json!({"refresh": login_body["refresh"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    assert_ne!(body["refresh"], login_body["refresh"]);
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let t = test_app();
    register(&t.app, "a@example.com").await;
    let (_, login_body) = login(&t.app, "a@example.com", "supersecret").await;

    let (status, body) = post(
        &t.app,
        "/api/token/refresh/",
        json!({"refresh": login_body["access"]}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"]["message"],
        "Given token not valid for any token type."
    );
}

#[tokio::test]
async fn me_requires_authentication() {
    let t = test_app();

    let (status, body) = request(&t.app, Method::GET, "/api/me/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "AuthenticationError");
    assert_eq!(
        body["error"]["message"],
        "Authentication credentials were not provided."
    );
    assert_eq!(body["meta"]["view"], "me");
}

#[tokio::test]
async fn me_returns_own_profile() {
    let t = test_app();
    register(&t.app, "a@example.com").await;
    let (_, login_body) = login(&t.app, "a@example.com", "supersecret").await;
    let token = login_body["access"].as_str().unwrap();

    let (status, body) = request(&t.app, Method::GET, "/api/me/", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@example.com");
}

#[tokio::test]
async fn user_listing_is_staff_only() {
    let t = test_app();
    let user = register(&t.app, "plain@example.com").await;
    let user_id = Uuid::parse_str(user["id"].as_str().unwrap()).unwrap();
    let (_, login_body) = login(&t.app, "plain@example.com", "supersecret").await;
    let plain_token = login_body["access"].as_str().unwrap().to_string();

    let (status, body) =
        request(&t.app, Method::GET, "/api/users/", Some(&plain_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["type"], "PermissionDenied");
    assert_eq!(
        body["error"]["message"],
        "You do not have permission to perform this action."
    );

    let staff_pair = t
        .jwt
        .issue_pair(user_id, "plain@example.com", true, false)
        .unwrap();
    let (status, body) =
        request(&t.app, Method::GET, "/api/users/", Some(&staff_pair.access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reset_request_is_uniform_for_unknown_emails() {
    let t = test_app();
    register(&t.app, "known@example.com").await;

    let (known_status, known_body) = post(
        &t.app,
        "/api/password-reset/",
        json!({"email": "known@example.com"}),
    )
    .await;
    let (ghost_status, ghost_body) = post(
        &t.app,
        "/api/password-reset/",
        json!({"email": "ghost@example.com"}),
    )
    .await;

    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(ghost_status, StatusCode::OK);
    assert_eq!(known_body, ghost_body);
    assert_eq!(
        known_body["message"],
        "If the email exists, a reset link has been sent."
    );

    // Only the real account got an email
    assert_eq!(t.provider.sent_count().await, 1);
    assert!(t.provider.was_sent_to("known@example.com").await);
}

#[tokio::test]
async fn reset_request_hides_mailer_failures() {
    let t = test_app_with_provider(MockProvider::failing());
    register(&t.app, "known@example.com").await;

    let (status, body) = post(
        &t.app,
        "/api/password-reset/",
        json!({"email": "known@example.com"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "If the email exists, a reset link has been sent."
    );
}

#[tokio::test]
async fn full_password_reset_flow() {
    let t = test_app();
    register(&t.app, "a@example.com").await;

    post(&t.app, "/api/password-reset/", json!({"email": "a@example.com"})).await;

    let sent = t.provider.sent_emails().await;
    let link = sent[0]
        .body_text
        .lines()
        .find(|l| l.contains("/reset-password/"))
        .unwrap()
        .trim()
        .to_string();
    let mut parts = link.rsplit('/');
    let token = parts.next().unwrap();
    let uidb64 = parts.next().unwrap();

    let (status, _) = post(
        &t.app,
        "/api/password-reset-confirm/",
        json!({"uidb64": uidb64, "token": token, "new_password": "brand-new-pass"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password out, new password in
    let (old_status, _) = login(&t.app, "a@example.com", "supersecret").await;
    let (new_status, _) = login(&t.app, "a@example.com", "brand-new-pass").await;
    assert_eq!(old_status, StatusCode::UNAUTHORIZED);
    assert_eq!(new_status, StatusCode::OK);

    // The same token cannot be replayed
    let (replay_status, replay_body) = post(
        &t.app,
        "/api/password-reset-confirm/",
        json!({"uidb64": uidb64, "token": token, "new_password": "third-pass"}),
    )
    .await;
    assert_eq!(replay_status, StatusCode::BAD_REQUEST);
    assert_eq!(
        replay_body["error"]["message"]["token"][0],
        "Invalid or expired token."
    );
}

#[tokio::test]
async fn corrupted_reset_link_rejected() {
    let t = test_app();
    let (status, body) = post(
        &t.app,
        "/api/password-reset-confirm/",
        json!({"uidb64": "%%%", "token": "whatever", "new_password": "brand-new-pass"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"]["uidb64"][0],
        "Invalid or corrupted link."
    );
}

fn address_body(line1: &str, is_default: bool) -> Value {
    json!({
        "full_name": "John Doe",
        "phone_number": "+123456789",
        "line1": line1,
        "city": "Nairobi",
        "postal_code": "00100",
        "country": "Kenya",
        "is_default": is_default,
    })
}

#[tokio::test]
async fn address_lifecycle() {
    let t = test_app();
    register(&t.app, "a@example.com").await;
    let (_, login_body) = login(&t.app, "a@example.com", "supersecret").await;
    let token = login_body["access"].as_str().unwrap().to_string();

    let (status, created) = request(
        &t.app,
        Method::POST,
        "/api/me/addresses/",
        Some(&token),
        Some(address_body("789 Sunset Blvd", true)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_default"], true);

    // Exact duplicate
    let (status, body) = request(
        &t.app,
        Method::POST,
        "/api/me/addresses/",
        Some(&token),
        Some(address_body("789 Sunset Blvd", true)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"][0],
        "This address already exists for this user."
    );

    // Second default
    let (status, body) = request(
        &t.app,
        Method::POST,
        "/api/me/addresses/",
        Some(&token),
        Some(address_body("12 Other Street", true)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"]["is_default"][0],
        "A default address already exists for this user."
    );

    let id = created["id"].as_str().unwrap();
    let (status, updated) = request(
        &t.app,
        Method::PUT,
        &format!("/api/me/addresses/{id}/"),
        Some(&token),
        Some(address_body("1 New Street", true)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["line1"], "1 New Street");

    let (status, _) = request(
        &t.app,
        Method::DELETE,
        &format!("/api/me/addresses/{id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = request(&t.app, Method::GET, "/api/me/addresses/", Some(&token), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn another_users_address_is_invisible() {
    let t = test_app();
    register(&t.app, "owner@example.com").await;
    register(&t.app, "stranger@example.com").await;

    let (_, owner_login) = login(&t.app, "owner@example.com", "supersecret").await;
    let owner_token = owner_login["access"].as_str().unwrap().to_string();
    let (_, stranger_login) = login(&t.app, "stranger@example.com", "supersecret").await;
    let stranger_token = stranger_login["access"].as_str().unwrap().to_string();

    let (_, created) = request(
        &t.app,
        Method::POST,
        "/api/me/addresses/",
        Some(&owner_token),
        Some(address_body("789 Sunset Blvd", false)),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = request(
        &t.app,
        Method::DELETE,
        &format!("/api/me/addresses/{id}/"),
        Some(&stranger_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Not found.");
    assert_eq!(body["error"]["type"], "NotFound");
}

#[tokio::test]
async fn unknown_route_gets_the_envelope_too() {
    let t = test_app();
    let (status, body) = request(&t.app, Method::GET, "/api/no-such-thing/", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], "Not found.");
    assert_eq!(body["meta"]["path"], "/api/no-such-thing/");
    assert!(body["meta"].get("view").is_none());
}
