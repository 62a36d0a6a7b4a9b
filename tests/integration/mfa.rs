// tests/integration/mfa.rs

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use crate::{test_server, test_server_with_body_limit, token_issuer};

const EMAIL: &str = "user@example.com";

async fn enroll(server: &TestServer) {
    server
        .post("/api/mfa/setup")
        .json(&json!({ "email": EMAIL }))
        .await
        .assert_status_ok();
    server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_status_for_unknown_user() {
    let server = test_server();

    let response = server
        .post("/api/mfa/status")
        .json(&json!({ "email": EMAIL }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "isEnabled": false,
        "isRequired": false,
        "isVerified": false,
    }));
}

#[tokio::test]
async fn test_status_without_email() {
    let server = test_server();

    let response = server.post("/api/mfa/status").json(&json!({})).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["isEnabled"], false);
}

#[tokio::test]
async fn test_setup_returns_secret_and_placeholder_qr() {
    let server = test_server();

    let response = server
        .post("/api/mfa/setup")
        .json(&json!({ "email": EMAIL }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body["qrCode"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(body["secret"].as_str().unwrap().len(), 32);
    assert_eq!(body["backupCodes"], json!([]));

    // запись создана, но ещё не включена
    let status = server
        .post("/api/mfa/status")
        .json(&json!({ "email": EMAIL }))
        .await
        .json::<Value>();
    assert_eq!(status["isEnabled"], false);
}

#[tokio::test]
async fn test_setup_requires_email() {
    let server = test_server();

    let response = server.post("/api/mfa/setup").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Email is required" }));
}

#[tokio::test]
async fn test_setup_then_confirm_enables() {
    let server = test_server();
    enroll(&server).await;

    let status = server
        .post("/api/mfa/status")
        .json(&json!({ "email": EMAIL }))
        .await
        .json::<Value>();
    assert_eq!(
        status,
        json!({ "isEnabled": true, "isRequired": true, "isVerified": false })
    );
}

#[tokio::test]
async fn test_confirm_setup_messages() {
    let server = test_server();

    let response = server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "MFA setup not found" }));

    server
        .post("/api/mfa/setup")
        .json(&json!({ "email": EMAIL }))
        .await;

    let response = server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "12345" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Invalid verification code" }));

    let response = server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "message": "MFA setup completed successfully" }));

    // повторное подтверждение тоже успешно
    server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "999999" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_short_code_is_rejected_without_record() {
    let server = test_server();

    let response = server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "12345" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_numeric_code_is_rejected() {
    let server = test_server();
    enroll(&server).await;

    let response = server
        .post("/api/mfa/verify")
        .json(&json!({ "email": EMAIL, "code": 123456 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Invalid verification code" }));
}

#[tokio::test]
async fn test_verify_issues_token() {
    let server = test_server();
    enroll(&server).await;

    let response = server
        .post("/api/mfa/verify")
        .json(&json!({ "email": EMAIL, "code": "000000" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["message"], "MFA verification successful");

    let claims = token_issuer()
        .validate(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, EMAIL);
    assert!(claims.mfa);
}

#[tokio::test]
async fn test_verify_requires_enabled_record() {
    let server = test_server();

    let response = server
        .post("/api/mfa/verify")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "MFA not enabled for this user" }));

    // только setup, без подтверждения
    server
        .post("/api/mfa/setup")
        .json(&json!({ "email": EMAIL }))
        .await;
    server
        .post("/api/mfa/verify")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disable_never_enabled() {
    let server = test_server();

    let response = server
        .post("/api/mfa/disable")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "MFA not enabled for this user" }));
}

#[tokio::test]
async fn test_disable_removes_record() {
    let server = test_server();
    enroll(&server).await;

    let response = server
        .post("/api/mfa/disable")
        .json(&json!({ "email": EMAIL, "code": "1234" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/mfa/disable")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "message": "MFA disabled successfully" }));

    let status = server
        .post("/api/mfa/status")
        .json(&json!({ "email": EMAIL }))
        .await
        .json::<Value>();
    assert_eq!(status["isEnabled"], false);

    // записи больше нет
    server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": "123456" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_identities_are_independent() {
    let server = test_server();
    enroll(&server).await;

    let other = server
        .post("/api/mfa/status")
        .json(&json!({ "email": "other@example.com" }))
        .await
        .json::<Value>();
    assert_eq!(other["isEnabled"], false);
}

#[tokio::test]
async fn test_verify_and_disable_without_record_ignore_code_format() {
    let server = test_server();

    for path in ["/api/mfa/verify", "/api/mfa/disable"] {
        for code in [json!("12"), json!(12), Value::Null] {
            let response = server
                .post(path)
                .json(&json!({ "email": "nobody@example.com", "code": code }))
                .await;

            response.assert_status(StatusCode::NOT_FOUND);
            response.assert_json(&json!({ "error": "MFA not enabled for this user" }));
        }
    }
}

#[tokio::test]
async fn test_verify_and_disable_pending_record_ignore_code_format() {
    let server = test_server();
    server
        .post("/api/mfa/setup")
        .json(&json!({ "email": EMAIL }))
        .await
        .assert_status_ok();

    for path in ["/api/mfa/verify", "/api/mfa/disable"] {
        server
            .post(path)
            .json(&json!({ "email": EMAIL, "code": "12" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_verify_and_disable_bad_code_on_enabled_record() {
    let server = test_server();
    enroll(&server).await;

    for path in ["/api/mfa/verify", "/api/mfa/disable"] {
        let response = server
            .post(path)
            .json(&json!({ "email": EMAIL, "code": "12" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid verification code" }));
    }

    // запись не тронута
    let status = server
        .post("/api/mfa/status")
        .json(&json!({ "email": EMAIL }))
        .await
        .json::<Value>();
    assert_eq!(status["isEnabled"], true);
}

#[tokio::test]
async fn test_confirm_setup_numeric_code_without_record() {
    let server = test_server();

    let response = server
        .post("/api/mfa/verify-setup")
        .json(&json!({ "email": EMAIL, "code": 123456 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Invalid verification code" }));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = test_server_with_body_limit(64);
    let email = format!("{}@example.com", "a".repeat(256));

    let response = server
        .post("/api/mfa/setup")
        .json(&json!({ "email": email }))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    // небольшое тело проходит тот же лимит
    server
        .post("/api/mfa/setup")
        .json(&json!({ "email": "a@b.c" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_malformed_body_reads_as_empty() {
    let server = test_server();

    let response = server.post("/api/mfa/setup").text("not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Email is required" }));
}
