use super::{configure, json_config};
use crate::config::Config;
use crate::models::email::{ProbeFailureKind, SmtpCheck};
use crate::state::AppState;
use crate::validation::disposable::DisposableDomains;
use crate::validation::dnsmx::DomainIntelligence;
use crate::validation::pipeline::ValidationPipeline;
use crate::validation::smtp::MockMailboxProbe;
use crate::validation::test_support::StaticDns;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockall::predicate::eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(json_config(1024 * 1024))
                .configure(configure),
        )
        .await
    };
}

fn state_with(dns: StaticDns, prober: MockMailboxProbe, config: &Config) -> AppState {
    let pipeline = ValidationPipeline::new(
        DomainIntelligence::new(Arc::new(dns), Arc::new(DisposableDomains::with_defaults())),
        Arc::new(prober),
    );
    AppState::new(pipeline, config)
}

fn state(dns: StaticDns) -> AppState {
    let mut prober = MockMailboxProbe::new();
    prober.expect_probe().never();
    state_with(dns, prober, &Config::default())
}

fn dns() -> StaticDns {
    StaticDns::new()
        .with_mail_domain("example.com")
        .with_mail_domain("x.com")
        .with_mail_domain("y.com")
}

#[actix_web::test]
async fn test_single_valid_address() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "user@example.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(
        body,
        json!({
            "email": "user@example.com",
            "syntacticallyValid": true,
            "domainHasMX": true,
            "spf": true,
            "dmarc": true,
            "disposable": false,
            "smtpCheck": null,
            "reason": null
        })
    );
}

#[actix_web::test]
async fn test_single_invalid_syntax_is_still_ok() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "not-an-email"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["syntacticallyValid"], false);
    assert_eq!(body["reason"], "Invalid email syntax");
    assert_eq!(body["domainHasMX"], Value::Null);
}

#[actix_web::test]
async fn test_single_disposable_address() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "user@mailinator.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["syntacticallyValid"], true);
    assert_eq!(body["disposable"], true);
}

#[actix_web::test]
async fn test_single_probe_uses_requested_timeout() {
    let mut prober = MockMailboxProbe::new();
    prober
        .expect_probe()
        .with(
            eq("mx.example.com"),
            eq("user@example.com"),
            eq(Duration::from_millis(1200)),
        )
        .times(1)
        .returning(|_, _, _| {
            SmtpCheck::failed(ProbeFailureKind::Rejected, "550 5.1.1 No such user", Some(550))
        });
    let app = test_app!(state_with(dns(), prober, &Config::default()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "user@example.com", "smtpProbe": true, "timeoutMs": 1200}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(
        body["smtpCheck"],
        json!({"success": false, "message": "550 5.1.1 No such user", "code": 550, "kind": "rejected"})
    );
}

#[actix_web::test]
async fn test_single_missing_email() {
    let app = test_app!(state(dns()));

    for payload in [json!({}), json!({"email": ""}), json!({"smtpProbe": true})] {
        let req = test::TestRequest::post()
            .uri("/validate/single")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, json!({"error": "Email is required"}));
    }
}

#[actix_web::test]
async fn test_single_malformed_body() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": 42}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Malformed request body")
    );

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_single_timeout_out_of_range() {
    let app = test_app!(state(dns()));

    for (timeout, message) in [
        (0, "timeoutMs must be greater than 0"),
        (30_001, "timeoutMs must be between 1 and 30000"),
    ] {
        let req = test::TestRequest::post()
            .uri("/validate/single")
            .set_json(json!({"email": "user@example.com", "timeoutMs": timeout}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body["error"], message);
    }
}

#[actix_web::test]
async fn test_single_unexpected_failure_is_500() {
    let app = test_app!(state(StaticDns::new().panicking_on("boom.com")));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "user@boom.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("resolver exploded"));
}

#[actix_web::test]
async fn test_bulk_mixed_addresses() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/bulk")
        .set_json(json!({"emails": ["a@x.com", "bad", "b@y.com"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["count"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["email"], "a@x.com");
    assert_eq!(results[0]["syntacticallyValid"], true);
    assert_eq!(results[1]["email"], "bad");
    assert_eq!(results[1]["syntacticallyValid"], false);
    assert_eq!(results[1]["reason"], "Invalid email syntax");
    assert_eq!(results[2]["email"], "b@y.com");
    assert_eq!(results[2]["syntacticallyValid"], true);
}

#[actix_web::test]
async fn test_bulk_rejects_missing_or_empty_list() {
    let app = test_app!(state(dns()));

    for payload in [json!({}), json!({"emails": []})] {
        let req = test::TestRequest::post()
            .uri("/validate/bulk")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, json!({"error": "Emails array is required"}));
    }
}

#[actix_web::test]
async fn test_bulk_rejects_non_list() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/bulk")
        .set_json(json!({"emails": "a@x.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_bulk_rejects_oversized_list() {
    let config = Config {
        bulk_max_emails: 2,
        ..Config::default()
    };
    let mut prober = MockMailboxProbe::new();
    prober.expect_probe().never();
    let app = test_app!(state_with(dns(), prober, &config));

    let req = test::TestRequest::post()
        .uri("/validate/bulk")
        .set_json(json!({"emails": ["a@x.com", "b@x.com", "c@x.com"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["error"], "Too many emails: at most 2 per request");
}

#[actix_web::test]
async fn test_bulk_isolates_failing_address() {
    let app = test_app!(state(dns().panicking_on("boom.com")));

    let req = test::TestRequest::post()
        .uri("/validate/bulk")
        .set_json(json!({"emails": ["a@x.com", "z@boom.com", "b@y.com"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].get("error").is_none());
    assert_eq!(results[1]["email"], "z@boom.com");
    assert_eq!(results[1]["reason"], "Validation aborted");
    assert!(results[1]["error"].as_str().unwrap().contains("resolver exploded"));
    assert_eq!(results[2]["domainHasMX"], true);
}

#[actix_web::test]
async fn test_unknown_route_is_404() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate-email")
        .set_json(json!({"email": "user@example.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_single_edge_case_bodies() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": null, "smtpProbe": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_json(json!({"email": "user@example.com", "unexpected": "field"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/validate/single")
        .set_payload(r#"{"email": "user@example.com"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_bulk_rejects_mixed_types() {
    let app = test_app!(state(dns()));

    let req = test::TestRequest::post()
        .uri("/validate/bulk")
        .set_json(json!({"emails": ["a@x.com", 7, null]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
